// ABOUTME: Recipe route handlers: list, save, read, update, delete, favorite and search
// ABOUTME: Thin axum handlers that delegate to RecipeService
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::parse_id;
use crate::errors::AppError;
use crate::models::RecipeDraft;
use crate::resources::ServerResources;

/// Query parameters for the recipe list
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    /// Only favorites
    #[serde(default)]
    pub favorites: bool,
}

/// Query parameters for search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search text
    #[serde(default)]
    pub q: String,
}

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/recipes/:id/favorite", post(Self::handle_toggle_favorite))
            .route("/api/search", get(Self::handle_search))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListRecipesQuery>,
    ) -> Result<Response, AppError> {
        let recipes = if query.favorites {
            resources.recipes.favorites().await?
        } else {
            resources.recipes.list().await?
        };
        Ok(Json(recipes).into_response())
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(draft): Json<RecipeDraft>,
    ) -> Result<Response, AppError> {
        let recipe = resources.recipes.save_recipe(draft).await?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe = resources.recipes.get(parse_id(&id)?).await?;
        Ok(Json(recipe).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(draft): Json<RecipeDraft>,
    ) -> Result<Response, AppError> {
        let recipe = resources
            .recipes
            .update_recipe(parse_id(&id)?, draft)
            .await?;
        Ok(Json(recipe).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let deletion = resources.recipes.delete_recipe(parse_id(&id)?).await?;
        Ok(Json(deletion).into_response())
    }

    async fn handle_toggle_favorite(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe = resources.recipes.toggle_favorite(parse_id(&id)?).await?;
        Ok(Json(recipe).into_response())
    }

    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<SearchQuery>,
    ) -> Result<Response, AppError> {
        let results = resources.recipes.search(&query.q).await?;
        Ok(Json(results).into_response())
    }
}
