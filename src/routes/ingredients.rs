// ABOUTME: Ingredient route handlers: autocomplete, add, detail, rename, merge and cleanup
// ABOUTME: Rename responses tell the client which id to show after a merge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Ingredient routes
//!
//! `PUT /api/ingredients/:id` renames with reconciliation. When the new name
//! already belongs to another record the response has `outcome: "merged"`
//! and `redirect_to` set to the surviving id; the old id no longer exists.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::constants::limits;
use crate::errors::AppError;
use crate::models::{IngredientRecord, Recipe};
use crate::resources::ServerResources;
use crate::services::ingredient_resolver::{MergeReport, RenameOutcome, UpsertOutcome};

/// Query parameters for the ingredient list
#[derive(Debug, Default, Deserialize)]
pub struct IngredientListQuery {
    /// Substring to autocomplete; the full list when absent or blank
    #[serde(default)]
    pub q: Option<String>,
    /// Maximum autocomplete results
    #[serde(default)]
    pub limit: Option<u32>,
    /// Only favorites (full list only)
    #[serde(default)]
    pub favorites: bool,
}

/// Body of the add-ingredient form
#[derive(Debug, Deserialize)]
pub struct UpsertIngredientRequest {
    /// Record picked from autocomplete, if any
    #[serde(default)]
    pub ingredient_id: Option<Uuid>,
    /// Name
    pub name: String,
    /// Unit
    #[serde(default)]
    pub unit: String,
    /// Purchase link
    #[serde(default, alias = "shopUrl")]
    pub shop_url: Option<String>,
}

/// Body of a rename
#[derive(Debug, Deserialize)]
pub struct RenameIngredientRequest {
    /// New name
    pub name: String,
    /// New unit
    #[serde(default)]
    pub unit: String,
    /// New purchase link
    #[serde(default, alias = "shopUrl")]
    pub shop_url: Option<String>,
}

/// Body of a purchase-link update
#[derive(Debug, Deserialize)]
pub struct ShopUrlRequest {
    /// New link; null or empty clears it
    #[serde(default, alias = "shopUrl")]
    pub shop_url: Option<String>,
}

/// Body of a favorite update
#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    /// New flag
    pub is_favorite: bool,
}

/// Body of an explicit merge
#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    /// Record that survives
    pub target_id: Uuid,
}

/// Response for add and rename
#[derive(Debug, Serialize)]
pub struct IngredientChangeResponse {
    /// `created`, `updated` or `merged`
    pub outcome: &'static str,
    /// Record after the change
    pub ingredient: IngredientRecord,
    /// Id the client should navigate to when it differs from the request path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<Uuid>,
    /// Merge details for `merged`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeReport>,
}

/// Ingredient detail page
#[derive(Debug, Serialize)]
pub struct IngredientDetailResponse {
    /// The record
    pub ingredient: IngredientRecord,
    /// Recipes using it
    pub recipes: Vec<Recipe>,
}

/// Ingredient routes handler
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create all ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/ingredients",
                get(Self::handle_list).post(Self::handle_upsert),
            )
            .route(
                "/api/ingredients/:id",
                get(Self::handle_get)
                    .put(Self::handle_rename)
                    .delete(Self::handle_delete),
            )
            .route("/api/ingredients/:id/shop-url", put(Self::handle_shop_url))
            .route("/api/ingredients/:id/favorite", post(Self::handle_favorite))
            .route("/api/ingredients/:id/merge", post(Self::handle_merge))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<IngredientListQuery>,
    ) -> Result<Response, AppError> {
        let term = query.q.as_deref().map(str::trim).unwrap_or_default();
        let ingredients = if term.is_empty() {
            resources.database.list_ingredients(query.favorites).await?
        } else {
            let limit = query
                .limit
                .unwrap_or(limits::AUTOCOMPLETE_DEFAULT)
                .clamp(1, limits::AUTOCOMPLETE_MAX);
            resources.database.search_ingredients(term, limit).await?
        };
        Ok(Json(ingredients).into_response())
    }

    async fn handle_upsert(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<UpsertIngredientRequest>,
    ) -> Result<Response, AppError> {
        let outcome = resources
            .ingredients
            .upsert_ingredient(
                request.ingredient_id,
                &request.name,
                &request.unit,
                request.shop_url.as_deref(),
            )
            .await?;
        let (status, label, ingredient) = match outcome {
            UpsertOutcome::Created(record) => (StatusCode::CREATED, "created", record),
            UpsertOutcome::Updated(record) => (StatusCode::OK, "updated", record),
        };
        let body = IngredientChangeResponse {
            outcome: label,
            ingredient,
            redirect_to: None,
            merge: None,
        };
        Ok((status, Json(body)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id)?;
        let ingredient = resources
            .database
            .get_ingredient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;
        let recipes = resources.recipes.recipes_using_ingredient(id).await?;
        Ok(Json(IngredientDetailResponse {
            ingredient,
            recipes,
        })
        .into_response())
    }

    async fn handle_rename(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(request): Json<RenameIngredientRequest>,
    ) -> Result<Response, AppError> {
        let outcome = resources
            .ingredients
            .rename_with_reconciliation(
                parse_id(&id)?,
                &request.name,
                &request.unit,
                request.shop_url.as_deref(),
            )
            .await?;

        let body = match outcome {
            RenameOutcome::Updated(ingredient) => IngredientChangeResponse {
                outcome: "updated",
                ingredient,
                redirect_to: None,
                merge: None,
            },
            RenameOutcome::Merged { surviving, report } => IngredientChangeResponse {
                outcome: "merged",
                redirect_to: Some(surviving.id),
                ingredient: surviving,
                merge: Some(report),
            },
            RenameOutcome::MergeFailed { error, .. } => return Err(error),
        };
        Ok(Json(body).into_response())
    }

    async fn handle_shop_url(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(request): Json<ShopUrlRequest>,
    ) -> Result<Response, AppError> {
        let record = resources
            .ingredients
            .set_shop_url(parse_id(&id)?, request.shop_url.as_deref())
            .await?;
        Ok(Json(record).into_response())
    }

    async fn handle_favorite(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(request): Json<FavoriteRequest>,
    ) -> Result<Response, AppError> {
        let record = resources
            .ingredients
            .set_favorite(parse_id(&id)?, request.is_favorite)
            .await?;
        Ok(Json(record).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let deleted = resources
            .ingredients
            .delete_if_unused(parse_id(&id)?)
            .await?;
        Ok(Json(serde_json::json!({ "deleted": deleted })).into_response())
    }

    async fn handle_merge(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(request): Json<MergeRequest>,
    ) -> Result<Response, AppError> {
        let report = resources
            .ingredients
            .merge(parse_id(&id)?, request.target_id)
            .await?;
        Ok(Json(report).into_response())
    }
}
