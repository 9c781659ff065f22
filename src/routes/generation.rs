// ABOUTME: Video route handlers: link parsing, transcript extraction and recipe generation
// ABOUTME: Request bodies accept the youtubeUrl field used by the mobile client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::Recipe;
use crate::resources::ServerResources;
use crate::services::recipe_generation::GeneratedRecipe;
use crate::youtube::VideoReference;

/// Query for link parsing
#[derive(Debug, Default, Deserialize)]
pub struct VideoQuery {
    /// Link to parse
    #[serde(default)]
    pub url: String,
}

/// Body naming a video
#[derive(Debug, Default, Deserialize)]
pub struct VideoRequest {
    /// Video link
    #[serde(default, rename = "youtubeUrl", alias = "youtube_url", alias = "url")]
    pub youtube_url: String,
    /// Save the generated recipe right away
    #[serde(default)]
    pub save: bool,
}

/// Transcript response
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    /// Plain transcript text
    pub transcript: String,
}

/// Generation response
#[derive(Debug, Serialize)]
pub struct GenerateRecipeResponse {
    /// Generated recipe for review
    pub recipe: GeneratedRecipe,
    /// Stored recipe when `save` was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<Recipe>,
}

/// Video and generation routes handler
pub struct GenerationRoutes;

impl GenerationRoutes {
    /// Create all video routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/youtube", get(Self::handle_parse_link))
            .route("/api/youtube-transcript", post(Self::handle_transcript))
            .route("/api/generate-recipe", post(Self::handle_generate))
            .with_state(resources)
    }

    async fn handle_parse_link(Query(query): Query<VideoQuery>) -> Result<Response, AppError> {
        let reference = VideoReference::parse(&query.url).ok_or_else(|| {
            AppError::invalid_input(format!("Not a recognised YouTube link: '{}'", query.url))
        })?;
        Ok(Json(reference).into_response())
    }

    async fn handle_transcript(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<VideoRequest>,
    ) -> Result<Response, AppError> {
        let transcript = resources
            .generator
            .transcripts()
            .fetch_transcript(&request.youtube_url)
            .await?;
        Ok(Json(TranscriptResponse { transcript }).into_response())
    }

    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<VideoRequest>,
    ) -> Result<Response, AppError> {
        let recipe = resources.generator.generate(&request.youtube_url).await?;
        let saved = if request.save {
            let saved = resources.recipes.save_recipe(recipe.clone().into()).await?;
            info!(recipe_id = %saved.id, "Saved generated recipe");
            Some(saved)
        } else {
            None
        };
        Ok(Json(GenerateRecipeResponse { recipe, saved }).into_response())
    }
}
