// ABOUTME: Route module organization for the Yorist HTTP API
// ABOUTME: Merges the domain routers and applies tracing and CORS layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Route module for the Yorist server
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer. Errors are rendered by
//! `AppError`'s `IntoResponse` implementation.

/// Video link parsing, transcript and recipe generation routes
pub mod generation;
/// Health check route
pub mod health;
/// Ingredient master record routes
pub mod ingredients;
/// Recipe routes
pub mod recipes;
/// Change-notification routes
pub mod sync;

pub use generation::GenerationRoutes;
pub use health::HealthRoutes;
pub use ingredients::IngredientRoutes;
pub use recipes::RecipeRoutes;
pub use sync::SyncRoutes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Parse a path id, reporting a JSON error instead of axum's plain-text rejection
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_input(format!("Invalid id: {raw}")))
}

/// Build the complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(RecipeRoutes::routes(resources.clone()))
        .merge(IngredientRoutes::routes(resources.clone()))
        .merge(GenerationRoutes::routes(resources.clone()))
        .merge(SyncRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
