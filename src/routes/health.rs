// ABOUTME: Health check route handler for liveness probes
// ABOUTME: Reports service name, version and the active store backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        async fn health_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "healthy",
                "service": service_names::YORIST_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
                "database": resources.database.backend_name(),
                "generation_enabled": resources.generator.is_enabled(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        Router::new()
            .route("/health", get(health_handler))
            .with_state(resources)
    }
}
