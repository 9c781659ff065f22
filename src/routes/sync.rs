// ABOUTME: Change-notification routes: SSE stream of sync events and current versions
// ABOUTME: Clients re-fetch ingredient or recipe views when an event for that topic arrives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::Stream;
use serde::Serialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::notifications::SyncTopic;
use crate::resources::ServerResources;

/// Current topic versions
#[derive(Debug, Serialize)]
pub struct SyncVersionsResponse {
    /// Ingredient topic version
    pub ingredients: u64,
    /// Recipe topic version
    pub recipes: u64,
    /// Debounce clients should apply before issuing search requests
    pub search_debounce_ms: u64,
}

/// Sync routes handler
pub struct SyncRoutes;

impl SyncRoutes {
    /// Create all sync routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sync/events", get(Self::handle_events))
            .route("/api/sync/versions", get(Self::handle_versions))
            .with_state(resources)
    }

    async fn handle_events(
        State(resources): State<Arc<ServerResources>>,
    ) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
        let receiver = resources.sync.subscribe();
        debug!(
            subscribers = resources.sync.subscriber_count(),
            "Sync stream opened"
        );

        // Lagged receivers skip missed events; clients resync from /api/sync/versions
        let stream = BroadcastStream::new(receiver)
            .filter_map(Result::ok)
            .map(|event| {
                Event::default()
                    .event(event.topic.to_string())
                    .id(event.version.to_string())
                    .json_data(event)
            });

        Sse::new(stream).keep_alive(KeepAlive::default())
    }

    async fn handle_versions(State(resources): State<Arc<ServerResources>>) -> Response {
        Json(SyncVersionsResponse {
            ingredients: resources.sync.version(SyncTopic::Ingredients),
            recipes: resources.sync.version(SyncTopic::Recipes),
            search_debounce_ms: resources.config.search_debounce_ms,
        })
        .into_response()
    }
}
