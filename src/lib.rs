// ABOUTME: Main library entry point for the Yorist recipe book API
// ABOUTME: Recipes, deduplicated ingredient master records and video-to-recipe generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

#![deny(unsafe_code)]

//! # Yorist
//!
//! Backend for a mobile-first recipe book. Recipes reference shared
//! ingredient master records by id; the
//! [`IngredientIdentityResolver`](services::ingredient_resolver::IngredientIdentityResolver)
//! keeps those records deduplicated and deletes the ones no recipe uses.
//!
//! ## Architecture
//!
//! - **Database**: `DatabaseProvider` trait with `SQLite` and in-memory backends
//! - **Services**: ingredient resolution, recipe operations, recipe generation
//! - **External**: transcript extraction and an `OpenAI`-compatible LLM client
//! - **Notifications**: per-context publish/subscribe change signals
//! - **Routes**: axum REST API plus an SSE change stream
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use yorist::database_plugins::factory;
//! use yorist::errors::AppResult;
//! use yorist::resources::ServerResourcesBuilder;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let database = factory::connect("memory://").await?;
//!     let resources = ServerResourcesBuilder::new()
//!         .with_database(database)
//!         .with_llm(None)
//!         .build()
//!         .map_err(yorist::errors::AppError::internal)?;
//!
//!     let onion = resources.ingredients.resolve_or_create("양파", "", None).await?;
//!     println!("{} -> {}", onion.record.name, onion.record.id);
//!     Ok(())
//! }
//! ```

/// Configuration loaded from the environment
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// `SQLite` schema, migrations and row decoding
pub mod database;

/// Database abstraction layer with pluggable backends
pub mod database_plugins;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Transcript extraction clients
pub mod external;

/// LLM provider abstraction for recipe generation
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// Ingredient and recipe data models
pub mod models;

/// In-process change notifications
pub mod notifications;

/// Shared application context
pub mod resources;

/// `HTTP` routes
pub mod routes;

/// Domain services
pub mod services;

/// YouTube link parsing
pub mod youtube;
