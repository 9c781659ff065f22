// ABOUTME: Application context shared by the HTTP routes, the CLI and the tests
// ABOUTME: Owns the store, the sync hub and the services built on top of them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Server Resources
//!
//! Everything a request handler needs, created once at startup and shared
//! through an `Arc`. The [`SyncHub`] lives here rather than in a global so
//! each server (or test) gets its own notification scope.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ServerConfig, TranscriptBackend};
use crate::database_plugins::DatabaseProvider;
use crate::external::{TimedTextClient, TranscriptServiceClient, TranscriptSource};
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::notifications::SyncHub;
use crate::services::ingredient_resolver::IngredientIdentityResolver;
use crate::services::recipe_generation::RecipeGenerator;
use crate::services::recipes::RecipeService;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Backing store
    pub database: Arc<dyn DatabaseProvider>,
    /// Change notifications
    pub sync: Arc<SyncHub>,
    /// Ingredient identity and cleanup
    pub ingredients: IngredientIdentityResolver,
    /// Recipe operations
    pub recipes: RecipeService,
    /// Video-to-recipe pipeline
    pub generator: RecipeGenerator,
}

impl ServerResources {
    /// Wire the services together
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        database: Arc<dyn DatabaseProvider>,
        transcripts: Arc<dyn TranscriptSource>,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        let sync = Arc::new(SyncHub::new());
        let ingredients = IngredientIdentityResolver::new(database.clone(), sync.clone());
        let recipes = RecipeService::new(database.clone(), sync.clone(), ingredients.clone());
        let generator = RecipeGenerator::new(transcripts, llm);

        Self {
            config,
            database,
            sync,
            ingredients,
            recipes,
            generator,
        }
    }
}

/// Transcript backend selected by the configuration
#[must_use]
pub fn transcript_source_from_config(config: &ServerConfig) -> Arc<dyn TranscriptSource> {
    match config.transcript.backend {
        TranscriptBackend::Service => Arc::new(TranscriptServiceClient::new(
            config.transcript.service_url.clone(),
        )),
        TranscriptBackend::TimedText => Arc::new(TimedTextClient::new(
            config.transcript.timedtext_url.clone(),
        )),
    }
}

/// LLM provider from the configuration; `None` when no key is set
#[must_use]
pub fn llm_provider_from_config(config: &ServerConfig) -> Option<Arc<dyn LlmProvider>> {
    match OpenAiProvider::from_config(&config.llm) {
        Ok(provider) => {
            info!(model = %config.llm.model, "Recipe generation enabled");
            Some(Arc::new(provider))
        }
        Err(e) => {
            warn!("{}", e.message);
            None
        }
    }
}

/// Builder for [`ServerResources`]
///
/// Collaborators not set explicitly are derived from the configuration.
pub struct ServerResourcesBuilder {
    config: Option<Arc<ServerConfig>>,
    database: Option<Arc<dyn DatabaseProvider>>,
    transcripts: Option<Arc<dyn TranscriptSource>>,
    llm: Option<Option<Arc<dyn LlmProvider>>>,
}

impl ServerResourcesBuilder {
    /// Create an empty builder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: None,
            database: None,
            transcripts: None,
            llm: None,
        }
    }

    /// Set the server configuration
    #[must_use]
    pub fn with_config(mut self, config: Arc<ServerConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the backing store
    #[must_use]
    pub fn with_database(mut self, database: Arc<dyn DatabaseProvider>) -> Self {
        self.database = Some(database);
        self
    }

    /// Set the transcript source
    #[must_use]
    pub fn with_transcripts(mut self, transcripts: Arc<dyn TranscriptSource>) -> Self {
        self.transcripts = Some(transcripts);
        self
    }

    /// Set the LLM provider; `None` disables generation
    #[must_use]
    pub fn with_llm(mut self, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Build the `ServerResources`
    ///
    /// # Errors
    ///
    /// Returns an error if no database was set
    pub fn build(self) -> Result<ServerResources, &'static str> {
        let database = self.database.ok_or("Database is required")?;
        let config = self.config.unwrap_or_default();
        let transcripts = self
            .transcripts
            .unwrap_or_else(|| transcript_source_from_config(&config));
        let llm = self
            .llm
            .unwrap_or_else(|| llm_provider_from_config(&config));

        Ok(ServerResources::new(config, database, transcripts, llm))
    }

    /// Build the `ServerResources` wrapped in an `Arc`
    ///
    /// # Errors
    ///
    /// Returns an error if no database was set
    pub fn build_arc(self) -> Result<Arc<ServerResources>, &'static str> {
        Ok(Arc::new(self.build()?))
    }
}

impl Default for ServerResourcesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
