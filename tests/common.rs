// ABOUTME: Shared setup for integration tests: stores, resources and stub collaborators
// ABOUTME: Stub LLM and transcript sources plus a store wrapper that fails recipe writes on demand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `yorist`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use uuid::Uuid;
use yorist::{
    database_plugins::{factory, DatabaseProvider},
    errors::{AppError, AppResult},
    external::TranscriptSource,
    llm::{ChatRequest, ChatResponse, LlmProvider},
    models::{
        IngredientLine, IngredientPatch, IngredientRecord, NewIngredient, NewRecipe, Recipe,
        RecipeDraft, RecipeIngredientRef, RecipeStep,
    },
    resources::{ServerResources, ServerResourcesBuilder},
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Private in-memory `SQLite` store
pub async fn create_test_database() -> Arc<dyn DatabaseProvider> {
    init_test_logging();
    factory::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite store")
}

/// Plain in-process store
pub async fn create_memory_database() -> Arc<dyn DatabaseProvider> {
    init_test_logging();
    factory::connect("memory://")
        .await
        .expect("Failed to open memory store")
}

/// One store per backend, for tests that must hold on every backend
pub async fn all_backends() -> Vec<Arc<dyn DatabaseProvider>> {
    vec![create_test_database().await, create_memory_database().await]
}

/// Resources over `database` with stub collaborators; generation disabled when `llm` is `None`
pub fn create_test_resources(
    database: Arc<dyn DatabaseProvider>,
    transcripts: Arc<dyn TranscriptSource>,
    llm: Option<Arc<dyn LlmProvider>>,
) -> Arc<ServerResources> {
    ServerResourcesBuilder::new()
        .with_database(database)
        .with_transcripts(transcripts)
        .with_llm(llm)
        .build_arc()
        .expect("Failed to build resources")
}

/// Resources over a memory store with no LLM and no transcripts
pub async fn create_default_resources() -> Arc<ServerResources> {
    create_test_resources(
        create_memory_database().await,
        Arc::new(StubTranscripts::unavailable()),
        None,
    )
}

/// Draft with `name, amount, unit` ingredient lines and one step
pub fn draft(title: &str, lines: &[(&str, &str, &str)]) -> RecipeDraft {
    RecipeDraft {
        title: title.to_owned(),
        description: format!("{title} 만들기"),
        ingredients: lines
            .iter()
            .map(|(name, amount, unit)| IngredientLine::new(*name, *amount, *unit))
            .collect(),
        steps: vec![RecipeStep::new("재료를 손질한다")],
        video_url: None,
        is_favorite: false,
    }
}

/// Store-level recipe pointing at the given records
pub fn new_recipe(title: &str, ingredients: &[&IngredientRecord]) -> NewRecipe {
    NewRecipe {
        title: title.to_owned(),
        description: String::new(),
        ingredients: ingredients
            .iter()
            .map(|record| RecipeIngredientRef {
                ingredient_id: record.id,
                name: record.name.clone(),
                amount: "1".to_owned(),
                unit: record.unit.clone(),
                shop_url: record.shop_url.clone(),
            })
            .collect(),
        steps: vec![RecipeStep::new("끓인다")],
        video_url: None,
        thumbnail_url: None,
        is_favorite: false,
    }
}

// ================================
// Stub collaborators
// ================================

/// Transcript source returning a fixed transcript, or `TranscriptUnavailable`
pub struct StubTranscripts {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl StubTranscripts {
    pub fn with_text(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            transcript: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptSource for StubTranscripts {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_transcript(&self, _video_url: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcript
            .clone()
            .ok_or_else(|| AppError::transcript_unavailable("No captions for this video"))
    }
}

/// LLM returning a canned reply and recording the prompts it saw
pub struct StubLlm {
    reply: String,
    finish_reason: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_owned(),
            finish_reason: Some("stop".to_owned()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn truncated(reply: &str) -> Self {
        Self {
            finish_reason: Some("length".to_owned()),
            ..Self::replying(reply)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Content of the last user message sent
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn default_model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(user) = request.messages.last() {
            self.prompts.lock().unwrap().push(user.content.clone());
        }
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: self.default_model().to_owned(),
            usage: None,
            finish_reason: self.finish_reason.clone(),
        })
    }
}

// ================================
// Failure injection
// ================================

/// Store wrapper whose `set_recipe_ingredients` fails after a number of successful calls
///
/// Built with [`FailingRecipeWrites::rejecting_saves`], it instead fails every
/// `create_recipe` and `update_recipe` call.
pub struct FailingRecipeWrites {
    inner: Arc<dyn DatabaseProvider>,
    successes_before_failure: usize,
    writes: AtomicUsize,
    reject_saves: bool,
}

impl FailingRecipeWrites {
    pub fn new(inner: Arc<dyn DatabaseProvider>, successes_before_failure: usize) -> Self {
        Self {
            inner,
            successes_before_failure,
            writes: AtomicUsize::new(0),
            reject_saves: false,
        }
    }

    pub fn rejecting_saves(inner: Arc<dyn DatabaseProvider>) -> Self {
        Self {
            successes_before_failure: usize::MAX,
            reject_saves: true,
            ..Self::new(inner, 0)
        }
    }
}

#[async_trait]
impl DatabaseProvider for FailingRecipeWrites {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn migrate(&self) -> AppResult<()> {
        self.inner.migrate().await
    }

    async fn create_ingredient(&self, ingredient: &NewIngredient) -> AppResult<IngredientRecord> {
        self.inner.create_ingredient(ingredient).await
    }

    async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<IngredientRecord>> {
        self.inner.get_ingredient(id).await
    }

    async fn find_ingredients_by_name(&self, name: &str) -> AppResult<Vec<IngredientRecord>> {
        self.inner.find_ingredients_by_name(name).await
    }

    async fn search_ingredients(
        &self,
        term: &str,
        limit: u32,
    ) -> AppResult<Vec<IngredientRecord>> {
        self.inner.search_ingredients(term, limit).await
    }

    async fn list_ingredients(&self, favorites_only: bool) -> AppResult<Vec<IngredientRecord>> {
        self.inner.list_ingredients(favorites_only).await
    }

    async fn update_ingredient(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> AppResult<Option<IngredientRecord>> {
        self.inner.update_ingredient(id, patch).await
    }

    async fn delete_ingredient_if_unreferenced(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete_ingredient_if_unreferenced(id).await
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> AppResult<Recipe> {
        if self.reject_saves {
            return Err(AppError::database("injected recipe create failure"));
        }
        self.inner.create_recipe(recipe).await
    }

    async fn get_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>> {
        self.inner.get_recipe(id).await
    }

    async fn list_recipes(&self, favorites_only: bool) -> AppResult<Vec<Recipe>> {
        self.inner.list_recipes(favorites_only).await
    }

    async fn search_recipes(&self, term: &str) -> AppResult<Vec<Recipe>> {
        self.inner.search_recipes(term).await
    }

    async fn update_recipe(&self, id: Uuid, recipe: &NewRecipe) -> AppResult<Option<Recipe>> {
        if self.reject_saves {
            return Err(AppError::database("injected recipe update failure"));
        }
        self.inner.update_recipe(id, recipe).await
    }

    async fn set_recipe_ingredients(
        &self,
        id: Uuid,
        ingredients: &[RecipeIngredientRef],
    ) -> AppResult<bool> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.successes_before_failure {
            return Err(AppError::database("injected recipe write failure"));
        }
        self.inner.set_recipe_ingredients(id, ingredients).await
    }

    async fn set_recipe_favorite(
        &self,
        id: Uuid,
        is_favorite: bool,
    ) -> AppResult<Option<Recipe>> {
        self.inner.set_recipe_favorite(id, is_favorite).await
    }

    async fn delete_recipe(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete_recipe(id).await
    }

    async fn recipes_referencing_ingredient(&self, ingredient_id: Uuid) -> AppResult<Vec<Recipe>> {
        self.inner.recipes_referencing_ingredient(ingredient_id).await
    }
}
