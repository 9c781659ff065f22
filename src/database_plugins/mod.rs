// ABOUTME: Backing-store abstraction for ingredient master records and recipes
// ABOUTME: DatabaseProvider trait with SQLite and in-memory implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Database abstraction layer
//!
//! Services depend on `Arc<dyn DatabaseProvider>` only. [`factory::connect`]
//! picks the implementation from the configured URL.

use crate::errors::AppResult;
use crate::models::{
    IngredientPatch, IngredientRecord, NewIngredient, NewRecipe, Recipe, RecipeIngredientRef,
};
use async_trait::async_trait;
use uuid::Uuid;

pub mod factory;
pub mod memory;
pub mod sqlite;

/// Core database abstraction trait
///
/// All store implementations provide the same semantics so that services and
/// tests can swap them freely.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Short backend label for logs
    fn backend_name(&self) -> &'static str;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Ingredient master records
    // ================================

    /// Create a new ingredient record
    async fn create_ingredient(&self, ingredient: &NewIngredient) -> AppResult<IngredientRecord>;

    /// Get an ingredient record by id
    async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<IngredientRecord>>;

    /// Case-insensitive exact-after-trim name match, oldest first then lowest id
    async fn find_ingredients_by_name(&self, name: &str) -> AppResult<Vec<IngredientRecord>>;

    /// Case-insensitive substring match for autocomplete
    async fn search_ingredients(&self, term: &str, limit: u32)
        -> AppResult<Vec<IngredientRecord>>;

    /// All records ordered by name
    async fn list_ingredients(&self, favorites_only: bool) -> AppResult<Vec<IngredientRecord>>;

    /// Apply a patch; `None` when the record does not exist
    async fn update_ingredient(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> AppResult<Option<IngredientRecord>>;

    /// Delete the record if and only if no recipe references it, atomically
    async fn delete_ingredient_if_unreferenced(&self, id: Uuid) -> AppResult<bool>;

    // ================================
    // Recipes
    // ================================

    /// Create a new recipe
    async fn create_recipe(&self, recipe: &NewRecipe) -> AppResult<Recipe>;

    /// Get a recipe by id
    async fn get_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>>;

    /// Recipes newest first
    async fn list_recipes(&self, favorites_only: bool) -> AppResult<Vec<Recipe>>;

    /// Recipes whose title contains `term` (case-insensitive), newest first
    async fn search_recipes(&self, term: &str) -> AppResult<Vec<Recipe>>;

    /// Replace a recipe's contents
    async fn update_recipe(&self, id: Uuid, recipe: &NewRecipe) -> AppResult<Option<Recipe>>;

    /// Overwrite only the ingredient lines of a recipe; `false` when it does not exist
    async fn set_recipe_ingredients(
        &self,
        id: Uuid,
        ingredients: &[RecipeIngredientRef],
    ) -> AppResult<bool>;

    /// Set the favorite flag
    async fn set_recipe_favorite(&self, id: Uuid, is_favorite: bool)
        -> AppResult<Option<Recipe>>;

    /// Delete a recipe; returns whether it existed
    async fn delete_recipe(&self, id: Uuid) -> AppResult<bool>;

    /// Recipes with any ingredient line pointing at `ingredient_id`
    async fn recipes_referencing_ingredient(&self, ingredient_id: Uuid) -> AppResult<Vec<Recipe>>;
}
