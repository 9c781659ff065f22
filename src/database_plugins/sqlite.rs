// ABOUTME: SQLite implementation of DatabaseProvider
// ABOUTME: Thin delegation to crate::database::Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! SQLite database implementation
//!
//! This module wraps the SQLite storage in [`crate::database`]
//! to implement the [`DatabaseProvider`] trait.

use super::DatabaseProvider;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{
    IngredientPatch, IngredientRecord, NewIngredient, NewRecipe, Recipe, RecipeIngredientRef,
};
use async_trait::async_trait;
use uuid::Uuid;

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    /// The underlying database instance
    inner: Database,
}

impl SqliteDatabase {
    /// Open the database at `database_url` and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migrations fail
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let inner = Database::new(database_url).await?;
        Ok(Self { inner })
    }

    /// Get a reference to the inner database
    #[must_use]
    pub const fn inner(&self) -> &Database {
        &self.inner
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    fn backend_name(&self) -> &'static str {
        "sqlite"
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
        self.inner.update_recipe(id, recipe).await
    }

    async fn set_recipe_ingredients(
        &self,
        id: Uuid,
        ingredients: &[RecipeIngredientRef],
    ) -> AppResult<bool> {
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
