// ABOUTME: In-memory implementation of DatabaseProvider for tests and demos
// ABOUTME: Same ordering and matching semantics as the SQLite store, state behind one RwLock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use super::DatabaseProvider;
use crate::errors::AppResult;
use crate::models::{
    normalize_name, IngredientPatch, IngredientRecord, NewIngredient, NewRecipe, Recipe,
    RecipeIngredientRef,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    ingredients: HashMap<Uuid, IngredientRecord>,
    recipes: HashMap<Uuid, Recipe>,
}

impl MemoryState {
    fn is_referenced(&self, ingredient_id: Uuid) -> bool {
        self.recipes
            .values()
            .any(|recipe| recipe.references_ingredient(ingredient_id))
    }
}

/// Process-local store; contents are lost when it is dropped
#[derive(Default)]
pub struct MemoryDatabase {
    state: RwLock<MemoryState>,
}

impl MemoryDatabase {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first(a: &IngredientRecord, b: &IngredientRecord) -> std::cmp::Ordering {
    a.created_at.cmp(&b.created_at).then_with(|| {
        a.id.hyphenated()
            .to_string()
            .cmp(&b.id.hyphenated().to_string())
    })
}

fn by_name(a: &IngredientRecord, b: &IngredientRecord) -> std::cmp::Ordering {
    normalize_name(&a.name)
        .cmp(&normalize_name(&b.name))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

fn newest_first(a: &Recipe, b: &Recipe) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.hyphenated().to_string().cmp(&a.id.hyphenated().to_string()))
}

fn sorted_recipes<'a>(recipes: impl Iterator<Item = &'a Recipe>) -> Vec<Recipe> {
    let mut list: Vec<Recipe> = recipes.cloned().collect();
    list.sort_by(newest_first);
    list
}

#[async_trait]
impl DatabaseProvider for MemoryDatabase {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn migrate(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_ingredient(&self, ingredient: &NewIngredient) -> AppResult<IngredientRecord> {
        let now = Utc::now();
        let record = IngredientRecord {
            id: Uuid::new_v4(),
            name: ingredient.name.trim().to_owned(),
            unit: ingredient.unit.trim().to_owned(),
            shop_url: ingredient.shop_url.clone(),
            is_favorite: ingredient.is_favorite,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .ingredients
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<IngredientRecord>> {
        Ok(self.state.read().await.ingredients.get(&id).cloned())
    }

    async fn find_ingredients_by_name(&self, name: &str) -> AppResult<Vec<IngredientRecord>> {
        let key = normalize_name(name);
        let state = self.state.read().await;
        let mut matches: Vec<IngredientRecord> = state
            .ingredients
            .values()
            .filter(|record| normalize_name(&record.name) == key)
            .cloned()
            .collect();
        matches.sort_by(oldest_first);
        Ok(matches)
    }

    async fn search_ingredients(
        &self,
        term: &str,
        limit: u32,
    ) -> AppResult<Vec<IngredientRecord>> {
        let needle = normalize_name(term);
        let state = self.state.read().await;
        let mut matches: Vec<IngredientRecord> = state
            .ingredients
            .values()
            .filter(|record| normalize_name(&record.name).contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(by_name);
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn list_ingredients(&self, favorites_only: bool) -> AppResult<Vec<IngredientRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<IngredientRecord> = state
            .ingredients
            .values()
            .filter(|record| !favorites_only || record.is_favorite)
            .cloned()
            .collect();
        records.sort_by(by_name);
        Ok(records)
    }

    async fn update_ingredient(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> AppResult<Option<IngredientRecord>> {
        let mut state = self.state.write().await;
        Ok(state.ingredients.get_mut(&id).map(|record| {
            patch.apply_to(record);
            record.name = record.name.trim().to_owned();
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn delete_ingredient_if_unreferenced(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.is_referenced(id) {
            return Ok(false);
        }
        Ok(state.ingredients.remove(&id).is_some())
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> AppResult<Recipe> {
        let now = Utc::now();
        let stored = Recipe {
            id: Uuid::new_v4(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            video_url: recipe.video_url.clone(),
            thumbnail_url: recipe.thumbnail_url.clone(),
            is_favorite: recipe.is_favorite,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .recipes
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>> {
        Ok(self.state.read().await.recipes.get(&id).cloned())
    }

    async fn list_recipes(&self, favorites_only: bool) -> AppResult<Vec<Recipe>> {
        let state = self.state.read().await;
        Ok(sorted_recipes(
            state
                .recipes
                .values()
                .filter(|recipe| !favorites_only || recipe.is_favorite),
        ))
    }

    async fn search_recipes(&self, term: &str) -> AppResult<Vec<Recipe>> {
        let needle = normalize_name(term);
        let state = self.state.read().await;
        Ok(sorted_recipes(
            state
                .recipes
                .values()
                .filter(|recipe| normalize_name(&recipe.title).contains(&needle)),
        ))
    }

    async fn update_recipe(&self, id: Uuid, recipe: &NewRecipe) -> AppResult<Option<Recipe>> {
        let mut state = self.state.write().await;
        Ok(state.recipes.get_mut(&id).map(|stored| {
            stored.title.clone_from(&recipe.title);
            stored.description.clone_from(&recipe.description);
            stored.ingredients.clone_from(&recipe.ingredients);
            stored.steps.clone_from(&recipe.steps);
            stored.video_url.clone_from(&recipe.video_url);
            stored.thumbnail_url.clone_from(&recipe.thumbnail_url);
            stored.is_favorite = recipe.is_favorite;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn set_recipe_ingredients(
        &self,
        id: Uuid,
        ingredients: &[RecipeIngredientRef],
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.recipes.get_mut(&id).is_some_and(|stored| {
            stored.ingredients = ingredients.to_vec();
            stored.updated_at = Utc::now();
            true
        }))
    }

    async fn set_recipe_favorite(
        &self,
        id: Uuid,
        is_favorite: bool,
    ) -> AppResult<Option<Recipe>> {
        let mut state = self.state.write().await;
        Ok(state.recipes.get_mut(&id).map(|stored| {
            stored.is_favorite = is_favorite;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete_recipe(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.recipes.remove(&id).is_some())
    }

    async fn recipes_referencing_ingredient(&self, ingredient_id: Uuid) -> AppResult<Vec<Recipe>> {
        let state = self.state.read().await;
        Ok(sorted_recipes(
            state
                .recipes
                .values()
                .filter(|recipe| recipe.references_ingredient(ingredient_id)),
        ))
    }
}
