// ABOUTME: Recipe business logic: save, update, delete, favorites and search
// ABOUTME: Resolves ingredient lines to master records and cleans up records a recipe stops using
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::constants::limits;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    normalize_name, normalize_shop_url, IngredientRecord, NewRecipe, Recipe, RecipeDraft,
    RecipeIngredientRef,
};
use crate::notifications::{SyncHub, SyncTopic};
use crate::services::ingredient_resolver::IngredientIdentityResolver;
use crate::youtube;

/// Search results for the search page
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Recipes whose title matches, newest first
    pub recipes: Vec<Recipe>,
    /// Distinct titles, descriptions and ingredient names containing the query
    pub keywords: Vec<String>,
    /// Ingredient records whose name contains the query
    pub ingredients: Vec<IngredientRecord>,
}

/// Result of deleting a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipeDeletion {
    /// Deleted recipe
    pub recipe_id: Uuid,
    /// Ingredient records removed because nothing else used them
    pub ingredients_removed: usize,
}

/// Collect up to `limit` distinct strings containing `query`, in the order seen
fn keyword_suggestions(recipes: &[Recipe], query: &str, limit: usize) -> Vec<String> {
    let needle = query.to_lowercase();
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    let candidates = recipes.iter().flat_map(|recipe| {
        [recipe.title.as_str(), recipe.description.as_str()]
            .into_iter()
            .chain(recipe.ingredients.iter().map(|line| line.name.as_str()))
    });
    for candidate in candidates {
        if keywords.len() >= limit {
            break;
        }
        if !candidate.is_empty()
            && candidate.to_lowercase().contains(&needle)
            && seen.insert(candidate)
        {
            keywords.push(candidate.to_owned());
        }
    }
    keywords
}

/// Recipe operations over the shared store
#[derive(Clone)]
pub struct RecipeService {
    database: Arc<dyn DatabaseProvider>,
    sync: Arc<SyncHub>,
    resolver: IngredientIdentityResolver,
}

impl RecipeService {
    /// Create a service; ingredient bookkeeping goes through `resolver`
    #[must_use]
    pub fn new(
        database: Arc<dyn DatabaseProvider>,
        sync: Arc<SyncHub>,
        resolver: IngredientIdentityResolver,
    ) -> Self {
        Self {
            database,
            sync,
            resolver,
        }
    }

    /// Turn a draft into store contents, creating master records for new names
    ///
    /// Lines with a blank name are dropped. Also returns the ids of records
    /// created here so the caller can release them if the recipe write fails.
    /// Records created before a failing line are released on the spot.
    async fn resolve_draft(
        &self,
        draft: RecipeDraft,
        is_favorite: bool,
    ) -> AppResult<(NewRecipe, Vec<Uuid>)> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::missing_field("title"));
        }

        let mut created = Vec::new();
        let mut ingredients = Vec::with_capacity(draft.ingredients.len());
        for line in draft.ingredients {
            if line.name.trim().is_empty() {
                continue;
            }
            let resolved = match self
                .resolver
                .resolve_or_create(&line.name, &line.unit, line.shop_url.as_deref())
                .await
            {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.release_ingredients(&created).await;
                    return Err(e);
                }
            };
            if resolved.created {
                created.push(resolved.record.id);
            }
            ingredients.push(RecipeIngredientRef {
                ingredient_id: resolved.record.id,
                name: line.name.trim().to_owned(),
                amount: line.amount.trim().to_owned(),
                unit: line.unit.trim().to_owned(),
                shop_url: normalize_shop_url(line.shop_url.as_deref()),
            });
        }

        let video_url = draft
            .video_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());
        let thumbnail_url = video_url.as_deref().and_then(youtube::thumbnail_for_link);

        let recipe = NewRecipe {
            title: title.to_owned(),
            description: draft.description.trim().to_owned(),
            ingredients,
            steps: draft.steps,
            video_url,
            thumbnail_url,
            is_favorite,
        };
        Ok((recipe, created))
    }

    /// Save a new recipe
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` without a title, or a store error
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn save_recipe(&self, draft: RecipeDraft) -> AppResult<Recipe> {
        let is_favorite = draft.is_favorite;
        let (new_recipe, created) = self.resolve_draft(draft, is_favorite).await?;
        let recipe = match self.database.create_recipe(&new_recipe).await {
            Ok(recipe) => recipe,
            Err(e) => {
                self.release_ingredients(&created).await;
                return Err(e);
            }
        };
        info!(recipe_id = %recipe.id, ingredients = recipe.ingredients.len(), "Saved recipe");
        self.sync.notify(SyncTopic::Recipes);
        Ok(recipe)
    }

    /// Replace a recipe's contents, keeping its favorite flag
    ///
    /// Ingredient records the recipe no longer uses are deleted when no other
    /// recipe references them.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, `MissingRequiredField`
    /// without a title, or a store error
    #[instrument(skip(self, draft), fields(recipe_id = %id))]
    pub async fn update_recipe(&self, id: Uuid, draft: RecipeDraft) -> AppResult<Recipe> {
        let existing = self.get(id).await?;
        let (new_recipe, created) = self.resolve_draft(draft, existing.is_favorite).await?;
        let written = self
            .database
            .update_recipe(id, &new_recipe)
            .await
            .and_then(|updated| {
                updated.ok_or_else(|| AppError::not_found(format!("Recipe {id}")))
            });
        let recipe = match written {
            Ok(recipe) => recipe,
            Err(e) => {
                self.release_ingredients(&created).await;
                return Err(e);
            }
        };
        self.sync.notify(SyncTopic::Recipes);

        let kept: HashSet<Uuid> = recipe.ingredient_ids().into_iter().collect();
        let dropped: Vec<Uuid> = existing
            .ingredient_ids()
            .into_iter()
            .filter(|ingredient_id| !kept.contains(ingredient_id))
            .collect();
        self.release_ingredients(&dropped).await;
        Ok(recipe)
    }

    /// Delete a recipe and any ingredient records only it used
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a store error
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn delete_recipe(&self, id: Uuid) -> AppResult<RecipeDeletion> {
        let existing = self.get(id).await?;
        if !self.database.delete_recipe(id).await? {
            return Err(AppError::not_found(format!("Recipe {id}")));
        }
        info!("Deleted recipe");
        self.sync.notify(SyncTopic::Recipes);

        let ingredients_removed = self.release_ingredients(&existing.ingredient_ids()).await;
        Ok(RecipeDeletion {
            recipe_id: id,
            ingredients_removed,
        })
    }

    /// Run `delete_if_unused` for ingredients a recipe stopped using or never got to use
    ///
    /// Failures are only logged.
    async fn release_ingredients(&self, ingredient_ids: &[Uuid]) -> usize {
        let mut removed = 0;
        for &ingredient_id in ingredient_ids {
            match self.resolver.delete_if_unused(ingredient_id).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(%ingredient_id, error = %e, "Failed to clean up unused ingredient");
                }
            }
        }
        removed
    }

    /// Flip the favorite flag
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a store error
    pub async fn toggle_favorite(&self, id: Uuid) -> AppResult<Recipe> {
        let existing = self.get(id).await?;
        let recipe = self
            .database
            .set_recipe_favorite(id, !existing.is_favorite)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;
        self.sync.notify(SyncTopic::Recipes);
        Ok(recipe)
    }

    /// Favorite recipes, newest first
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn favorites(&self) -> AppResult<Vec<Recipe>> {
        self.database.list_recipes(true).await
    }

    /// All recipes, newest first
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn list(&self) -> AppResult<Vec<Recipe>> {
        self.database.list_recipes(false).await
    }

    /// One recipe
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a store error
    pub async fn get(&self, id: Uuid) -> AppResult<Recipe> {
        self.database
            .get_recipe(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))
    }

    /// Recipes with a line pointing at the ingredient
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn recipes_using_ingredient(&self, ingredient_id: Uuid) -> AppResult<Vec<Recipe>> {
        self.database
            .recipes_referencing_ingredient(ingredient_id)
            .await
    }

    /// Search recipes by title and ingredients by name
    ///
    /// A blank query returns empty results.
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn search(&self, query: &str) -> AppResult<SearchResults> {
        let query = query.trim();
        if normalize_name(query).is_empty() {
            return Ok(SearchResults::default());
        }

        let recipes = self.database.search_recipes(query).await?;
        let keywords = keyword_suggestions(&recipes, query, limits::SEARCH_KEYWORD_SUGGESTIONS);
        let limit = u32::try_from(limits::SEARCH_INGREDIENT_RESULTS).unwrap_or(u32::MAX);
        let ingredients = self.database.search_ingredients(query, limit).await?;

        Ok(SearchResults {
            recipes,
            keywords,
            ingredients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeStep;
    use chrono::Utc;

    fn recipe(title: &str, description: &str, ingredient_names: &[&str]) -> Recipe {
        let now = Utc::now();
        Recipe {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            ingredients: ingredient_names
                .iter()
                .map(|name| RecipeIngredientRef {
                    ingredient_id: Uuid::new_v4(),
                    name: (*name).into(),
                    amount: "1".into(),
                    unit: "개".into(),
                    shop_url: None,
                })
                .collect(),
            steps: vec![RecipeStep::new("끓인다")],
            video_url: None,
            thumbnail_url: None,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_keywords_deduplicated_in_order() {
        let recipes = vec![
            recipe("김치찌개", "김치로 끓이는 찌개", &["김치", "두부"]),
            recipe("김치볶음밥", "", &["김치", "밥"]),
        ];
        let keywords = keyword_suggestions(&recipes, "김치", 8);
        assert_eq!(
            keywords,
            vec!["김치찌개", "김치로 끓이는 찌개", "김치", "김치볶음밥"]
        );
    }

    #[test]
    fn test_keywords_respect_limit_and_case() {
        let recipes = vec![recipe("Tomato Pasta", "tomato sauce", &["Tomato"])];
        assert_eq!(keyword_suggestions(&recipes, "TOMATO", 2).len(), 2);
    }
}
