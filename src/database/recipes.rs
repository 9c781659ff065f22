// ABOUTME: SQLite operations on the recipes table
// ABOUTME: Recipe CRUD, favorites, title search and the ingredient-reference filter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use super::{
    format_timestamp, get_bool, get_json, get_optional_string, get_string, get_timestamp,
    get_uuid, like_pattern, Database,
};
use crate::errors::{AppError, AppResult};
use crate::models::{normalize_name, NewRecipe, Recipe, RecipeIngredientRef};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

const RECIPE_COLUMNS: &str = "id, title, description, ingredients, steps, video_url, thumbnail_url, is_favorite, created_at, updated_at";

fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    Ok(Recipe {
        id: get_uuid(row, "id")?,
        title: get_string(row, "title")?,
        description: get_string(row, "description")?,
        ingredients: get_json(row, "ingredients")?,
        steps: get_json(row, "steps")?,
        video_url: get_optional_string(row, "video_url")?,
        thumbnail_url: get_optional_string(row, "thumbnail_url")?,
        is_favorite: get_bool(row, "is_favorite")?,
        created_at: get_timestamp(row, "created_at")?,
        updated_at: get_timestamp(row, "updated_at")?,
    })
}

fn rows_to_recipes(rows: &[SqliteRow]) -> AppResult<Vec<Recipe>> {
    rows.iter().map(row_to_recipe).collect()
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::internal(format!("Failed to serialize recipe {what}: {e}")))
}

impl Database {
    /// Insert a new recipe
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_recipe(&self, recipe: &NewRecipe) -> AppResult<Recipe> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r"
            INSERT INTO recipes (id, title, title_key, description, ingredients, steps, video_url, thumbnail_url, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ",
        )
        .bind(id.to_string())
        .bind(&recipe.title)
        .bind(normalize_name(&recipe.title))
        .bind(&recipe.description)
        .bind(to_json(&recipe.ingredients, "ingredients")?)
        .bind(to_json(&recipe.steps, "steps")?)
        .bind(&recipe.video_url)
        .bind(&recipe.thumbnail_url)
        .bind(recipe.is_favorite)
        .bind(format_timestamp(now))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        Ok(Recipe {
            id,
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            video_url: recipe.video_url.clone(),
            thumbnail_url: recipe.thumbnail_url.clone(),
            is_favorite: recipe.is_favorite,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a recipe by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the row does not decode
    pub async fn get_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.as_ref().map(row_to_recipe).transpose()
    }

    /// List recipes newest first, optionally favorites only
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a row does not decode
    pub async fn list_recipes(&self, favorites_only: bool) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {RECIPE_COLUMNS} FROM recipes
            WHERE ($1 = 0 OR is_favorite = 1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(favorites_only)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        rows_to_recipes(&rows)
    }

    /// Recipes whose title contains `term`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a row does not decode
    pub async fn search_recipes(&self, term: &str) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {RECIPE_COLUMNS} FROM recipes
            WHERE title_key LIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(like_pattern(&normalize_name(term)))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to search recipes: {e}")))?;

        rows_to_recipes(&rows)
    }

    /// Replace a recipe's contents, keeping its id and creation time
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update_recipe(&self, id: Uuid, recipe: &NewRecipe) -> AppResult<Option<Recipe>> {
        let result = sqlx::query(
            r"
            UPDATE recipes
            SET title = $2, title_key = $3, description = $4, ingredients = $5, steps = $6,
                video_url = $7, thumbnail_url = $8, is_favorite = $9, updated_at = $10
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .bind(&recipe.title)
        .bind(normalize_name(&recipe.title))
        .bind(&recipe.description)
        .bind(to_json(&recipe.ingredients, "ingredients")?)
        .bind(to_json(&recipe.steps, "steps")?)
        .bind(&recipe.video_url)
        .bind(&recipe.thumbnail_url)
        .bind(recipe.is_favorite)
        .bind(format_timestamp(Utc::now()))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_recipe(id).await
    }

    /// Overwrite only the ingredient lines of a recipe
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn set_recipe_ingredients(
        &self,
        id: Uuid,
        ingredients: &[RecipeIngredientRef],
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE recipes SET ingredients = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id.to_string())
        .bind(to_json(&ingredients, "ingredients")?)
        .bind(format_timestamp(Utc::now()))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to rewrite recipe ingredients: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the favorite flag
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn set_recipe_favorite(&self, id: Uuid, is_favorite: bool) -> AppResult<Option<Recipe>> {
        let result = sqlx::query("UPDATE recipes SET is_favorite = $2, updated_at = $3 WHERE id = $1")
            .bind(id.to_string())
            .bind(is_favorite)
            .bind(format_timestamp(Utc::now()))
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update favorite: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_recipe(id).await
    }

    /// Delete a recipe; returns whether a row was removed
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete_recipe(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Recipes with at least one ingredient line pointing at `ingredient_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a row does not decode
    pub async fn recipes_referencing_ingredient(&self, ingredient_id: Uuid) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {RECIPE_COLUMNS} FROM recipes
            WHERE EXISTS (
                SELECT 1 FROM json_each(recipes.ingredients) AS line
                WHERE json_extract(line.value, '$.ingredient_id') = $1
            )
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(ingredient_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to scan recipes for ingredient: {e}")))?;

        rows_to_recipes(&rows)
    }
}
