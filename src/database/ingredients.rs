// ABOUTME: SQLite operations on the ingredients_master table
// ABOUTME: Create, lookup by normalised name, substring search, patch and guarded delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use super::{
    format_timestamp, get_bool, get_optional_string, get_string, get_timestamp, get_uuid,
    like_pattern, Database,
};
use crate::errors::{AppError, AppResult};
use crate::models::{normalize_name, IngredientPatch, IngredientRecord, NewIngredient};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

const INGREDIENT_COLUMNS: &str =
    "id, name, unit, shop_url, is_favorite, created_at, updated_at";

fn row_to_ingredient(row: &SqliteRow) -> AppResult<IngredientRecord> {
    Ok(IngredientRecord {
        id: get_uuid(row, "id")?,
        name: get_string(row, "name")?,
        unit: get_string(row, "unit")?,
        shop_url: get_optional_string(row, "shop_url")?,
        is_favorite: get_bool(row, "is_favorite")?,
        created_at: get_timestamp(row, "created_at")?,
        updated_at: get_timestamp(row, "updated_at")?,
    })
}

fn rows_to_ingredients(rows: &[SqliteRow]) -> AppResult<Vec<IngredientRecord>> {
    rows.iter().map(row_to_ingredient).collect()
}

impl Database {
    /// Insert a new ingredient record
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_ingredient(&self, ingredient: &NewIngredient) -> AppResult<IngredientRecord> {
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

        sqlx::query(
            r"
            INSERT INTO ingredients_master (id, name, name_key, unit, shop_url, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(normalize_name(&record.name))
        .bind(&record.unit)
        .bind(&record.shop_url)
        .bind(record.is_favorite)
        .bind(format_timestamp(now))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredient: {e}")))?;

        Ok(record)
    }

    /// Get an ingredient record by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or the row does not decode
    pub async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<IngredientRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients_master WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        row.as_ref().map(row_to_ingredient).transpose()
    }

    /// All records whose normalised name equals the normalised `name`,
    /// oldest first with ties broken by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a row does not decode
    pub async fn find_ingredients_by_name(&self, name: &str) -> AppResult<Vec<IngredientRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients_master WHERE name_key = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(normalize_name(name))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to look up ingredient by name: {e}")))?;

        rows_to_ingredients(&rows)
    }

    /// Case-insensitive substring search for autocomplete
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a row does not decode
    pub async fn search_ingredients(
        &self,
        term: &str,
        limit: u32,
    ) -> AppResult<Vec<IngredientRecord>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {INGREDIENT_COLUMNS} FROM ingredients_master
            WHERE name_key LIKE $1 ESCAPE '\'
            ORDER BY name_key ASC, created_at ASC
            LIMIT $2
            "
        ))
        .bind(like_pattern(&normalize_name(term)))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to search ingredients: {e}")))?;

        rows_to_ingredients(&rows)
    }

    /// List all ingredient records by name, optionally favorites only
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails or a row does not decode
    pub async fn list_ingredients(&self, favorites_only: bool) -> AppResult<Vec<IngredientRecord>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {INGREDIENT_COLUMNS} FROM ingredients_master
            WHERE ($1 = 0 OR is_favorite = 1)
            ORDER BY name_key ASC, created_at ASC
            "
        ))
        .bind(favorites_only)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;

        rows_to_ingredients(&rows)
    }

    /// Apply a patch; returns `None` when the record does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update_ingredient(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> AppResult<Option<IngredientRecord>> {
        let Some(mut record) = self.get_ingredient(id).await? else {
            return Ok(None);
        };
        patch.apply_to(&mut record);
        record.name = record.name.trim().to_owned();
        record.updated_at = Utc::now();

        let result = sqlx::query(
            r"
            UPDATE ingredients_master
            SET name = $2, name_key = $3, unit = $4, shop_url = $5, is_favorite = $6, updated_at = $7
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .bind(&record.name)
        .bind(normalize_name(&record.name))
        .bind(&record.unit)
        .bind(&record.shop_url)
        .bind(record.is_favorite)
        .bind(format_timestamp(record.updated_at))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to update ingredient: {e}")))?;

        Ok((result.rows_affected() > 0).then_some(record))
    }

    /// Delete the record only if no recipe references it, in one statement
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete_ingredient_if_unreferenced(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM ingredients_master
            WHERE id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM recipes, json_each(recipes.ingredients) AS line
                  WHERE json_extract(line.value, '$.ingredient_id') = $1
              )
            ",
        )
        .bind(id.to_string())
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to delete ingredient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
