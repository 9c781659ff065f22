// ABOUTME: SQLite storage for ingredient master records and recipes
// ABOUTME: Owns the sqlx pool, schema migrations and fallible row decoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Database Management
//!
//! Two tables back the application: `ingredients_master` holds the canonical
//! ingredient records and `recipes` holds recipes with their ingredient
//! references as a JSON array. Recipes point at master records by id only;
//! there is no foreign key, so reference checks run over the JSON column.

mod ingredients;
mod recipes;

use crate::errors::{AppError, AppResult};
use crate::models::normalize_name;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Database manager for ingredient and recipe storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database at `database_url` and run migrations
    ///
    /// `sqlite::memory:` opens a private in-memory database. It is pinned to a
    /// single connection because every new connection would see an empty database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, the file cannot be created or
    /// a migration statement fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid SQLite URL '{database_url}': {e}")))?
            .create_if_missing(true);

        if !is_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {database_url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database_url, "SQLite database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        debug!("Running SQLite migrations");
        self.migrate_ingredients().await?;
        self.migrate_recipes().await?;
        Ok(())
    }

    async fn migrate_ingredients(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients_master (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL,
                unit TEXT NOT NULL DEFAULT '',
                shop_url TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredients_master: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_ingredients_name_key ON ingredients_master(name_key)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to index ingredients_master: {e}")))?;

        Ok(())
    }

    async fn migrate_recipes(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                title_key TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                ingredients TEXT NOT NULL DEFAULT '[]',
                steps TEXT NOT NULL DEFAULT '[]',
                video_url TEXT,
                thumbnail_url TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipes: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_created_at ON recipes(created_at)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to index recipes: {e}")))?;

        self.backfill_title_keys().await
    }

    /// Add and fill `title_key` on files created before the column existed
    async fn backfill_title_keys(&self) -> AppResult<()> {
        let has_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('recipes') WHERE name = 'title_key'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to inspect recipes schema: {e}")))?;

        if has_column == 0 {
            sqlx::query("ALTER TABLE recipes ADD COLUMN title_key TEXT NOT NULL DEFAULT ''")
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to add title_key: {e}")))?;
        }

        let rows = sqlx::query("SELECT id, title FROM recipes WHERE title_key = ''")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read recipe titles: {e}")))?;
        if rows.is_empty() {
            return Ok(());
        }

        debug!(recipes = rows.len(), "Backfilling recipe title keys");
        for row in &rows {
            let id = get_string(row, "id")?;
            let title = get_string(row, "title")?;
            sqlx::query("UPDATE recipes SET title_key = $2 WHERE id = $1")
                .bind(id)
                .bind(normalize_name(&title))
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to backfill title_key: {e}")))?;
        }
        Ok(())
    }
}

/// Fixed-width RFC 3339 timestamp so that text ordering matches time ordering
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern and wrap it in wildcards
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn get_string(row: &SqliteRow, column: &str) -> AppResult<String> {
    row.try_get::<String, _>(column).map_err(AppError::from)
}

pub(crate) fn get_optional_string(row: &SqliteRow, column: &str) -> AppResult<Option<String>> {
    row.try_get::<Option<String>, _>(column)
        .map_err(AppError::from)
}

pub(crate) fn get_bool(row: &SqliteRow, column: &str) -> AppResult<bool> {
    row.try_get::<bool, _>(column).map_err(AppError::from)
}

pub(crate) fn get_uuid(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let raw = get_string(row, column)?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::schema_mismatch(format!("Column {column} is not a UUID ({raw}): {e}")))
}

pub(crate) fn get_timestamp(row: &SqliteRow, column: &str) -> AppResult<DateTime<Utc>> {
    let raw = get_string(row, column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            AppError::schema_mismatch(format!("Column {column} is not a timestamp ({raw}): {e}"))
        })
}

pub(crate) fn get_json<T: serde::de::DeserializeOwned>(
    row: &SqliteRow,
    column: &str,
) -> AppResult<T> {
    let raw = get_string(row, column)?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::schema_mismatch(format!("Column {column} holds malformed JSON: {e}")))
}
