// ABOUTME: Database factory selecting the store implementation from a connection URL
// ABOUTME: Detects sqlite: and memory:// URLs and returns a shared DatabaseProvider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Database factory for creating database providers

use super::memory::MemoryDatabase;
use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite file or `sqlite::memory:`
    SQLite,
    /// Process-local map store
    Memory,
}

/// Automatically detect database type from connection string
///
/// # Errors
///
/// Returns an error if the URL is neither `sqlite:...` nor `memory://`
pub fn detect_database_type(database_url: &str) -> AppResult<DatabaseType> {
    if database_url == "memory://" {
        Ok(DatabaseType::Memory)
    } else if database_url.starts_with("sqlite:") {
        Ok(DatabaseType::SQLite)
    } else {
        Err(AppError::config(format!(
            "Unsupported database URL format: {database_url}. \
             Supported formats: sqlite:path/to/db.sqlite, memory://"
        )))
    }
}

/// Create the store for `database_url`, migrated and ready to use
///
/// # Errors
///
/// Returns an error if the URL is unsupported or the connection fails
pub async fn connect(database_url: &str) -> AppResult<Arc<dyn DatabaseProvider>> {
    debug!("Detecting database type from URL: {}", database_url);
    let db_type = detect_database_type(database_url)?;
    info!("Detected database type: {:?}", db_type);

    let provider: Arc<dyn DatabaseProvider> = match db_type {
        DatabaseType::SQLite => Arc::new(SqliteDatabase::new(database_url).await?),
        DatabaseType::Memory => Arc::new(MemoryDatabase::new()),
    };
    provider.migrate().await?;
    info!(backend = provider.backend_name(), "Database initialized successfully");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_database_type() {
        assert_eq!(
            detect_database_type("sqlite:./data/yorist.db").unwrap(),
            DatabaseType::SQLite
        );
        assert_eq!(
            detect_database_type("sqlite::memory:").unwrap(),
            DatabaseType::SQLite
        );
        assert_eq!(
            detect_database_type("memory://").unwrap(),
            DatabaseType::Memory
        );
        assert!(detect_database_type("postgres://localhost/db").is_err());
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let db = connect("memory://").await.unwrap();
        assert_eq!(db.backend_name(), "memory");
    }
}
