// ABOUTME: Environment-based configuration for the Yorist server
// ABOUTME: Reads listen address, store location, LLM and transcript settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Environment-based configuration management
//!
//! The server has no configuration file. Every setting comes from an
//! environment variable (names in [`crate::constants::env_config`]) with a
//! fallback in [`crate::constants::defaults`].

use crate::constants::{defaults, env_config};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Production environment
    Production,
    /// Testing environment
    Testing,
}

impl Environment {
    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// Path of the database file
        path: PathBuf,
    },
    /// Process-local store, lost on exit
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// Accepts `sqlite:<path>`, `sqlite::memory:` and `memory://`.
    ///
    /// # Errors
    ///
    /// Returns an error for any other scheme or an empty SQLite path
    pub fn parse_url(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "memory://" || s == "sqlite::memory:" {
            return Ok(Self::Memory);
        }
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str.is_empty() {
                anyhow::bail!("SQLite database URL has an empty path: {s}");
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            });
        }
        anyhow::bail!("Unsupported database URL '{s}' (expected sqlite:<path> or memory://)")
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory store
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(
                defaults::DATABASE_URL
                    .strip_prefix("sqlite:")
                    .unwrap_or(defaults::DATABASE_URL),
            ),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SQLite { path } => write!(f, "sqlite:{}", path.display()),
            Self::Memory => write!(f, "memory://"),
        }
    }
}

/// Chat-completion settings used by recipe generation
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; generation is disabled when unset
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint
    pub base_url: String,
    /// Chat model
    pub model: String,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::OPENAI_BASE_URL.to_owned(),
            model: defaults::OPENAI_MODEL.to_owned(),
        }
    }
}

/// Which transcript backend the server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptBackend {
    /// Dedicated transcript HTTP service
    #[default]
    Service,
    /// Direct caption download from the timedtext endpoint
    TimedText,
}

impl TranscriptBackend {
    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "timedtext" | "timed_text" | "captions" => Self::TimedText,
            _ => Self::Service,
        }
    }
}

impl fmt::Display for TranscriptBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::TimedText => write!(f, "timedtext"),
        }
    }
}

/// Transcript extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Selected backend
    pub backend: TranscriptBackend,
    /// Endpoint of the transcript service
    pub service_url: String,
    /// Endpoint of the caption listing/download API
    pub timedtext_url: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            backend: TranscriptBackend::default(),
            service_url: defaults::TRANSCRIPT_API_URL.to_owned(),
            timedtext_url: defaults::TIMEDTEXT_URL.to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub http_host: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Store location
    pub database_url: DatabaseUrl,
    /// Deployment environment
    pub environment: Environment,
    /// Generation settings
    pub llm: LlmConfig,
    /// Transcript settings
    pub transcript: TranscriptConfig,
    /// Debounce interval clients should apply before issuing search requests
    pub search_debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: defaults::HTTP_HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            database_url: DatabaseUrl::default(),
            environment: Environment::default(),
            llm: LlmConfig::default(),
            transcript: TranscriptConfig::default(),
            search_debounce_ms: defaults::SEARCH_DEBOUNCE_MS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration fails [`ServerConfig::validate`]
    pub fn from_env() -> Result<Self> {
        let http_port = env_var_or(env_config::HTTP_PORT, &defaults::HTTP_PORT.to_string())
            .parse()
            .with_context(|| format!("Invalid {} value", env_config::HTTP_PORT))?;

        let database_url = DatabaseUrl::parse_url(&env_var_or(
            env_config::DATABASE_URL,
            defaults::DATABASE_URL,
        ))
        .with_context(|| format!("Invalid {} value", env_config::DATABASE_URL))?;

        let api_key = env::var(env_config::OPENAI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());

        let search_debounce_ms = env_var_or(
            env_config::SEARCH_DEBOUNCE_MS,
            &defaults::SEARCH_DEBOUNCE_MS.to_string(),
        )
        .parse()
        .with_context(|| format!("Invalid {} value", env_config::SEARCH_DEBOUNCE_MS))?;

        let config = Self {
            http_host: env_var_or(env_config::HTTP_HOST, defaults::HTTP_HOST),
            http_port,
            database_url,
            environment: Environment::from_str_or_default(&env_var_or(
                env_config::ENVIRONMENT,
                "development",
            )),
            llm: LlmConfig {
                api_key,
                base_url: env_var_or(env_config::OPENAI_BASE_URL, defaults::OPENAI_BASE_URL),
                model: env_var_or(env_config::OPENAI_MODEL, defaults::OPENAI_MODEL),
            },
            transcript: TranscriptConfig {
                backend: TranscriptBackend::from_str_or_default(&env_var_or(
                    env_config::TRANSCRIPT_BACKEND,
                    "service",
                )),
                service_url: env_var_or(env_config::TRANSCRIPT_API_URL, defaults::TRANSCRIPT_API_URL),
                timedtext_url: defaults::TIMEDTEXT_URL.to_owned(),
            },
            search_debounce_ms,
        };

        config.validate()?;
        if config.llm.api_key.is_none() {
            warn!(
                "{} is not set; recipe generation requests will be rejected",
                env_config::OPENAI_API_KEY
            );
        }
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the port is zero or an endpoint is not a valid URL
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            anyhow::bail!("HTTP port must be non-zero");
        }
        url::Url::parse(&self.llm.base_url)
            .with_context(|| format!("Invalid LLM base URL: {}", self.llm.base_url))?;
        url::Url::parse(&self.transcript.service_url).with_context(|| {
            format!(
                "Invalid transcript service URL: {}",
                self.transcript.service_url
            )
        })?;
        Ok(())
    }

    /// Socket address string for the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Yorist Server Configuration:\n\
             - Listen: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - LLM: {} ({}), API key: {}\n\
             - Transcript backend: {} ({})\n\
             - Search debounce: {}ms",
            self.bind_address(),
            self.environment,
            self.database_url,
            self.llm.model,
            self.llm.base_url,
            if self.llm.api_key.is_some() {
                "[REDACTED]"
            } else {
                "not set"
            },
            self.transcript.backend,
            match self.transcript.backend {
                TranscriptBackend::Service => &self.transcript.service_url,
                TranscriptBackend::TimedText => &self.transcript.timedtext_url,
            },
            self.search_debounce_ms,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            env_config::HTTP_PORT,
            env_config::HTTP_HOST,
            env_config::DATABASE_URL,
            env_config::ENVIRONMENT,
            env_config::OPENAI_API_KEY,
            env_config::OPENAI_BASE_URL,
            env_config::OPENAI_MODEL,
            env_config::TRANSCRIPT_BACKEND,
            env_config::TRANSCRIPT_API_URL,
            env_config::SEARCH_DEBOUNCE_MS,
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("production"),
            Environment::Production
        );
        assert_eq!(Environment::from_str_or_default("TEST"), Environment::Testing);
        assert_eq!(
            Environment::from_str_or_default("whatever"),
            Environment::Development
        );
    }

    #[test]
    fn test_database_url_parsing() {
        let sqlite_url = DatabaseUrl::parse_url("sqlite:./test.db").unwrap();
        assert!(!sqlite_url.is_memory());
        assert_eq!(sqlite_url.to_connection_string(), "sqlite:./test.db");

        assert!(DatabaseUrl::parse_url("memory://").unwrap().is_memory());
        assert!(DatabaseUrl::parse_url("sqlite::memory:").unwrap().is_memory());

        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
        assert!(DatabaseUrl::parse_url("sqlite:").is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.http_host, "127.0.0.1");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.transcript.backend, TranscriptBackend::Service);
        assert_eq!(config.search_debounce_ms, 300);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(env_config::HTTP_PORT, "9000");
        env::set_var(env_config::DATABASE_URL, "memory://");
        env::set_var(env_config::TRANSCRIPT_BACKEND, "timedtext");
        env::set_var(env_config::OPENAI_API_KEY, "sk-test");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 9000);
        assert!(config.database_url.is_memory());
        assert_eq!(config.transcript.backend, TranscriptBackend::TimedText);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        clear_env();
        env::set_var(env_config::HTTP_PORT, "0");
        assert!(ServerConfig::from_env().is_err());

        env::set_var(env_config::HTTP_PORT, "not-a-port");
        assert!(ServerConfig::from_env().is_err());

        env::remove_var(env_config::HTTP_PORT);
        env::set_var(env_config::DATABASE_URL, "mysql://nope");
        assert!(ServerConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_summary_redacts_api_key() {
        let config = ServerConfig {
            llm: LlmConfig {
                api_key: Some("sk-very-secret".to_owned()),
                ..LlmConfig::default()
            },
            ..ServerConfig::default()
        };
        let summary = config.summary();
        assert!(summary.contains("[REDACTED]"));
        assert!(!summary.contains("sk-very-secret"));
        assert!(!format!("{:?}", config.llm).contains("sk-very-secret"));
    }
}
