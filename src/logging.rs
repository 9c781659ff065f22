// ABOUTME: Logging configuration and structured logging setup for the Yorist server
// ABOUTME: Builds the tracing-subscriber registry with env filter and output format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Structured logging configuration

use crate::constants::service_names;
use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, testing, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    /// Parse from string, falling back to pretty output
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            service_name: service_names::YORIST_SERVER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = LogFormat::from_str_or_default(env::var("LOG_FORMAT").as_deref().unwrap_or(""));
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        // In production, use more detailed logging
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::YORIST_SERVER.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// Build the env filter with noise reduction for chatty dependencies
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").map_or_else(
            |_| EnvFilter::new(&self.level),
            |directive| EnvFilter::new(&directive),
        );

        let app_directive = format!("yorist={}", self.level);
        [
            "hyper=warn",
            "hyper::proto=warn",
            "reqwest=warn",
            "sqlx=warn",
            "sqlx::query=warn",
            "tower_http=info",
            app_directive.as_str(),
        ]
        .into_iter()
        .fold(base, |filter, directive| {
            filter.add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            )
        })
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE)
                    .json();
                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout);
                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_file(false)
                    .with_line_number(false)
                    .with_target(false)
                    .with_writer(io::stdout);
                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Yorist starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "location": self.include_location,
                "thread": self.include_thread
            }
        });
        info!("Logging configured: {}", config_summary);
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}
