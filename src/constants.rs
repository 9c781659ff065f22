// ABOUTME: System-wide constants and configuration defaults for the Yorist API
// ABOUTME: Environment variable names, default values, limits and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Constants Module
//!
//! Application constants grouped by concern. Environment variable names live in
//! [`env_config`]; their fallbacks live in [`defaults`].

/// Names of the environment variables read by [`crate::config::environment::ServerConfig`]
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "YORIST_HTTP_PORT";
    /// HTTP bind address
    pub const HTTP_HOST: &str = "YORIST_HTTP_HOST";
    /// Store location (`sqlite:...` or `memory://`)
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// API key for the chat-completion service
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Base URL for the chat-completion service
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Chat model used for recipe generation
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    /// Transcript backend selector (`service` or `timedtext`)
    pub const TRANSCRIPT_BACKEND: &str = "YORIST_TRANSCRIPT_BACKEND";
    /// Transcript service endpoint
    pub const TRANSCRIPT_API_URL: &str = "PYTHON_TRANSCRIPT_API_URL";
    /// Search debounce interval advertised to clients
    pub const SEARCH_DEBOUNCE_MS: &str = "YORIST_SEARCH_DEBOUNCE_MS";
}

/// Default values used when the environment does not override them
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Default bind address
    pub const HTTP_HOST: &str = "127.0.0.1";
    /// Default store location
    pub const DATABASE_URL: &str = "sqlite:./data/yorist.db";
    /// Default OpenAI-compatible endpoint
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default generation model
    pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
    /// Default transcript service endpoint
    pub const TRANSCRIPT_API_URL: &str = "http://localhost:5001/transcript";
    /// Caption listing/download endpoint for the timedtext backend
    pub const TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";
    /// Default search debounce
    pub const SEARCH_DEBOUNCE_MS: u64 = 300;
    /// Unit assigned to a new ingredient record when none was given
    pub const INGREDIENT_UNIT: &str = "개";
}

/// Generation parameters for the recipe prompt
pub mod generation {
    /// Sampling temperature
    pub const TEMPERATURE: f32 = 0.2;
    /// Completion budget
    pub const MAX_TOKENS: u32 = 1200;
}

/// Result-size limits
pub mod limits {
    /// Keyword suggestions returned by recipe search
    pub const SEARCH_KEYWORD_SUGGESTIONS: usize = 8;
    /// Ingredient records returned alongside recipe search
    pub const SEARCH_INGREDIENT_RESULTS: usize = 10;
    /// Default autocomplete page size
    pub const AUTOCOMPLETE_DEFAULT: u32 = 7;
    /// Upper bound for autocomplete page size
    pub const AUTOCOMPLETE_MAX: u32 = 50;
    /// Buffered sync events per subscriber before it starts lagging
    pub const SYNC_CHANNEL_CAPACITY: usize = 64;
    /// Upstream error bodies are truncated to this many characters in messages
    pub const ERROR_BODY_PREVIEW_CHARS: usize = 200;
}

/// Service names used in structured logs
pub mod service_names {
    /// The HTTP server
    pub const YORIST_SERVER: &str = "yorist-server";
    /// The chat-completion service label
    pub const OPENAI: &str = "OpenAI";
    /// The transcript service label
    pub const TRANSCRIPT_SERVICE: &str = "Transcript service";
    /// The timedtext caption endpoint label
    pub const TIMEDTEXT: &str = "YouTube timedtext";
}
