// ABOUTME: OpenAI chat-completion provider used for recipe generation
// ABOUTME: Talks to any OpenAI-compatible /chat/completions endpoint with a bearer key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # `OpenAI` Provider
//!
//! Implementation of the `LlmProvider` trait for the `OpenAI` chat API and
//! endpoints that speak the same protocol.
//!
//! ## Configuration
//!
//! - `OPENAI_API_KEY`: bearer key (required)
//! - `OPENAI_BASE_URL`: endpoint root (default `https://api.openai.com/v1`)
//! - `OPENAI_MODEL`: model (default `gpt-3.5-turbo`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::constants::{env_config, limits, service_names};
use crate::errors::{AppError, ErrorCode};

/// Request timeout for completions
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI`-compatible chat provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider for `base_url` using `model` by default
    #[must_use]
    pub fn new(api_key: String, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
        }
    }

    /// Create a provider from the server configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigMissing` error if no API key is configured
    pub fn from_config(config: &LlmConfig) -> Result<Self, AppError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!(
                    "Missing {} environment variable; recipe generation is disabled",
                    env_config::OPENAI_API_KEY
                ),
            )
        })?;
        Ok(Self::new(api_key, &config.base_url, &config.model))
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Parse error response from the API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let error_type = error_response
                .error
                .error_type
                .unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                401 => AppError::new(
                    ErrorCode::ConfigError,
                    format!(
                        "OpenAI API authentication failed: {}",
                        error_response.error.message
                    ),
                ),
                429 => AppError::external_service(
                    service_names::OPENAI,
                    format!("Rate limit exceeded: {}", error_response.error.message),
                ),
                _ => AppError::external_service(
                    service_names::OPENAI,
                    format!("{error_type} - {}", error_response.error.message),
                ),
            }
        } else {
            AppError::external_service(
                service_names::OPENAI,
                format!(
                    "API error ({status}): {}",
                    body.chars()
                        .take(limits::ERROR_BODY_PREVIEW_CHARS)
                        .collect::<String>()
                ),
            )
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.model);

        debug!("Sending chat completion request to OpenAI");

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to OpenAI API: {}", e);
                AppError::external_service(service_names::OPENAI, format!("Failed to connect: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read OpenAI API response: {}", e);
            AppError::external_service(
                service_names::OPENAI,
                format!("Failed to read response: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse OpenAI API response: {}", e);
            AppError::external_service(
                service_names::OPENAI,
                format!("Failed to parse response: {e}"),
            )
        })?;

        let choice = openai_response.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(service_names::OPENAI, "API returned no choices")
        })?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AppError::external_service(service_names::OPENAI, "API returned an empty message")
            })?;

        debug!(
            "Received response from OpenAI: {} chars, finish_reason: {:?}",
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: openai_response.model.unwrap_or_else(|| model.to_owned()),
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
