// ABOUTME: LLM provider abstraction for chat-completion services
// ABOUTME: Message, request and response types plus the LlmProvider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # LLM Provider Interface
//!
//! Recipe generation talks to a chat-completion service through
//! [`LlmProvider`]. The production implementation is [`OpenAiProvider`]; tests
//! plug in their own implementations.
//!
//! ## Example
//!
//! ```rust,no_run
//! use yorist::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You write recipes as JSON."),
//!         ChatMessage::user("Kimchi stew for two"),
//!     ])
//!     .with_temperature(0.2);
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod openai;
pub mod prompts;

pub use openai::OpenAiProvider;

use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier
    fn name(&self) -> &'static str;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a single chat completion; no retries
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_model("gpt-3.5-turbo")
            .with_temperature(0.2)
            .with_max_tokens(1200);
        assert_eq!(request.model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(request.max_tokens, Some(1200));
        assert_eq!(request.messages[0].role.as_str(), "user");
    }
}
