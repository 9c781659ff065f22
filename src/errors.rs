// ABOUTME: Unified error type, error codes and HTTP mapping for the Yorist API
// ABOUTME: Every fallible operation in the crate returns AppResult<T>
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Unified Error Handling System
//!
//! All store, service and upstream failures are expressed as an [`AppError`]
//! carrying an [`ErrorCode`]. Nothing here is fatal to the process: every error
//! is scoped to the single user action that produced it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Input failed validation (empty name, malformed URL, ...)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field is absent
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// Input has the wrong shape
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,

    // Resource Management (4000-4999)
    /// Record does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// No transcript could be extracted for the video
    #[serde(rename = "TRANSCRIPT_UNAVAILABLE")]
    TranscriptUnavailable = 4001,
    /// Write conflicts with the current state of a record
    #[serde(rename = "RESOURCE_CONFLICT")]
    ResourceConflict = 4002,

    // External Services (5000-5999)
    /// Upstream service returned a failure
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// Upstream service is not reachable or not configured
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,
    /// Upstream answered with text that is not the expected JSON
    #[serde(rename = "PARSE_FAILURE")]
    ParseFailure = 5002,

    // Configuration (6000-6999)
    /// Configuration could not be loaded
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Store operation failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// Stored record does not match the expected schema
    #[serde(rename = "SCHEMA_MISMATCH")]
    SchemaMismatch = 9002,
    /// Ingredient merge stopped part way; data may be partially rewritten
    #[serde(rename = "MERGE_INCOMPLETE")]
    MergeIncomplete = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::InvalidFormat => 400,
            Self::ResourceNotFound | Self::TranscriptUnavailable => 404,
            Self::ResourceConflict => 409,
            Self::ExternalServiceError | Self::ParseFailure => 502,
            Self::ExternalServiceUnavailable => 503,
            Self::ConfigError
            | Self::ConfigMissing
            | Self::InternalError
            | Self::DatabaseError
            | Self::SchemaMismatch
            | Self::MergeIncomplete => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing",
            Self::InvalidFormat => "The data format is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::TranscriptUnavailable => "No transcript could be extracted for this video",
            Self::ResourceConflict => "The resource was changed concurrently",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ParseFailure => "The generated response could not be parsed",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SchemaMismatch => "Stored data does not match the expected schema",
            Self::MergeIncomplete => "Ingredient merge did not complete",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details (raw upstream text, partial progress, ...)
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required field missing
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {field}"),
        )
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Stored row failed to decode
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaMismatch, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Transcript could not be extracted
    pub fn transcript_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TranscriptUnavailable, message)
    }

    /// Generated text was not parseable; keeps the raw text for the user
    pub fn parse_failure(message: impl Into<String>, raw: &str) -> Self {
        Self::new(ErrorCode::ParseFailure, message)
            .with_details(serde_json::json!({ "raw": raw }))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine readable code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
    /// Structured details, omitted when empty
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                details: error.details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => Self::schema_mismatch(error.to_string()),
            other => Self::database(other.to_string()),
        }
    }
}

/// Conversion from `anyhow::Error` to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.source() {
            Some(source) => Self::new(ErrorCode::InternalError, error.to_string())
                .with_details(serde_json::json!({ "source": source.to_string() })),
            None => Self::new(ErrorCode::InternalError, error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ParseFailure.http_status(), 502);
        assert_eq!(ErrorCode::MergeIncomplete.http_status(), 500);
    }

    #[test]
    fn test_parse_failure_keeps_raw_text() {
        let error = AppError::parse_failure("bad json", "{not json");
        assert_eq!(error.code, ErrorCode::ParseFailure);
        assert_eq!(error.details["raw"], "{not json");
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::not_found("Ingredient abc");
        let json = serde_json::to_string(&ErrorResponse::from(error)).unwrap();
        assert!(json.contains("RESOURCE_NOT_FOUND"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_sqlx_decode_maps_to_schema_mismatch() {
        let error = AppError::from(sqlx::Error::ColumnNotFound("name_key".to_owned()));
        assert_eq!(error.code, ErrorCode::SchemaMismatch);
    }
}
