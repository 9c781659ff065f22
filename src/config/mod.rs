// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its parts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Configuration module for the Yorist server

/// Environment and server configuration
pub mod environment;

pub use environment::{
    DatabaseUrl, Environment, LlmConfig, ServerConfig, TranscriptBackend, TranscriptConfig,
};
