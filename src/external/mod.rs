// ABOUTME: External API client modules (transcript extraction)
// ABOUTME: Provides the TranscriptSource trait and its HTTP-backed implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! External API Clients

pub mod transcript;

// Re-export commonly used types
pub use transcript::{
    require_video_id, TimedTextClient, TranscriptServiceClient, TranscriptSource,
};
