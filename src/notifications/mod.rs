// ABOUTME: In-process change notification for ingredient and recipe state
// ABOUTME: Exposes the SyncHub publish/subscribe channel shared through ServerResources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

/// Versioned publish/subscribe hub for change notifications
pub mod sync;

pub use sync::{SyncEvent, SyncHub, SyncTopic};
