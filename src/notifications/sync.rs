// ABOUTME: SyncHub broadcasts a version bump whenever ingredient or recipe state changes
// ABOUTME: Observers subscribe to a tokio broadcast channel and re-fetch on each event
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Change notification
//!
//! Each topic carries a monotonically increasing version. A mutation calls
//! [`SyncHub::notify`] after its write has resolved; subscribers receive a
//! [`SyncEvent`] with the new version and decide for themselves what to reload.
//! Delivery is best effort: a slow subscriber that falls more than the channel
//! capacity behind skips events, and it can always compare
//! [`SyncHub::version`] to catch up.

use crate::constants::limits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// What kind of state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTopic {
    /// Ingredient master records
    Ingredients,
    /// Recipes
    Recipes,
}

impl fmt::Display for SyncTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingredients => write!(f, "ingredients"),
            Self::Recipes => write!(f, "recipes"),
        }
    }
}

/// One change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Topic that changed
    pub topic: SyncTopic,
    /// Topic version after the change
    pub version: u64,
}

/// Publish/subscribe hub scoped to one application context
pub struct SyncHub {
    ingredients_version: AtomicU64,
    recipes_version: AtomicU64,
    sender: broadcast::Sender<SyncEvent>,
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncHub {
    /// Create a hub with both topics at version 0
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(limits::SYNC_CHANNEL_CAPACITY);
        Self {
            ingredients_version: AtomicU64::new(0),
            recipes_version: AtomicU64::new(0),
            sender,
        }
    }

    const fn counter(&self, topic: SyncTopic) -> &AtomicU64 {
        match topic {
            SyncTopic::Ingredients => &self.ingredients_version,
            SyncTopic::Recipes => &self.recipes_version,
        }
    }

    /// Bump the topic version and broadcast it; returns the new version
    ///
    /// Having no subscribers is not an error.
    pub fn notify(&self, topic: SyncTopic) -> u64 {
        let version = self.counter(topic).fetch_add(1, Ordering::SeqCst) + 1;
        let receivers = self.sender.send(SyncEvent { topic, version }).unwrap_or(0);
        debug!(%topic, version, receivers, "sync notification");
        version
    }

    /// Current version of a topic
    #[must_use]
    pub fn version(&self, topic: SyncTopic) -> u64 {
        self.counter(topic).load(Ordering::SeqCst)
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
