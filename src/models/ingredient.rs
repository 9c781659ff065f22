// ABOUTME: Ingredient master record types shared by the store, services and routes
// ABOUTME: Defines IngredientRecord, NewIngredient, IngredientPatch and name normalisation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalise an ingredient name into its identity key
///
/// Identity lookups compare names case-insensitively after trimming, so
/// `" 양파 "`, `"양파"` and `"Onion"`/`"ONION"` collapse to one key each.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Canonical, deduplicated entry for a distinct ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRecord {
    /// Immutable identifier assigned at creation
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Default unit of measure
    pub unit: String,
    /// Optional purchase link
    pub shop_url: Option<String>,
    /// User-toggled favorite flag
    pub is_favorite: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl IngredientRecord {
    /// Whether the record has no usable unit
    #[must_use]
    pub fn unit_is_empty(&self) -> bool {
        self.unit.trim().is_empty()
    }

    /// Whether the record has no usable purchase link
    #[must_use]
    pub fn shop_url_is_empty(&self) -> bool {
        self.shop_url
            .as_deref()
            .is_none_or(|url| url.trim().is_empty())
    }
}

/// Values for a record about to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIngredient {
    /// Display name
    pub name: String,
    /// Default unit of measure
    pub unit: String,
    /// Optional purchase link
    #[serde(default)]
    pub shop_url: Option<String>,
    /// Favorite flag
    #[serde(default)]
    pub is_favorite: bool,
}

impl NewIngredient {
    /// Ingredient with a name and unit, no link, not a favorite
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            shop_url: None,
            is_favorite: false,
        }
    }

    /// Set the purchase link
    #[must_use]
    pub fn with_shop_url(mut self, shop_url: impl Into<String>) -> Self {
        self.shop_url = Some(shop_url.into());
        self
    }
}

/// Partial update of an [`IngredientRecord`]
///
/// `None` leaves a field untouched. `shop_url: Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientPatch {
    /// New display name
    pub name: Option<String>,
    /// New unit
    pub unit: Option<String>,
    /// New purchase link, or `Some(None)` to clear it
    pub shop_url: Option<Option<String>>,
    /// New favorite flag
    pub is_favorite: Option<bool>,
}

impl IngredientPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit.is_none()
            && self.shop_url.is_none()
            && self.is_favorite.is_none()
    }

    /// Apply the patch to a record in place
    pub fn apply_to(&self, record: &mut IngredientRecord) {
        if let Some(name) = &self.name {
            record.name.clone_from(name);
        }
        if let Some(unit) = &self.unit {
            record.unit.clone_from(unit);
        }
        if let Some(shop_url) = &self.shop_url {
            record.shop_url.clone_from(shop_url);
        }
        if let Some(is_favorite) = self.is_favorite {
            record.is_favorite = is_favorite;
        }
    }
}

/// Normalise an optional link: empty or whitespace-only means "no link"
#[must_use]
pub fn normalize_shop_url(shop_url: Option<&str>) -> Option<String> {
    shop_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}
