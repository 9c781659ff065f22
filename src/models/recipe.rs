// ABOUTME: Recipe aggregate types with ingredient references and ordered steps
// ABOUTME: Defines Recipe, RecipeIngredientRef, RecipeStep, NewRecipe and RecipeDraft
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ingredient as used inside one recipe
///
/// `name`, `amount`, `unit` and `shop_url` are a snapshot taken when the line
/// was written; they may drift from the master record until the recipe is
/// edited again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientRef {
    /// Weak reference to the master record
    pub ingredient_id: Uuid,
    /// Display name snapshot
    pub name: String,
    /// Amount as entered ("1/2", "200", "적당량")
    #[serde(default)]
    pub amount: String,
    /// Unit snapshot
    #[serde(default)]
    pub unit: String,
    /// Purchase link snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_url: Option<String>,
}

/// One cooking step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    /// Instruction text
    pub description: String,
    /// Highlighted step
    #[serde(default, rename = "isImportant")]
    pub is_important: bool,
}

impl RecipeStep {
    /// Plain, non-highlighted step
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            is_important: false,
        }
    }
}

/// Stored recipe aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier
    pub id: Uuid,
    /// Recipe title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Ingredient lines, each pointing at a master record
    pub ingredients: Vec<RecipeIngredientRef>,
    /// Ordered cooking steps
    pub steps: Vec<RecipeStep>,
    /// Source video
    pub video_url: Option<String>,
    /// Thumbnail derived from the video
    pub thumbnail_url: Option<String>,
    /// Favorite flag
    pub is_favorite: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Whether any ingredient line points at `ingredient_id`
    #[must_use]
    pub fn references_ingredient(&self, ingredient_id: Uuid) -> bool {
        self.ingredients
            .iter()
            .any(|line| line.ingredient_id == ingredient_id)
    }

    /// Distinct master-record ids referenced by this recipe, in first-seen order
    #[must_use]
    pub fn ingredient_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(self.ingredients.len());
        for line in &self.ingredients {
            if !ids.contains(&line.ingredient_id) {
                ids.push(line.ingredient_id);
            }
        }
        ids
    }
}

/// Fully resolved recipe contents handed to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    /// Recipe title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Resolved ingredient lines
    pub ingredients: Vec<RecipeIngredientRef>,
    /// Ordered cooking steps
    pub steps: Vec<RecipeStep>,
    /// Source video
    pub video_url: Option<String>,
    /// Thumbnail derived from the video
    pub thumbnail_url: Option<String>,
    /// Favorite flag
    pub is_favorite: bool,
}

/// Ingredient line as submitted by a client, before name resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Master record chosen from autocomplete, if any
    #[serde(default)]
    pub ingredient_id: Option<Uuid>,
    /// Ingredient name
    pub name: String,
    /// Amount as entered
    #[serde(default)]
    pub amount: String,
    /// Unit
    #[serde(default)]
    pub unit: String,
    /// Purchase link
    #[serde(default, alias = "shopUrl")]
    pub shop_url: Option<String>,
}

impl IngredientLine {
    /// Line with a name, amount and unit
    #[must_use]
    pub fn new(name: impl Into<String>, amount: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            ingredient_id: None,
            name: name.into(),
            amount: amount.into(),
            unit: unit.into(),
            shop_url: None,
        }
    }
}

/// Recipe as submitted by a client or produced by generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Recipe title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Ingredient lines to resolve
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
    /// Ordered cooking steps
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    /// Source video
    #[serde(default, alias = "videourl", alias = "videoUrl")]
    pub video_url: Option<String>,
    /// Favorite flag
    #[serde(default)]
    pub is_favorite: bool,
}
