// ABOUTME: Core data models for ingredient master records and recipes
// ABOUTME: Re-exports the ingredient and recipe types used across the crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Data Models
//!
//! - `IngredientRecord`: canonical entry for a distinct ingredient, shared by id
//!   across every recipe that uses it
//! - `Recipe`: aggregate root holding ingredient references and ordered steps
//! - `RecipeDraft` / `IngredientLine`: client input before names are resolved
//!   to master records
//! - `NewRecipe`: resolved contents handed to the store

/// Ingredient master records
pub mod ingredient;
/// Recipes and their ingredient references
pub mod recipe;

pub use ingredient::{
    normalize_name, normalize_shop_url, IngredientPatch, IngredientRecord, NewIngredient,
};
pub use recipe::{
    IngredientLine, NewRecipe, Recipe, RecipeDraft, RecipeIngredientRef, RecipeStep,
};
