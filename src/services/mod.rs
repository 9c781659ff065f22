// ABOUTME: Domain service layer for business logic shared by the REST API and the CLI
// ABOUTME: Ingredient identity resolution, recipe operations and recipe generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Domain service layer
//!
//! Services are protocol-agnostic: route handlers and CLI commands call the
//! same operations, so business rules hold regardless of the entry point.

/// Ingredient name lookup, merge, rename and unused-record cleanup
pub mod ingredient_resolver;

/// Video link to recipe draft via transcript and LLM
pub mod recipe_generation;

/// Recipe save, update, delete, favorites and search
pub mod recipes;
