// ABOUTME: Re-exports command modules for yorist-cli
// ABOUTME: Ingredient maintenance and video commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

pub mod ingredient;
pub mod video;
