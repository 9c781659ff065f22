// ABOUTME: Helper modules for yorist-cli
// ABOUTME: Output formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

pub mod display;
