// ABOUTME: Shared helpers for integration tests
// ABOUTME: Exports the oneshot HTTP request helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod axum_test;
