// ABOUTME: Ingredient maintenance commands for yorist-cli
// ABOUTME: Handles merge, rename-with-reconciliation and unused-record cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use tracing::info;
use uuid::Uuid;
use yorist::{
    errors::{AppError, AppResult},
    resources::ServerResources,
    services::ingredient_resolver::RenameOutcome,
};

use crate::helpers::display::{display_ingredient, display_merge_report};

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_input(format!("Invalid id: {raw}")))
}

/// Merge one record into another
pub async fn merge(resources: &ServerResources, old_id: &str, new_id: &str) -> AppResult<()> {
    let report = resources
        .ingredients
        .merge(parse_id(old_id)?, parse_id(new_id)?)
        .await?;
    display_merge_report(&report);
    Ok(())
}

/// Rename a record with reconciliation
pub async fn rename(
    resources: &ServerResources,
    id: &str,
    name: &str,
    unit: &str,
    shop_url: Option<&str>,
) -> AppResult<()> {
    let outcome = resources
        .ingredients
        .rename_with_reconciliation(parse_id(id)?, name, unit, shop_url)
        .await?;

    match outcome {
        RenameOutcome::Updated(record) => {
            println!("Updated in place");
            display_ingredient(&record);
        }
        RenameOutcome::Merged { surviving, report } => {
            println!("Name already taken; merged into {}", surviving.id);
            display_merge_report(&report);
            display_ingredient(&surviving);
        }
        RenameOutcome::MergeFailed { error, .. } => return Err(error),
    }
    Ok(())
}

/// Delete every unreferenced record
pub async fn cleanup(resources: &ServerResources) -> AppResult<()> {
    let deleted = resources.ingredients.cleanup_unused().await?;
    info!(deleted, "Cleanup complete");
    println!("Deleted {deleted} unused ingredient record(s)");
    Ok(())
}
