// ABOUTME: Ingredient identity resolution: name lookup, merge, rename and unused-record cleanup
// ABOUTME: Keeps ingredient master records deduplicated and drops records no recipe references
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Ingredient identity resolver
//!
//! An ingredient master record lives exactly as long as some recipe line
//! points at it. Two operations re-establish that rule after a user edit:
//! [`IngredientIdentityResolver::merge`] (a rename collided with another
//! record) and [`IngredientIdentityResolver::delete_if_unused`] (a recipe
//! stopped using an ingredient).
//!
//! Merge is a best-effort sequence, not a transaction. A failing write stops
//! it and leaves earlier rewrites in place; the caller sees
//! [`ErrorCode::MergeIncomplete`] with the number of recipes already
//! repointed and may retry. The final delete is a single conditional
//! statement in the store, so a recipe that starts referencing the old record
//! mid-merge keeps it alive instead of dangling.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::constants::defaults;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{normalize_shop_url, IngredientPatch, IngredientRecord, NewIngredient};
use crate::notifications::{SyncHub, SyncTopic};

/// What a successful merge did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Record every reference now points at
    pub surviving_id: Uuid,
    /// Record that was merged away
    pub merged_id: Uuid,
    /// Recipes whose ingredient lines were repointed
    pub recipes_rewritten: usize,
    /// Whether the merged-away record was deleted
    pub old_record_deleted: bool,
}

/// Terminal state of [`IngredientIdentityResolver::rename_with_reconciliation`]
#[derive(Debug)]
pub enum RenameOutcome {
    /// No collision; the record was updated in place and keeps its id
    Updated(IngredientRecord),
    /// The new name belonged to another record; this one was merged into it.
    /// Views bound to the old id must move to `surviving.id`.
    Merged {
        /// The record that now carries the name
        surviving: IngredientRecord,
        /// What the merge did
        report: MergeReport,
    },
    /// The collision was detected but the merge stopped part way
    MergeFailed {
        /// Record the merge was heading for
        surviving_id: Uuid,
        /// Why it stopped
        error: AppError,
    },
}

impl RenameOutcome {
    /// Id views should display after the rename, if it succeeded
    #[must_use]
    pub const fn resulting_id(&self) -> Option<Uuid> {
        match self {
            Self::Updated(record) | Self::Merged { surviving: record, .. } => Some(record.id),
            Self::MergeFailed { .. } => None,
        }
    }
}

/// Result of resolving a name for a recipe line
#[derive(Debug, Clone)]
pub struct ResolvedIngredient {
    /// The master record the line should point at
    pub record: IngredientRecord,
    /// Whether the record was created by this call
    pub created: bool,
}

/// Result of the add-ingredient form
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    /// No record had the name; a new one was inserted
    Created(IngredientRecord),
    /// An existing record had its unit and link replaced
    Updated(IngredientRecord),
}

impl UpsertOutcome {
    /// The record after the call
    #[must_use]
    pub const fn record(&self) -> &IngredientRecord {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}

fn require_name(name: &str) -> AppResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Ingredient name must not be empty"));
    }
    Ok(trimmed)
}

fn unit_or_default(unit: &str) -> String {
    let unit = unit.trim();
    if unit.is_empty() {
        defaults::INGREDIENT_UNIT.to_owned()
    } else {
        unit.to_owned()
    }
}

/// Sole writer allowed to delete ingredient master records
#[derive(Clone)]
pub struct IngredientIdentityResolver {
    database: Arc<dyn DatabaseProvider>,
    sync: Arc<SyncHub>,
}

impl IngredientIdentityResolver {
    /// Create a resolver over a store, publishing changes to `sync`
    #[must_use]
    pub fn new(database: Arc<dyn DatabaseProvider>, sync: Arc<SyncHub>) -> Self {
        Self { database, sync }
    }

    /// Look a name up, ignoring case and surrounding whitespace
    ///
    /// `Ok(None)` is the not-found signal. When duplicates exist the oldest
    /// record wins, ties broken by the lowest id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name, or a store error
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<IngredientRecord>> {
        let name = require_name(name)?;
        let matches = self.database.find_ingredients_by_name(name).await?;
        if matches.len() > 1 {
            debug!(
                name,
                duplicates = matches.len(),
                "Duplicate ingredient records share a name"
            );
        }
        Ok(matches.into_iter().next())
    }

    /// Repoint every recipe line from `old_id` to `new_id`, then delete `old_id`
    /// once nothing references it
    ///
    /// Each line keeps its own name, amount, unit and link snapshot; only the
    /// id changes. The surviving record's fields are not touched.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when both ids are the same
    /// - `ResourceNotFound` when either record does not exist
    /// - `MergeIncomplete` when a scan or write fails part way; `details`
    ///   carries `recipes_rewritten`
    #[instrument(skip(self), fields(old_id = %old_id, new_id = %new_id))]
    pub async fn merge(&self, old_id: Uuid, new_id: Uuid) -> AppResult<MergeReport> {
        if old_id == new_id {
            return Err(AppError::invalid_input(
                "Cannot merge an ingredient into itself",
            ));
        }
        for id in [old_id, new_id] {
            if self.database.get_ingredient(id).await?.is_none() {
                return Err(AppError::not_found(format!("Ingredient {id}")));
            }
        }

        let mut recipes_rewritten = 0;
        let result = self
            .repoint_and_delete(old_id, new_id, &mut recipes_rewritten)
            .await;

        if recipes_rewritten > 0 {
            self.sync.notify(SyncTopic::Recipes);
        }

        match result {
            Ok(old_record_deleted) => {
                self.sync.notify(SyncTopic::Ingredients);
                info!(
                    recipes_rewritten,
                    old_record_deleted, "Merged ingredient records"
                );
                Ok(MergeReport {
                    surviving_id: new_id,
                    merged_id: old_id,
                    recipes_rewritten,
                    old_record_deleted,
                })
            }
            Err(e) => {
                warn!(recipes_rewritten, error = %e, "Ingredient merge stopped part way");
                Err(AppError::new(
                    ErrorCode::MergeIncomplete,
                    format!("Merging ingredient {old_id} into {new_id} did not complete: {}", e.message),
                )
                .with_details(json!({
                    "old_id": old_id,
                    "new_id": new_id,
                    "recipes_rewritten": recipes_rewritten,
                }))
                .with_source(e))
            }
        }
    }

    async fn repoint_and_delete(
        &self,
        old_id: Uuid,
        new_id: Uuid,
        recipes_rewritten: &mut usize,
    ) -> AppResult<bool> {
        let referencing = self.database.recipes_referencing_ingredient(old_id).await?;
        debug!(recipes = referencing.len(), "Recipes referencing merged ingredient");

        for recipe in referencing {
            let mut lines = recipe.ingredients;
            for line in lines.iter_mut().filter(|line| line.ingredient_id == old_id) {
                line.ingredient_id = new_id;
            }
            if self
                .database
                .set_recipe_ingredients(recipe.id, &lines)
                .await?
            {
                *recipes_rewritten += 1;
            } else {
                debug!(recipe_id = %recipe.id, "Recipe vanished during merge");
            }
        }

        self.database.delete_ingredient_if_unreferenced(old_id).await
    }

    /// Delete a record only when no recipe references it
    ///
    /// Returns whether a record was deleted; a second call for the same id
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Returns a store error
    #[instrument(skip(self), fields(ingredient_id = %id))]
    pub async fn delete_if_unused(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.database.delete_ingredient_if_unreferenced(id).await?;
        if deleted {
            info!("Deleted unused ingredient record");
            self.sync.notify(SyncTopic::Ingredients);
        }
        Ok(deleted)
    }

    /// Rename a record, merging it into another record that already has the name
    ///
    /// Without a collision the record's name, unit and link are updated in
    /// place. With one, the record is merged into the holder of the name and
    /// `new_unit`/`new_shop_url` fill the survivor's fields only where they
    /// are empty. Filling is best effort: a failure there is logged and the
    /// outcome is still `Merged`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name, `ResourceNotFound` for an
    /// unknown id, or a store error from the lookup or in-place update. Merge
    /// failures are reported as [`RenameOutcome::MergeFailed`].
    #[instrument(skip(self, new_unit, new_shop_url), fields(ingredient_id = %id))]
    pub async fn rename_with_reconciliation(
        &self,
        id: Uuid,
        new_name: &str,
        new_unit: &str,
        new_shop_url: Option<&str>,
    ) -> AppResult<RenameOutcome> {
        let new_name = require_name(new_name)?;
        if self.database.get_ingredient(id).await?.is_none() {
            return Err(AppError::not_found(format!("Ingredient {id}")));
        }
        let new_unit = new_unit.trim();
        let new_shop_url = normalize_shop_url(new_shop_url);

        match self.find_by_name(new_name).await? {
            Some(existing) if existing.id != id => {
                info!(surviving_id = %existing.id, "Rename collides with existing ingredient, merging");
                match self.merge(id, existing.id).await {
                    Ok(report) => {
                        let surviving = self
                            .fill_empty_fields(existing, new_unit, new_shop_url)
                            .await;
                        Ok(RenameOutcome::Merged { surviving, report })
                    }
                    Err(error) => Ok(RenameOutcome::MergeFailed {
                        surviving_id: existing.id,
                        error,
                    }),
                }
            }
            _ => {
                let patch = IngredientPatch {
                    name: Some(new_name.to_owned()),
                    unit: Some(new_unit.to_owned()),
                    shop_url: Some(new_shop_url),
                    is_favorite: None,
                };
                let record = self
                    .database
                    .update_ingredient(id, &patch)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;
                self.sync.notify(SyncTopic::Ingredients);
                Ok(RenameOutcome::Updated(record))
            }
        }
    }

    async fn fill_empty_fields(
        &self,
        surviving: IngredientRecord,
        unit: &str,
        shop_url: Option<String>,
    ) -> IngredientRecord {
        let patch = IngredientPatch {
            unit: (surviving.unit_is_empty() && !unit.is_empty()).then(|| unit.to_owned()),
            shop_url: (surviving.shop_url_is_empty() && shop_url.is_some()).then_some(shop_url),
            ..IngredientPatch::default()
        };
        if patch.is_empty() {
            return surviving;
        }

        match self.database.update_ingredient(surviving.id, &patch).await {
            Ok(Some(updated)) => {
                self.sync.notify(SyncTopic::Ingredients);
                updated
            }
            Ok(None) => {
                warn!(surviving_id = %surviving.id, "Surviving ingredient disappeared before field fill");
                surviving
            }
            Err(e) => {
                warn!(surviving_id = %surviving.id, error = %e, "Failed to fill surviving ingredient fields");
                surviving
            }
        }
    }

    /// Find the record for a recipe line, creating it when the name is new
    ///
    /// New records get `unit` (or `개` when empty) and `shop_url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name, or a store error
    pub async fn resolve_or_create(
        &self,
        name: &str,
        unit: &str,
        shop_url: Option<&str>,
    ) -> AppResult<ResolvedIngredient> {
        if let Some(record) = self.find_by_name(name).await? {
            return Ok(ResolvedIngredient {
                record,
                created: false,
            });
        }

        let new = NewIngredient {
            name: require_name(name)?.to_owned(),
            unit: unit_or_default(unit),
            shop_url: normalize_shop_url(shop_url),
            is_favorite: false,
        };
        let record = self.database.create_ingredient(&new).await?;
        debug!(ingredient_id = %record.id, name = %record.name, "Created ingredient record");
        self.sync.notify(SyncTopic::Ingredients);
        Ok(ResolvedIngredient {
            record,
            created: true,
        })
    }

    /// Add an ingredient, or update unit and link when the name (or the given id) exists
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name, `ResourceNotFound` for an
    /// unknown `ingredient_id`, or a store error
    pub async fn upsert_ingredient(
        &self,
        ingredient_id: Option<Uuid>,
        name: &str,
        unit: &str,
        shop_url: Option<&str>,
    ) -> AppResult<UpsertOutcome> {
        let name = require_name(name)?;
        let existing_id = match ingredient_id {
            Some(id) => Some(id),
            None => self.find_by_name(name).await?.map(|record| record.id),
        };
        let shop_url = normalize_shop_url(shop_url);

        let outcome = if let Some(id) = existing_id {
            let patch = IngredientPatch {
                unit: Some(unit.trim().to_owned()),
                shop_url: Some(shop_url),
                ..IngredientPatch::default()
            };
            let record = self
                .database
                .update_ingredient(id, &patch)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;
            UpsertOutcome::Updated(record)
        } else {
            let new = NewIngredient {
                name: name.to_owned(),
                unit: unit_or_default(unit),
                shop_url,
                is_favorite: false,
            };
            UpsertOutcome::Created(self.database.create_ingredient(&new).await?)
        };

        self.sync.notify(SyncTopic::Ingredients);
        Ok(outcome)
    }

    /// Set the favorite flag
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a store error
    pub async fn set_favorite(&self, id: Uuid, is_favorite: bool) -> AppResult<IngredientRecord> {
        self.patch(
            id,
            IngredientPatch {
                is_favorite: Some(is_favorite),
                ..IngredientPatch::default()
            },
        )
        .await
    }

    /// Set the purchase link; `None` or an empty string clears it
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a store error
    pub async fn set_shop_url(
        &self,
        id: Uuid,
        shop_url: Option<&str>,
    ) -> AppResult<IngredientRecord> {
        self.patch(
            id,
            IngredientPatch {
                shop_url: Some(normalize_shop_url(shop_url)),
                ..IngredientPatch::default()
            },
        )
        .await
    }

    async fn patch(&self, id: Uuid, patch: IngredientPatch) -> AppResult<IngredientRecord> {
        let record = self
            .database
            .update_ingredient(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;
        self.sync.notify(SyncTopic::Ingredients);
        Ok(record)
    }

    /// Run `delete_if_unused` over every record; returns how many were deleted
    ///
    /// # Errors
    ///
    /// Returns the first store error
    pub async fn cleanup_unused(&self) -> AppResult<usize> {
        let mut deleted = 0;
        for record in self.database.list_ingredients(false).await? {
            if self.delete_if_unused(record.id).await? {
                deleted += 1;
            }
        }
        info!(deleted, "Unused ingredient cleanup finished");
        Ok(deleted)
    }
}
