// ABOUTME: Video commands for yorist-cli
// ABOUTME: Link inspection and recipe generation from a transcript
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use yorist::{
    errors::{AppError, AppResult},
    resources::ServerResources,
    youtube::VideoReference,
};

use crate::helpers::display::{display_generated_recipe, display_video_reference};

/// Print what can be derived from a link
pub fn show_video_id(url: &str) -> AppResult<()> {
    let reference = VideoReference::parse(url)
        .ok_or_else(|| AppError::invalid_input(format!("Not a recognised YouTube link: '{url}'")))?;
    display_video_reference(&reference);
    Ok(())
}

/// Generate a recipe and optionally store it
pub async fn generate(resources: &ServerResources, url: &str, save: bool) -> AppResult<()> {
    let recipe = resources.generator.generate(url).await?;
    display_generated_recipe(&recipe);

    if save {
        let saved = resources.recipes.save_recipe(recipe.into()).await?;
        println!("\nSaved as recipe {}", saved.id);
    }
    Ok(())
}
