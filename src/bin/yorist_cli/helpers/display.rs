// ABOUTME: Output formatting helpers for yorist-cli
// ABOUTME: Consistent display of ingredient records, merge reports, links and generated recipes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

use yorist::{
    models::IngredientRecord, services::ingredient_resolver::MergeReport,
    services::recipe_generation::GeneratedRecipe, youtube::VideoReference,
};

/// Display one ingredient record
pub fn display_ingredient(record: &IngredientRecord) {
    println!("{}", "=".repeat(50));
    println!("   Id: {}", record.id);
    println!("   Name: {}", record.name);
    println!("   Unit: {}", record.unit);
    println!(
        "   Shop URL: {}",
        record.shop_url.as_deref().unwrap_or("-")
    );
    println!("   Favorite: {}", if record.is_favorite { "yes" } else { "no" });
}

/// Display the result of a merge
pub fn display_merge_report(report: &MergeReport) {
    println!("\nMerge complete");
    println!("{}", "=".repeat(50));
    println!("   Merged: {}", report.merged_id);
    println!("   Surviving: {}", report.surviving_id);
    println!("   Recipes repointed: {}", report.recipes_rewritten);
    println!(
        "   Old record deleted: {}",
        if report.old_record_deleted {
            "yes"
        } else {
            "no (still referenced)"
        }
    );
}

/// Display everything derived from a link
pub fn display_video_reference(reference: &VideoReference) {
    println!("Video id: {}", reference.video_id);
    println!("Watch: {}", reference.watch_url);
    println!("Embed: {}", reference.embed_url);
    for thumbnail in &reference.thumbnails {
        println!("Thumbnail ({}): {}", thumbnail.quality, thumbnail.url);
    }
}

/// Display a generated recipe
pub fn display_generated_recipe(recipe: &GeneratedRecipe) {
    println!("\n{}", recipe.title);
    println!("{}", "=".repeat(50));
    if !recipe.description.is_empty() {
        println!("{}\n", recipe.description);
    }
    println!("Ingredients:");
    for ingredient in &recipe.ingredients {
        println!(
            "  - {} {}{}",
            ingredient.name, ingredient.amount, ingredient.unit
        );
    }
    println!("\nSteps:");
    for (index, step) in recipe.steps.iter().enumerate() {
        println!("  {}. {}", index + 1, step.description);
    }
    println!("\nVideo: {}", recipe.videourl);
}
