// ABOUTME: Yorist CLI - maintenance tool for the recipe store
// ABOUTME: Parses video links, merges, renames and cleans up ingredients, and generates recipes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist
//!
//! Usage:
//! ```bash
//! # Show the video id, embed URL and thumbnails of a link
//! yorist-cli video-id "https://youtu.be/abc12345678?si=xyz"
//!
//! # Merge one ingredient record into another
//! yorist-cli ingredient merge <old-id> <new-id>
//!
//! # Rename an ingredient, merging on name collision
//! yorist-cli ingredient rename <id> 대파 --unit 대 --shop-url https://shop.example/leek
//!
//! # Delete every ingredient record no recipe uses
//! yorist-cli ingredient cleanup
//!
//! # Generate a recipe from a video and store it
//! yorist-cli generate "https://www.youtube.com/watch?v=abc12345678" --save
//! ```

mod commands;
mod helpers;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use yorist::{
    config::environment::ServerConfig,
    database_plugins::factory,
    errors::{AppError, AppResult},
    resources::ServerResourcesBuilder,
};

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "yorist-cli",
    about = "Yorist maintenance CLI",
    long_about = "Command-line tool for inspecting video links, reconciling ingredient records and generating recipes."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Parse a video link without touching the store
    VideoId {
        /// Video link
        url: String,
    },

    /// Ingredient record maintenance
    Ingredient {
        #[command(subcommand)]
        action: IngredientCommand,
    },

    /// Generate a recipe from a video link
    Generate {
        /// Video link
        url: String,

        /// Store the generated recipe
        #[arg(long)]
        save: bool,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum IngredientCommand {
    /// Repoint every recipe from one record to another and delete the old one
    Merge {
        /// Record to merge away
        old_id: String,

        /// Record that survives
        new_id: String,
    },

    /// Rename a record, merging into an existing record with the same name
    Rename {
        /// Record to rename
        id: String,

        /// New name
        name: String,

        /// New unit
        #[arg(long, default_value = "")]
        unit: String,

        /// New purchase link
        #[arg(long)]
        shop_url: Option<String>,
    },

    /// Delete every record no recipe references
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    if let Command::VideoId { url } = &cli.command {
        return commands::video::show_video_id(url);
    }

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = yorist::config::DatabaseUrl::parse_url(&database_url)?;
    }

    info!("Connecting to database: {}", config.database_url);
    let database = factory::connect(&config.database_url.to_string()).await?;
    let resources = ServerResourcesBuilder::new()
        .with_config(Arc::new(config))
        .with_database(database)
        .build()
        .map_err(AppError::internal)?;

    match cli.command {
        Command::VideoId { .. } => Ok(()),
        Command::Ingredient { action } => match action {
            IngredientCommand::Merge { old_id, new_id } => {
                commands::ingredient::merge(&resources, &old_id, &new_id).await
            }
            IngredientCommand::Rename {
                id,
                name,
                unit,
                shop_url,
            } => {
                commands::ingredient::rename(&resources, &id, &name, &unit, shop_url.as_deref())
                    .await
            }
            IngredientCommand::Cleanup => commands::ingredient::cleanup(&resources).await,
        },
        Command::Generate { url, save } => commands::video::generate(&resources, &url, save).await,
    }
}
