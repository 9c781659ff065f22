// ABOUTME: Store contract tests shared by the SQLite and in-memory backends
// ABOUTME: Name lookup, autocomplete, conditional delete, recipe writes and file persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::str::FromStr;

use common::{all_backends, init_test_logging, new_recipe};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use uuid::Uuid;
use yorist::{
    database_plugins::factory,
    models::{IngredientPatch, NewIngredient, RecipeIngredientRef},
};

#[tokio::test]
async fn test_find_by_name_is_exact_after_normalisation() {
    for db in all_backends().await {
        db.create_ingredient(&NewIngredient::new("Soy Sauce", "ml"))
            .await
            .unwrap();
        db.create_ingredient(&NewIngredient::new("Soy", "g"))
            .await
            .unwrap();

        let found = db.find_ingredients_by_name("  soy sauce ").await.unwrap();
        assert_eq!(found.len(), 1, "{}", db.backend_name());
        assert_eq!(found[0].name, "Soy Sauce");
        assert!(db.find_ingredients_by_name("sauce").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_search_is_substring_and_limited() {
    for db in all_backends().await {
        for name in ["고추", "고추장", "고춧가루", "풋고추", "마늘"] {
            db.create_ingredient(&NewIngredient::new(name, "g"))
                .await
                .unwrap();
        }

        let hits = db.search_ingredients("고추", 10).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 3, "{}: {names:?}", db.backend_name());
        assert!(names.contains(&"풋고추"));
        assert!(!names.contains(&"고춧가루"));

        assert_eq!(db.search_ingredients("고", 2).await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_list_orders_by_name_and_filters_favorites() {
    for db in all_backends().await {
        for name in ["파", "가지", "나물"] {
            db.create_ingredient(&NewIngredient::new(name, "개"))
                .await
                .unwrap();
        }
        let eggplant = db.find_ingredients_by_name("가지").await.unwrap().remove(0);
        db.update_ingredient(
            eggplant.id,
            &IngredientPatch {
                is_favorite: Some(true),
                ..IngredientPatch::default()
            },
        )
        .await
        .unwrap();

        let names: Vec<String> = db
            .list_ingredients(false)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["가지", "나물", "파"], "{}", db.backend_name());

        let favorites = db.list_ingredients(true).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, eggplant.id);
    }
}

#[tokio::test]
async fn test_update_missing_ingredient_returns_none() {
    for db in all_backends().await {
        let patch = IngredientPatch {
            unit: Some("g".to_owned()),
            ..IngredientPatch::default()
        };
        assert!(db
            .update_ingredient(Uuid::new_v4(), &patch)
            .await
            .unwrap()
            .is_none());
    }
}

#[tokio::test]
async fn test_conditional_delete_checks_every_recipe() {
    for db in all_backends().await {
        let onion = db
            .create_ingredient(&NewIngredient::new("양파", "개"))
            .await
            .unwrap();
        let carrot = db
            .create_ingredient(&NewIngredient::new("당근", "개"))
            .await
            .unwrap();
        db.create_recipe(&new_recipe("볶음밥", &[&carrot])).await.unwrap();
        let curry = db
            .create_recipe(&new_recipe("카레", &[&carrot, &onion]))
            .await
            .unwrap();

        assert!(!db.delete_ingredient_if_unreferenced(onion.id).await.unwrap());

        let only_carrot: Vec<RecipeIngredientRef> = curry
            .ingredients
            .iter()
            .filter(|line| line.ingredient_id == carrot.id)
            .cloned()
            .collect();
        assert!(db.set_recipe_ingredients(curry.id, &only_carrot).await.unwrap());

        assert!(db.delete_ingredient_if_unreferenced(onion.id).await.unwrap());
        assert!(!db.delete_ingredient_if_unreferenced(onion.id).await.unwrap());
        assert!(!db.delete_ingredient_if_unreferenced(carrot.id).await.unwrap());
        assert_eq!(
            db.recipes_referencing_ingredient(carrot.id).await.unwrap().len(),
            2
        );
    }
}

#[tokio::test]
async fn test_recipe_writes_on_missing_recipe() {
    for db in all_backends().await {
        let id = Uuid::new_v4();
        assert!(!db.set_recipe_ingredients(id, &[]).await.unwrap());
        assert!(db.set_recipe_favorite(id, true).await.unwrap().is_none());
        assert!(db
            .update_recipe(id, &new_recipe("없음", &[]))
            .await
            .unwrap()
            .is_none());
        assert!(!db.delete_recipe(id).await.unwrap());
    }
}

#[tokio::test]
async fn test_recipe_round_trip_keeps_lines_and_steps() {
    for db in all_backends().await {
        let tofu = db
            .create_ingredient(&NewIngredient::new("두부", "모").with_shop_url("https://shop.example/tofu"))
            .await
            .unwrap();
        let mut recipe = new_recipe("두부부침", &[&tofu]);
        recipe.steps[0].is_important = true;
        recipe.video_url = Some("https://youtu.be/dQw4w9WgXcQ".to_owned());

        let created = db.create_recipe(&recipe).await.unwrap();
        let stored = db.get_recipe(created.id).await.unwrap().unwrap();

        assert_eq!(stored.title, "두부부침");
        assert_eq!(stored.ingredients, recipe.ingredients);
        assert_eq!(stored.steps, recipe.steps);
        assert_eq!(stored.video_url, recipe.video_url);
        assert_eq!(
            db.search_recipes("부침").await.unwrap().first().map(|r| r.id),
            Some(created.id)
        );
    }
}

#[tokio::test]
async fn test_title_search_folds_non_ascii_case() {
    for db in all_backends().await {
        let eclair = db.create_recipe(&new_recipe("ÉCLAIR au café", &[])).await.unwrap();
        db.create_recipe(&new_recipe("Crème brûlée", &[])).await.unwrap();

        let hits = db.search_recipes("éclair").await.unwrap();
        assert_eq!(hits.len(), 1, "{}", db.backend_name());
        assert_eq!(hits[0].id, eclair.id);
        assert_eq!(db.search_recipes("CRÈME").await.unwrap().len(), 1);

        let renamed = db
            .update_recipe(eclair.id, &new_recipe("Éclair Pâtissier", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            db.search_recipes("PÂTISSIER").await.unwrap().first().map(|r| r.id),
            Some(renamed.id)
        );
        assert!(db.search_recipes("café").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_sqlite_backfills_title_keys_for_older_files() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    let url = format!("sqlite:{}", path.display());

    {
        let options = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        sqlx::query(
            r"
            CREATE TABLE recipes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                ingredients TEXT NOT NULL DEFAULT '[]',
                steps TEXT NOT NULL DEFAULT '[]',
                video_url TEXT,
                thumbnail_url TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO recipes (id, title, created_at, updated_at) VALUES ($1, 'ÉCLAIR', $2, $2)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind("2025-01-01T00:00:00.000000Z")
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    let db = factory::connect(&url).await.unwrap();
    let hits = db.search_recipes("éclair").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "ÉCLAIR");
}

#[tokio::test]
async fn test_sqlite_file_survives_reopen() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("data/yorist.db").display());

    let id = {
        let db = factory::connect(&url).await.unwrap();
        db.create_ingredient(&NewIngredient::new("들기름", "큰술"))
            .await
            .unwrap()
            .id
    };

    let reopened = factory::connect(&url).await.unwrap();
    let record = reopened.get_ingredient(id).await.unwrap().unwrap();
    assert_eq!(record.name, "들기름");
}

#[tokio::test]
async fn test_unsupported_database_url_is_rejected() {
    assert!(factory::connect("postgres://localhost/yorist").await.is_err());
}
