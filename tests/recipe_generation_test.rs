// ABOUTME: Integration tests for the video-to-recipe pipeline with stub transcript and LLM
// ABOUTME: Covers fenced replies, malformed replies, disabled generation and saving the result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{create_memory_database, create_test_resources, StubLlm, StubTranscripts};
use yorist::{errors::ErrorCode, llm::LlmProvider, services::recipe_generation::RecipeGenerator};

const VIDEO: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
const TRANSCRIPT: &str = "오늘은 김치찌개를 만들어 볼게요. 김치 한 컵을 볶다가 물을 붓습니다.";
const REPLY: &str = r#"```json
{
  "title": "김치찌개",
  "description": "묵은지로 끓이는 찌개",
  "ingredients": [
    {"name": "김치", "amount": 1, "unit": "컵"},
    {"name": "돼지고기", "amount": "200", "unit": "g"}
  ],
  "steps": ["김치를 볶는다", {"description": "물을 붓고 끓인다", "isImportant": true}]
}
```"#;

fn generator(transcripts: Arc<StubTranscripts>, llm: Option<Arc<StubLlm>>) -> RecipeGenerator {
    RecipeGenerator::new(transcripts, llm.map(|llm| llm as Arc<dyn LlmProvider>))
}

#[tokio::test]
async fn test_generate_parses_fenced_reply() {
    let transcripts = Arc::new(StubTranscripts::with_text(TRANSCRIPT));
    let llm = Arc::new(StubLlm::replying(REPLY));
    let generator = generator(transcripts.clone(), Some(llm.clone()));

    let recipe = generator.generate(VIDEO).await.unwrap();

    assert_eq!(recipe.title, "김치찌개");
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[0].amount, "1");
    assert_eq!(recipe.ingredients[1].unit, "g");
    assert_eq!(recipe.steps.len(), 2);
    assert!(recipe.steps.iter().all(|step| !step.is_important));
    assert_eq!(recipe.videourl, VIDEO);

    assert_eq!(transcripts.calls(), 1);
    assert_eq!(llm.calls(), 1);
    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains(TRANSCRIPT));
    assert!(prompt.contains(VIDEO));
}

#[tokio::test]
async fn test_generate_accepts_truncated_reply_that_still_parses() {
    let reply = r#"{"title":"계란말이","ingredients":[{"name":"달걀","amount":"3","unit":"개"}],"steps":["말아서 익힌다"]}"#;
    let generator = generator(
        Arc::new(StubTranscripts::with_text(TRANSCRIPT)),
        Some(Arc::new(StubLlm::truncated(reply))),
    );

    let recipe = generator.generate(VIDEO).await.unwrap();
    assert_eq!(recipe.title, "계란말이");
    assert_eq!(recipe.description, "");
}

#[tokio::test]
async fn test_generate_reports_missing_steps_with_raw_text() {
    let reply = r#"{"title":"라면","ingredients":[]}"#;
    let generator = generator(
        Arc::new(StubTranscripts::with_text(TRANSCRIPT)),
        Some(Arc::new(StubLlm::replying(reply))),
    );

    let err = generator.generate(VIDEO).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
    assert_eq!(err.details["raw"], reply);
}

#[tokio::test]
async fn test_generate_reports_prose_reply_as_parse_failure() {
    let generator = generator(
        Arc::new(StubTranscripts::with_text(TRANSCRIPT)),
        Some(Arc::new(StubLlm::replying("죄송하지만 레시피를 찾을 수 없어요."))),
    );

    let err = generator.generate(VIDEO).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ParseFailure);
    assert_eq!(err.details["raw"], "죄송하지만 레시피를 찾을 수 없어요.");
}

#[tokio::test]
async fn test_generate_without_llm_fails_before_fetching_transcript() {
    let transcripts = Arc::new(StubTranscripts::with_text(TRANSCRIPT));
    let generator = generator(transcripts.clone(), None);

    assert!(!generator.is_enabled());
    let err = generator.generate(VIDEO).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert_eq!(transcripts.calls(), 0);
}

#[tokio::test]
async fn test_generate_validates_link_before_any_call() {
    let transcripts = Arc::new(StubTranscripts::with_text(TRANSCRIPT));
    let llm = Arc::new(StubLlm::replying(REPLY));
    let generator = generator(transcripts.clone(), Some(llm.clone()));

    let empty = generator.generate("  ").await.unwrap_err();
    assert_eq!(empty.code, ErrorCode::MissingRequiredField);
    let not_youtube = generator.generate("https://example.com/video").await.unwrap_err();
    assert_eq!(not_youtube.code, ErrorCode::InvalidInput);

    assert_eq!(transcripts.calls(), 0);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_generate_surfaces_missing_transcript() {
    let llm = Arc::new(StubLlm::replying(REPLY));
    let generator = generator(Arc::new(StubTranscripts::unavailable()), Some(llm.clone()));

    let err = generator.generate(VIDEO).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TranscriptUnavailable);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_generated_recipe_saves_with_shared_ingredients() {
    let database = create_memory_database().await;
    let resources = create_test_resources(
        database.clone(),
        Arc::new(StubTranscripts::with_text(TRANSCRIPT)),
        Some(Arc::new(StubLlm::replying(REPLY))),
    );
    resources
        .ingredients
        .resolve_or_create("김치", "포기", None)
        .await
        .unwrap();

    let generated = resources.generator.generate(VIDEO).await.unwrap();
    let saved = resources.recipes.save_recipe(generated.into()).await.unwrap();

    assert_eq!(saved.video_url.as_deref(), Some(VIDEO));
    assert!(saved.thumbnail_url.is_some());
    assert_eq!(saved.ingredients.len(), 2);
    assert_eq!(database.list_ingredients(false).await.unwrap().len(), 2);
    let kimchi = database.find_ingredients_by_name("김치").await.unwrap();
    assert_eq!(kimchi.len(), 1);
    assert_eq!(kimchi[0].unit, "포기");
}
