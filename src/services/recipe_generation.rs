// ABOUTME: Generates a recipe draft from a video link via transcript extraction and an LLM
// ABOUTME: Builds the prompt, calls the provider once, strips code fences and validates the JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Recipe generation
//!
//! One request, no retries: validate the link, fetch the transcript, ask the
//! model for a recipe and parse what comes back. Each failure is reported
//! with its own error code:
//!
//! | Failure | Code |
//! |---|---|
//! | empty or unrecognised link | `MissingRequiredField` / `InvalidInput` |
//! | no LLM key configured | `ConfigMissing` |
//! | no transcript | `TranscriptUnavailable` |
//! | upstream non-success | `ExternalServiceError` |
//! | reply is not JSON | `ParseFailure` (raw text in `details.raw`) |
//! | reply lacks title, ingredients or steps | `MissingRequiredField` (raw text in `details.raw`) |

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::constants::{env_config, generation};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::external::{require_video_id, TranscriptSource};
use crate::llm::prompts::{build_recipe_prompt, get_recipe_system_prompt};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::{IngredientLine, RecipeDraft, RecipeStep};

static OPENING_FENCE: OnceLock<Option<Regex>> = OnceLock::new();

fn opening_fence() -> Option<&'static Regex> {
    OPENING_FENCE
        .get_or_init(|| Regex::new(r"(?i)^```(?:json)?").ok())
        .as_ref()
}

/// Remove a surrounding ```` ``` ```` or ```` ```json ```` fence
///
/// Text without an opening fence is only trimmed.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }
    let without_open = opening_fence()
        .and_then(|re| re.find(text))
        .map_or_else(|| text.trim_start_matches('`'), |m| &text[m.end()..]);
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Amount as the model wrote it; numbers are kept in their JSON spelling
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawIngredient {
    name: String,
    #[serde(default)]
    amount: Option<RawAmount>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default, alias = "shopUrl")]
    shop_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStep {
    Text(String),
    Object { description: String },
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    title: String,
    #[serde(default)]
    description: Option<String>,
    ingredients: Vec<RawIngredient>,
    steps: Vec<RawStep>,
    #[serde(default)]
    videourl: Option<String>,
    #[serde(default, rename = "videoUrl")]
    video_url_camel: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

impl RawRecipe {
    /// First non-blank link among the spellings models use
    fn take_video_link(&mut self) -> Option<String> {
        [
            self.videourl.take(),
            self.video_url_camel.take(),
            self.video_url.take(),
        ]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
    }
}

/// Ingredient line produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIngredient {
    /// Ingredient name
    pub name: String,
    /// Amount as text
    pub amount: String,
    /// Unit, possibly empty
    pub unit: String,
    /// Purchase link
    pub shop_url: Option<String>,
}

/// Recipe produced by the model, ready to be reviewed and saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Ingredient lines
    pub ingredients: Vec<GeneratedIngredient>,
    /// Steps; `isImportant` is always false at generation time
    pub steps: Vec<RecipeStep>,
    /// Source video
    pub videourl: String,
}

impl From<GeneratedRecipe> for RecipeDraft {
    fn from(recipe: GeneratedRecipe) -> Self {
        Self {
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(|ingredient| IngredientLine {
                    ingredient_id: None,
                    name: ingredient.name,
                    amount: ingredient.amount,
                    unit: ingredient.unit,
                    shop_url: ingredient.shop_url,
                })
                .collect(),
            steps: recipe.steps,
            video_url: Some(recipe.videourl).filter(|url| !url.is_empty()),
            is_favorite: false,
        }
    }
}

fn missing(field: &str, raw: &str) -> AppError {
    AppError::missing_field(field).with_details(json!({ "raw": raw }))
}

/// Parse the model's reply into a recipe
///
/// `fallback_video_url` fills `videourl` when the reply has none.
///
/// # Errors
///
/// - `ParseFailure` when the text is not JSON
/// - `MissingRequiredField` when `title`, `ingredients` or `steps` is absent
///   or has the wrong shape
/// - `InvalidFormat` when the JSON is not an object or a line is malformed
///
/// Every error carries the stripped text in `details.raw`.
pub fn parse_generated_recipe(text: &str, fallback_video_url: &str) -> AppResult<GeneratedRecipe> {
    let raw = strip_code_fences(text);

    let value: Value = serde_json::from_str(raw).map_err(|e| {
        AppError::parse_failure(format!("Generated text is not valid JSON: {e}"), raw)
    })?;

    let Some(object) = value.as_object() else {
        return Err(
            AppError::new(ErrorCode::InvalidFormat, "Generated JSON is not an object")
                .with_details(json!({ "raw": raw })),
        );
    };
    if !object
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|title| !title.trim().is_empty())
    {
        return Err(missing("title", raw));
    }
    for field in ["ingredients", "steps"] {
        if !object.get(field).is_some_and(Value::is_array) {
            return Err(missing(field, raw));
        }
    }

    let mut parsed: RawRecipe = serde_json::from_value(value).map_err(|e| {
        AppError::new(
            ErrorCode::InvalidFormat,
            format!("Generated recipe has an unexpected shape: {e}"),
        )
        .with_details(json!({ "raw": raw }))
    })?;
    let videourl = parsed
        .take_video_link()
        .unwrap_or_else(|| fallback_video_url.to_owned());

    Ok(GeneratedRecipe {
        title: parsed.title.trim().to_owned(),
        description: parsed.description.unwrap_or_default(),
        ingredients: parsed
            .ingredients
            .into_iter()
            .map(|ingredient| GeneratedIngredient {
                name: ingredient.name.trim().to_owned(),
                amount: ingredient
                    .amount
                    .map(RawAmount::into_string)
                    .unwrap_or_default(),
                unit: ingredient.unit.unwrap_or_default(),
                shop_url: ingredient.shop_url.filter(|url| !url.trim().is_empty()),
            })
            .collect(),
        steps: parsed
            .steps
            .into_iter()
            .map(|step| match step {
                RawStep::Text(description) | RawStep::Object { description } => {
                    RecipeStep::new(description)
                }
            })
            .collect(),
        videourl,
    })
}

/// Transcript-to-recipe pipeline
#[derive(Clone)]
pub struct RecipeGenerator {
    transcripts: Arc<dyn TranscriptSource>,
    llm: Option<Arc<dyn LlmProvider>>,
}

impl RecipeGenerator {
    /// Create a generator; without an LLM every request fails with `ConfigMissing`
    #[must_use]
    pub fn new(transcripts: Arc<dyn TranscriptSource>, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { transcripts, llm }
    }

    /// Whether an LLM provider is configured
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Transcript source used by this generator
    #[must_use]
    pub fn transcripts(&self) -> &Arc<dyn TranscriptSource> {
        &self.transcripts
    }

    /// Generate a recipe from a video link
    ///
    /// # Errors
    ///
    /// See the module table; the provider is called at most once.
    #[instrument(skip(self))]
    pub async fn generate(&self, video_url: &str) -> AppResult<GeneratedRecipe> {
        let video_url = video_url.trim();
        require_video_id(video_url)?;

        let llm = self.llm.as_ref().ok_or_else(|| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!(
                    "Recipe generation is disabled; set {}",
                    env_config::OPENAI_API_KEY
                ),
            )
        })?;

        let transcript = self.transcripts.fetch_transcript(video_url).await?;
        info!(
            source = self.transcripts.name(),
            chars = transcript.chars().count(),
            "Fetched transcript"
        );

        let request = ChatRequest::new(vec![
            ChatMessage::system(get_recipe_system_prompt()),
            ChatMessage::user(build_recipe_prompt(&transcript, video_url)),
        ])
        .with_temperature(generation::TEMPERATURE)
        .with_max_tokens(generation::MAX_TOKENS);

        let response = llm.complete(&request).await?;
        if response.finish_reason.as_deref() == Some("length") {
            warn!("Generation hit the token limit; reply may be truncated");
        }

        let recipe = parse_generated_recipe(&response.content, video_url)?;
        info!(
            title = %recipe.title,
            ingredients = recipe.ingredients.len(),
            steps = recipe.steps.len(),
            "Generated recipe"
        );
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"title":"김치찌개","description":"얼큰한 찌개","ingredients":[{"name":"김치","amount":"1/4","unit":"포기"}],"steps":[{"description":"김치를 볶는다","isImportant":true}],"videourl":"https://youtu.be/abc12345678"}"#;

    #[test]
    fn test_fenced_and_bare_replies_parse_identically() {
        let fenced = format!("```json\n{BODY}\n```");
        let bare = parse_generated_recipe(BODY, "").unwrap();
        assert_eq!(parse_generated_recipe(&fenced, "").unwrap(), bare);
        assert_eq!(
            parse_generated_recipe(&format!("```\n{BODY}\n```"), "").unwrap(),
            bare
        );
        assert_eq!(
            parse_generated_recipe(&format!("```JSON{BODY}```"), "").unwrap(),
            bare
        );
    }

    #[test]
    fn test_steps_are_never_important() {
        let recipe = parse_generated_recipe(BODY, "").unwrap();
        assert!(recipe.steps.iter().all(|step| !step.is_important));
    }

    #[test]
    fn test_missing_steps_is_reported() {
        let err = parse_generated_recipe(r#"{"title":"x","ingredients":[]}"#, "").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert!(err.message.contains("steps"));
        assert_eq!(err.details["raw"], r#"{"title":"x","ingredients":[]}"#);
    }

    #[test]
    fn test_not_json_keeps_raw_text() {
        let err = parse_generated_recipe("```json\nSorry, I can't\n```", "").unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseFailure);
        assert_eq!(err.details["raw"], "Sorry, I can't");
    }

    #[test]
    fn test_lenient_field_shapes() {
        let text = r#"{"title":"t","ingredients":[{"name":"달걀","amount":2,"shopUrl":"https://shop.example/egg"}],"steps":["깨서 푼다"]}"#;
        let recipe = parse_generated_recipe(text, "https://youtu.be/abc12345678").unwrap();
        assert_eq!(recipe.ingredients[0].amount, "2");
        assert_eq!(
            recipe.ingredients[0].shop_url.as_deref(),
            Some("https://shop.example/egg")
        );
        assert_eq!(recipe.steps[0].description, "깨서 푼다");
        assert_eq!(recipe.videourl, "https://youtu.be/abc12345678");
    }

    #[test]
    fn test_video_link_takes_first_non_blank_spelling() {
        let text = r#"{"title":"t","ingredients":[],"steps":[],"videourl":" ","videoUrl":"https://youtu.be/camelCase01","video_url":"https://youtu.be/snake_case1"}"#;
        let recipe = parse_generated_recipe(text, "fallback").unwrap();
        assert_eq!(recipe.videourl, "https://youtu.be/camelCase01");

        let text = r#"{"title":"t","ingredients":[],"steps":[],"video_url":""}"#;
        assert_eq!(parse_generated_recipe(text, "fallback").unwrap().videourl, "fallback");
    }

    #[test]
    fn test_strip_code_fences_passthrough() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
    }
}
