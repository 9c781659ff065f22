// ABOUTME: Prompts for recipe generation loaded at compile time
// ABOUTME: Fixed system instruction plus the transcript-to-recipe user prompt template
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # Recipe Prompts
//!
//! The user prompt lives in a markdown file for easy maintenance and is
//! filled in with the video link and transcript at request time.

/// System instruction sent with every generation request
pub const RECIPE_SYSTEM_PROMPT: &str = "너는 요리 레시피 json을 생성하는 전문가야.";

/// User prompt template with `{video_url}` and `{transcript}` placeholders
pub const RECIPE_PROMPT_TEMPLATE: &str = include_str!("recipe_generation.md");

/// Get the system instruction for recipe generation
#[must_use]
pub const fn get_recipe_system_prompt() -> &'static str {
    RECIPE_SYSTEM_PROMPT
}

/// Build the user prompt for one video
///
/// The transcript is substituted last so placeholder-like text inside it is
/// left untouched.
#[must_use]
pub fn build_recipe_prompt(transcript: &str, video_url: &str) -> String {
    RECIPE_PROMPT_TEMPLATE
        .trim_end()
        .replace("{video_url}", video_url)
        .replace("{transcript}", transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_link_and_transcript() {
        let prompt = build_recipe_prompt("양파를 썬다", "https://youtu.be/abc12345678");
        assert!(prompt.contains("유튜브 링크: https://youtu.be/abc12345678"));
        assert!(prompt.ends_with("자막:\n양파를 썬다"));
        assert!(!prompt.contains("{video_url}"));
    }

    #[test]
    fn test_system_prompt_is_fixed() {
        assert_eq!(get_recipe_system_prompt(), RECIPE_SYSTEM_PROMPT);
    }
}
