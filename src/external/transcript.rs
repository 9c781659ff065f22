// ABOUTME: Transcript extraction clients for video links
// ABOUTME: TranscriptSource trait with a transcript-service client and a timedtext caption client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! Transcript extraction
//!
//! Two interchangeable backends implement [`TranscriptSource`]:
//!
//! - [`TranscriptServiceClient`] calls a dedicated HTTP service with
//!   `GET <endpoint>?url=<encoded link>` and expects `{"transcript": "..."}` or
//!   `{"error": "..."}`.
//! - [`TimedTextClient`] lists the caption tracks of the video, picks one by
//!   language preference and flattens the caption XML into plain text.
//!
//! Neither client retries. A video without usable captions is reported as
//! [`ErrorCode::TranscriptUnavailable`](crate::errors::ErrorCode::TranscriptUnavailable).

use crate::constants::{limits, service_names};
use crate::errors::{AppError, AppResult};
use crate::youtube;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request timeout for transcript backends
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Source of plain-text transcripts for a video link
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Backend label for logs
    fn name(&self) -> &'static str;

    /// Fetch the transcript of the video behind `video_url`
    async fn fetch_transcript(&self, video_url: &str) -> AppResult<String>;
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Validate a link before any request is made
///
/// # Errors
///
/// Returns `MissingRequiredField` for an empty link and `InvalidInput` when no
/// video id can be extracted
pub fn require_video_id(video_url: &str) -> AppResult<String> {
    if video_url.trim().is_empty() {
        return Err(AppError::missing_field("youtubeUrl"));
    }
    youtube::video_id(video_url).ok_or_else(|| {
        AppError::invalid_input(format!("Could not extract a video id from '{video_url}'"))
    })
}

fn preview(body: &str) -> String {
    body.chars().take(limits::ERROR_BODY_PREVIEW_CHARS).collect()
}

// ============================================================================
// Transcript service
// ============================================================================

#[derive(Debug, Deserialize)]
struct TranscriptServiceResponse {
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the dedicated transcript HTTP service
pub struct TranscriptServiceClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl TranscriptServiceClient {
    /// Create a client for the service at `endpoint`
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client: http_client(),
        }
    }
}

#[async_trait]
impl TranscriptSource for TranscriptServiceClient {
    fn name(&self) -> &'static str {
        service_names::TRANSCRIPT_SERVICE
    }

    #[instrument(skip(self), fields(backend = "service"))]
    async fn fetch_transcript(&self, video_url: &str) -> AppResult<String> {
        require_video_id(video_url)?;
        let url = format!(
            "{}?url={}",
            self.endpoint,
            urlencoding::encode(video_url.trim())
        );
        debug!(%url, "requesting transcript");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(error = %e, "transcript service unreachable");
            AppError::external_service(service_names::TRANSCRIPT_SERVICE, e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service(service_names::TRANSCRIPT_SERVICE, e.to_string())
        })?;

        let parsed: TranscriptServiceResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(
                service_names::TRANSCRIPT_SERVICE,
                format!("HTTP {status}, unreadable body ({e}): {}", preview(&body)),
            )
        })?;

        match parsed.transcript.filter(|t| !t.trim().is_empty()) {
            Some(transcript) if status.is_success() => Ok(transcript),
            _ => {
                let message = parsed
                    .error
                    .unwrap_or_else(|| "Transcript extraction failed".to_owned());
                warn!(%status, %message, "transcript service reported failure");
                Err(AppError::transcript_unavailable(message))
            }
        }
    }
}

// ============================================================================
// Timedtext captions
// ============================================================================

/// One caption track advertised for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Language code such as `ko` or `en`
    pub lang_code: String,
    /// Auto-generated (speech recognition) track
    pub is_generated: bool,
}

static TRACK_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static ATTRIBUTE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static TEXT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn cached_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> AppResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .ok_or_else(|| AppError::internal(format!("Invalid built-in pattern: {pattern}")))
}

/// Parse the track listing XML into caption tracks, in listed order
///
/// # Errors
///
/// Returns an error only if the built-in patterns fail to compile
pub fn parse_track_list(xml: &str) -> AppResult<Vec<CaptionTrack>> {
    let track_re = cached_regex(&TRACK_PATTERN, r"<track\b([^>]*)>")?;
    let attr_re = cached_regex(&ATTRIBUTE_PATTERN, r#"(\w+)="([^"]*)""#)?;

    Ok(track_re
        .captures_iter(xml)
        .filter_map(|caps| {
            let attributes = caps.get(1)?.as_str();
            let mut lang_code = None;
            let mut is_generated = false;
            for attr in attr_re.captures_iter(attributes) {
                match (attr.get(1)?.as_str(), attr.get(2)?.as_str()) {
                    ("lang_code", value) => lang_code = Some(value.to_owned()),
                    ("kind", "asr") => is_generated = true,
                    _ => {}
                }
            }
            Some(CaptionTrack {
                lang_code: lang_code?,
                is_generated,
            })
        })
        .collect())
}

/// Pick a track: Korean manual, Korean generated, English manual, English
/// generated, then whatever is listed first
#[must_use]
pub fn select_caption_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    const PREFERENCE: [(&str, bool); 4] = [("ko", false), ("ko", true), ("en", false), ("en", true)];

    PREFERENCE
        .iter()
        .find_map(|&(lang, generated)| {
            tracks
                .iter()
                .find(|t| t.lang_code == lang && t.is_generated == generated)
        })
        .or_else(|| tracks.first())
}

/// Decode the handful of entities the caption XML uses
#[must_use]
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Join every `<text>` node of a caption document with single spaces
///
/// # Errors
///
/// Returns an error only if the built-in pattern fails to compile
pub fn parse_caption_xml(xml: &str) -> AppResult<String> {
    let text_re = cached_regex(&TEXT_PATTERN, r"(?s)<text[^>]*>(.*?)</text>")?;
    Ok(text_re
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()).trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Client that downloads captions straight from the timedtext endpoint
pub struct TimedTextClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl TimedTextClient {
    /// Create a client for the endpoint at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: http_client(),
        }
    }

    async fn get_text(&self, query: &[(&str, &str)]) -> AppResult<String> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::external_service(service_names::TIMEDTEXT, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::external_service(service_names::TIMEDTEXT, e.to_string()))?;

        if !status.is_success() {
            return Err(AppError::external_service(
                service_names::TIMEDTEXT,
                format!("HTTP {status}: {}", preview(&body)),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl TranscriptSource for TimedTextClient {
    fn name(&self) -> &'static str {
        service_names::TIMEDTEXT
    }

    #[instrument(skip(self), fields(backend = "timedtext"))]
    async fn fetch_transcript(&self, video_url: &str) -> AppResult<String> {
        let video_id = require_video_id(video_url)?;

        let listing = self
            .get_text(&[("type", "list"), ("v", video_id.as_str())])
            .await?;
        let tracks = parse_track_list(&listing)?;
        let track = select_caption_track(&tracks).ok_or_else(|| {
            AppError::transcript_unavailable(format!("No caption tracks for video {video_id}"))
        })?;
        debug!(lang = %track.lang_code, generated = track.is_generated, "selected caption track");

        let mut query = vec![("lang", track.lang_code.as_str()), ("v", video_id.as_str())];
        if track.is_generated {
            query.push(("kind", "asr"));
        }
        let caption_xml = self.get_text(&query).await?;

        let transcript = parse_caption_xml(&caption_xml)?;
        if transcript.is_empty() {
            return Err(AppError::transcript_unavailable(format!(
                "Caption track '{}' of video {video_id} has no text",
                track.lang_code
            )));
        }
        Ok(transcript)
    }
}
