// ABOUTME: YouTube link parsing: video id extraction, embed and thumbnail URL derivation
// ABOUTME: Pure functions, no I/O; unrecognised input yields None rather than an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Yorist

//! # YouTube references
//!
//! Recognised shapes:
//!
//! - `https://www.youtube.com/watch?v=<id>` (any extra query parameters)
//! - `https://m.youtube.com/watch?feature=share&v=<id>`
//! - `https://youtu.be/<id>?si=...`
//! - `https://www.youtube.com/embed/<id>`
//! - `https://youtube.com/shorts/<id>`
//! - `https://www.youtube.com/live/<id>`
//!
//! Input that does not parse as a URL falls back to a pattern scan, so a
//! scheme-less `youtu.be/<id>` still resolves.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Length of every YouTube video id
pub const VIDEO_ID_LEN: usize = 11;

const EMBED_BASE: &str = "https://www.youtube.com/embed";
const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

static VIDEO_ID_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn video_id_pattern() -> Option<&'static Regex> {
    VIDEO_ID_PATTERN
        .get_or_init(|| Regex::new(r"(?:v=|youtu\.be/|embed/|shorts/|live/)([\w-]{11})").ok())
        .as_ref()
}

/// Thumbnail sizes served by `img.youtube.com`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    /// 120x90
    Default,
    /// 480x360
    #[default]
    Hq,
    /// 320x180
    Mq,
    /// 640x480
    Sd,
    /// Full resolution, not available for every video
    Maxres,
}

impl ThumbnailQuality {
    /// Every quality, smallest first
    pub const ALL: [Self; 5] = [Self::Default, Self::Mq, Self::Hq, Self::Sd, Self::Maxres];

    /// File name of the thumbnail image
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Default => "default.jpg",
            Self::Hq => "hqdefault.jpg",
            Self::Mq => "mqdefault.jpg",
            Self::Sd => "sddefault.jpg",
            Self::Maxres => "maxresdefault.jpg",
        }
    }
}

impl fmt::Display for ThumbnailQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Default => "default",
            Self::Hq => "hq",
            Self::Mq => "mq",
            Self::Sd => "sd",
            Self::Maxres => "maxres",
        };
        f.write_str(label)
    }
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtube.com" || host.ends_with(".youtube.com") || host == "youtube-nocookie.com"
}

fn video_id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let candidate = if host == "youtu.be" {
        segments.next().map(str::to_owned)
    } else if is_youtube_host(&host) {
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed" | "shorts" | "live" | "v") => segments.next().map(str::to_owned),
            _ => None,
        }
    } else {
        None
    }?;

    is_video_id(&candidate).then_some(candidate)
}

/// Extract the 11-character video id from a loosely formatted link
///
/// Returns `None` for anything that is not a recognisable YouTube link.
#[must_use]
pub fn video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input) {
        if let Some(id) = video_id_from_url(&url) {
            return Some(id);
        }
        // Parsed but not one of the known hosts or paths
        if url.host_str().is_some() {
            return None;
        }
    }

    video_id_pattern()?
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Whether the input is a link a video id can be extracted from
#[must_use]
pub fn is_valid_url(input: &str) -> bool {
    video_id(input).is_some()
}

/// Player URL for embedding
#[must_use]
pub fn embed_url(video_id: &str) -> String {
    format!("{EMBED_BASE}/{video_id}")
}

/// Thumbnail image URL
#[must_use]
pub fn thumbnail_url(video_id: &str, quality: ThumbnailQuality) -> String {
    format!("{THUMBNAIL_BASE}/{video_id}/{}", quality.file_name())
}

/// Canonical watch URL
#[must_use]
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Thumbnail for a stored video link, `hq` quality
#[must_use]
pub fn thumbnail_for_link(link: &str) -> Option<String> {
    video_id(link).map(|id| thumbnail_url(&id, ThumbnailQuality::Hq))
}

/// Everything derivable from a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// The 11-character id
    pub video_id: String,
    /// Canonical watch URL
    pub watch_url: String,
    /// Player URL
    pub embed_url: String,
    /// Thumbnail URL per quality
    pub thumbnails: Vec<Thumbnail>,
}

/// One thumbnail entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Size label
    pub quality: ThumbnailQuality,
    /// Image URL
    pub url: String,
}

impl VideoReference {
    /// Parse a link into a full reference
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let id = video_id(input)?;
        Some(Self {
            watch_url: watch_url(&id),
            embed_url: embed_url(&id),
            thumbnails: ThumbnailQuality::ALL
                .iter()
                .map(|&quality| Thumbnail {
                    quality,
                    url: thumbnail_url(&id, quality),
                })
                .collect(),
            video_id: id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_with_tracking_parameter() {
        assert_eq!(
            video_id("https://youtu.be/abc12345678?si=xyz").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn test_shorts_link() {
        assert_eq!(
            video_id("https://youtube.com/shorts/abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn test_not_a_url() {
        assert_eq!(video_id("not a url"), None);
        assert_eq!(video_id(""), None);
        assert_eq!(video_id("   "), None);
    }

    #[test]
    fn test_watch_link_with_extra_parameters() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL1").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_embed_and_live_links() {
        assert_eq!(
            video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://www.youtube.com/live/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_scheme_less_link_uses_pattern_fallback() {
        assert_eq!(
            video_id("youtu.be/abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn test_foreign_hosts_and_bad_ids_rejected() {
        assert_eq!(video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(video_id("https://www.youtube.com/channel/UC123"), None);
    }

    #[test]
    fn test_thumbnail_and_embed_templates() {
        assert_eq!(
            thumbnail_url("abc12345678", ThumbnailQuality::Hq),
            "https://img.youtube.com/vi/abc12345678/hqdefault.jpg"
        );
        assert_eq!(
            thumbnail_url("abc12345678", ThumbnailQuality::Default),
            "https://img.youtube.com/vi/abc12345678/default.jpg"
        );
        assert_eq!(
            embed_url("abc12345678"),
            "https://www.youtube.com/embed/abc12345678"
        );
    }

    #[test]
    fn test_video_reference_lists_every_quality() {
        let reference = VideoReference::parse("https://youtu.be/abc12345678").unwrap();
        assert_eq!(reference.thumbnails.len(), 5);
        assert_eq!(reference.watch_url, "https://www.youtube.com/watch?v=abc12345678");
    }
}
