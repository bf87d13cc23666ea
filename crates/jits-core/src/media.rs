//! Clip references attached to nodes.
//!
//! The engine never interprets a [`MediaRef`]; it only carries it. The one piece of
//! media logic that lives here is [`extract_clip_id`], which turns whatever the user
//! pasted (a share link, a watch URL, an embed URL or a bare id) into the canonical
//! video id stored on the node.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recognized link shapes, tried in order. The first capture group is the id.
static CLIP_URL_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtube\.com/embed/([A-Za-z0-9_-]{11})",
    ]
    .map(|pattern| Regex::new(pattern).expect("clip URL patterns are valid"))
});

/// Errors raised when building a [`MediaRef`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    #[error("clip source is empty")]
    EmptySource,

    #[error("clip ends at {end}s before it starts at {start}s")]
    InvertedRange { start: f32, end: f32 },

    #[error("clip offsets must be finite and non-negative")]
    InvalidOffset,
}

/// Extracts the canonical clip id from a raw reference.
///
/// Inputs that match none of the recognized link shapes are assumed to already be
/// canonical and are returned unchanged (minus surrounding whitespace).
///
/// # Examples
///
/// ```
/// use jits_core::media::extract_clip_id;
///
/// assert_eq!(extract_clip_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
/// assert_eq!(extract_clip_id("www.youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
/// assert_eq!(extract_clip_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
/// ```
pub fn extract_clip_id(raw: &str) -> &str {
    let raw = raw.trim();
    CLIP_URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(raw)?.get(1))
        .map_or(raw, |id| id.as_str())
}

/// A clip attached to a node: which video, which span of it, and whether it loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    source_id: String,
    start_offset: f32,
    end_offset: f32,
    #[serde(rename = "loop", default = "default_loop")]
    looped: bool,
}

fn default_loop() -> bool {
    true
}

impl MediaRef {
    /// Creates a clip reference from an already canonical source id.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] for an empty source, negative or non-finite offsets, or
    /// an end offset before the start offset.
    pub fn new(
        source_id: impl Into<String>,
        start_offset: f32,
        end_offset: f32,
        looped: bool,
    ) -> Result<Self, MediaError> {
        let source_id = source_id.into();
        if source_id.is_empty() {
            return Err(MediaError::EmptySource);
        }
        if ![start_offset, end_offset]
            .iter()
            .all(|offset| offset.is_finite() && *offset >= 0.0)
        {
            return Err(MediaError::InvalidOffset);
        }
        if end_offset < start_offset {
            return Err(MediaError::InvertedRange {
                start: start_offset,
                end: end_offset,
            });
        }

        Ok(Self {
            source_id,
            start_offset,
            end_offset,
            looped,
        })
    }

    /// Creates a clip reference from a raw link or id, canonicalizing it with
    /// [`extract_clip_id`].
    ///
    /// # Errors
    ///
    /// Same as [`MediaRef::new`].
    pub fn from_raw(
        raw: &str,
        start_offset: f32,
        end_offset: f32,
        looped: bool,
    ) -> Result<Self, MediaError> {
        Self::new(extract_clip_id(raw), start_offset, end_offset, looped)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn start_offset(&self) -> f32 {
        self.start_offset
    }

    pub fn end_offset(&self) -> f32 {
        self.end_offset
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    /// Length of the clip in seconds.
    pub fn duration(&self) -> f32 {
        self.end_offset - self.start_offset
    }
}
