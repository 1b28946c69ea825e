//! Core data model for synchronized lyrics
//!
//! Owned, serializable types shared by the parser, the sync engine and the
//! document store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single time-stamped line of original-language lyrics.
///
/// Lines are ordered by `time_ms` ascending. Duplicate timestamps are
/// permitted (a repeated chorus emits one entry per tag) and keep their
/// relative order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Display time in milliseconds from the start of the track
    pub time_ms: u64,
    /// The line text (may be empty for an intentional blank line)
    pub text: String,
    /// Romanized/phonetic rendering of the text, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanization: Option<String>,
}

impl LyricLine {
    pub fn new(time_ms: u64, text: impl Into<String>) -> Self {
        Self {
            time_ms,
            text: text.into(),
            romanization: None,
        }
    }
}

/// One entry of a translation overlay.
///
/// Overlays are timestamped independently of the original lines and are not
/// required to align 1:1 with them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationLine {
    /// Time in milliseconds at which this translation becomes current
    pub time_ms: u64,
    /// The original-language text this entry translates
    pub original: String,
    /// The translated text
    pub translated: String,
}

/// Song metadata carried alongside the lyric lines.
///
/// `artist`/`title`/`album` come from `[key:value]` directives in the lyrics
/// source or from the catalog record; `offset_ms` is the `[offset:...]`
/// directive, a global shift the consumer applies via
/// [`crate::timing::apply_offset`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Track duration in milliseconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Authored sync correction in milliseconds (signed)
    #[serde(default)]
    pub offset_ms: i64,
}

/// Everything known about one song's lyrics: the original lines plus zero or
/// more translation overlays keyed by language code.
///
/// Constructed once per fetch and read-only thereafter; the store hands out
/// shared references.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsDocument {
    pub song_id: String,
    pub metadata: LyricsMetadata,
    pub lines: Vec<LyricLine>,
    /// Translation overlays by language code ("es", "fr", ...). A `BTreeMap`
    /// keeps "first available language" deterministic.
    #[serde(default)]
    pub translations: BTreeMap<String, Vec<TranslationLine>>,
}

impl LyricsDocument {
    /// Language codes that have overlay data, in map order.
    pub fn available_languages(&self) -> Vec<String> {
        self.translations.keys().cloned().collect()
    }

    /// The overlay for a language code, if present.
    pub fn translation(&self, language: &str) -> Option<&[TranslationLine]> {
        self.translations.get(language).map(Vec::as_slice)
    }

    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Immutable snapshot of the playback clock, taken once per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Current playback position in milliseconds
    pub position_ms: u64,
    /// Track duration in milliseconds (0 when unknown)
    pub duration_ms: u64,
    /// Whether the clock is advancing
    pub playing: bool,
}

/// The engine's answer for one instant of playback. Derived on every tick,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSyncState {
    /// Index of the active original line, `None` before the first timestamp
    pub active_line: Option<usize>,
    /// Resolved translation text for the selected language, if any entry is
    /// current at this instant
    pub translation: Option<String>,
}
