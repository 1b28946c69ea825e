//! Synchronization engine
//!
//! Resolves a playback position against the lyric timeline: which original
//! line is active, which translation entry is current, and what the display
//! mode says to show. Resolution is a pure function of the instantaneous
//! time, so seeks and backward jumps need no special handling.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::timing::apply_offset;
use crate::types::{LyricLine, LyricsDocument, PlaybackState, ResolvedSyncState, TranslationLine};

/// Active-line rule: line `i` is active while
/// `lines[i].time <= t < lines[i + 1].time`, the last line staying active
/// through end of playback. Before the first line (or for negative time)
/// no line is active.
///
/// This is a half-open partition of the timeline: ties go to the line that
/// starts at `t`, never to the nearest neighbor.
pub fn active_line_index(lines: &[LyricLine], time_ms: i64) -> Option<usize> {
    if time_ms < 0 {
        return None;
    }
    let t = time_ms as u64;

    let mut current = None;
    for (idx, line) in lines.iter().enumerate() {
        if line.time_ms <= t {
            current = Some(idx);
        } else {
            break;
        }
    }
    current
}

/// Nearest-line rule for scrub/seek previews: the line whose timestamp has
/// the smallest absolute distance from `time_ms`, lower index winning exact
/// ties. Distinct from [`active_line_index`]: at `t` just before a line
/// boundary the two disagree.
pub fn nearest_line_index(lines: &[LyricLine], time_ms: i64) -> Option<usize> {
    let first = lines.first()?;

    let mut nearest = 0;
    let mut nearest_diff = time_distance(first.time_ms, time_ms);
    for (idx, line) in lines.iter().enumerate().skip(1) {
        let diff = time_distance(line.time_ms, time_ms);
        if diff < nearest_diff {
            nearest_diff = diff;
            nearest = idx;
        }
    }
    Some(nearest)
}

fn time_distance(line_ms: u64, time_ms: i64) -> u64 {
    if time_ms < 0 {
        line_ms.saturating_add(time_ms.unsigned_abs())
    } else {
        line_ms.abs_diff(time_ms as u64)
    }
}

/// Translation step function: the last overlay entry whose time is at or
/// before `time_ms`. Translations have no end boundary; an entry persists
/// until superseded. `None` before the first entry.
pub fn resolve_translation(overlay: &[TranslationLine], time_ms: i64) -> Option<&str> {
    if time_ms < 0 {
        return None;
    }
    let t = time_ms as u64;
    overlay
        .iter()
        .rev()
        .find(|entry| entry.time_ms <= t)
        .map(|entry| entry.translated.as_str())
}

/// What to show for the active line. Set directly by the consumer, no
/// transition guards; entering a mode simply re-evaluates at the current
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Source text only, regardless of translation availability
    #[default]
    Original,
    /// Resolved translation when available, else the source text
    Translation,
    /// Source text with the resolved translation as a secondary line
    Dual,
}

impl DisplayMode {
    /// Lenient parse of an externally supplied mode string. Unknown values
    /// fall through to [`DisplayMode::Original`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "original" => Self::Original,
            "translation" => Self::Translation,
            "dual" => Self::Dual,
            other => {
                tracing::debug!("Unknown display mode {:?}, falling back to original", other);
                Self::Original
            }
        }
    }
}

/// The text a renderer should show for the active line under the current
/// display mode. Both fields are `None` when no line is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayText {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

/// Result of one engine tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncUpdate {
    pub state: ResolvedSyncState,
    /// True when the active line differs from the previous tick; drives
    /// scroll and highlight changes downstream.
    pub line_changed: bool,
    pub display: DisplayText,
}

/// Holds the loaded lyrics document and the externally supplied
/// configuration (display mode, translation language, sync correction), and
/// resolves playback snapshots against them.
///
/// The engine performs no I/O and never blocks; feed it one
/// [`PlaybackState`] per clock tick or seek.
#[derive(Debug, Default)]
pub struct SyncEngine {
    document: Option<Arc<LyricsDocument>>,
    /// Working copy of the original lines with the authored and user offsets
    /// applied
    lines: Vec<LyricLine>,
    mode: DisplayMode,
    active_language: Option<String>,
    user_offset_ms: i64,
    last_active: Option<usize>,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document (or `None` for the no-lyrics state), resetting the
    /// derived state.
    ///
    /// The previously selected translation language is kept when the new
    /// document still carries it; otherwise the first available language is
    /// selected, or none when the document has no overlays.
    pub fn load(&mut self, document: Option<Arc<LyricsDocument>>) {
        self.document = document;
        self.last_active = None;

        let languages = self
            .document
            .as_ref()
            .map(|doc| doc.available_languages())
            .unwrap_or_default();
        let keep = self
            .active_language
            .as_ref()
            .is_some_and(|lang| languages.iter().any(|l| l == lang));
        if !keep {
            self.active_language = languages.first().cloned();
        }

        self.rebuild_lines();

        if let Some(doc) = &self.document {
            tracing::debug!(
                "Loaded lyrics for {}: {} lines, translations: {:?}",
                doc.song_id,
                self.lines.len(),
                languages
            );
        }
    }

    /// Drop the document and all derived state (track unloaded / playback
    /// stopped).
    pub fn clear(&mut self) {
        self.document = None;
        self.lines.clear();
        self.active_language = None;
        self.last_active = None;
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Select the translation language. A code with no overlay in the loaded
    /// document is a logged no-op, per the lenient configuration policy.
    pub fn set_language(&mut self, language: &str) {
        let available = self
            .document
            .as_ref()
            .is_some_and(|doc| doc.translations.contains_key(language));
        if available {
            self.active_language = Some(language.to_string());
        } else {
            tracing::debug!("Translation language {:?} not available, ignoring", language);
        }
    }

    pub fn active_language(&self) -> Option<&str> {
        self.active_language.as_deref()
    }

    /// Manual sync correction on top of the authored `[offset:...]`
    /// directive, in signed milliseconds.
    pub fn set_user_offset_ms(&mut self, offset_ms: i64) {
        if self.user_offset_ms != offset_ms {
            self.user_offset_ms = offset_ms;
            self.rebuild_lines();
        }
    }

    /// The offset-adjusted original lines the engine resolves against.
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn document(&self) -> Option<&Arc<LyricsDocument>> {
        self.document.as_ref()
    }

    /// Resolve one playback snapshot. Also records the active line so the
    /// next tick can report `line_changed`.
    pub fn tick(&mut self, playback: &PlaybackState) -> SyncUpdate {
        let time_ms = playback.position_ms as i64;

        let active_line = active_line_index(&self.lines, time_ms);
        let translation = self
            .active_overlay()
            .and_then(|overlay| resolve_translation(overlay, time_ms))
            .map(str::to_string);

        let line_changed = active_line != self.last_active;
        self.last_active = active_line;

        let display = self.display_for(active_line, translation.as_deref());

        SyncUpdate {
            state: ResolvedSyncState {
                active_line,
                translation,
            },
            line_changed,
            display,
        }
    }

    fn active_overlay(&self) -> Option<&[TranslationLine]> {
        let doc = self.document.as_ref()?;
        let language = self.active_language.as_deref()?;
        doc.translation(language)
    }

    fn display_for(&self, active_line: Option<usize>, translation: Option<&str>) -> DisplayText {
        let Some(original) = active_line.and_then(|idx| self.lines.get(idx)) else {
            return DisplayText::default();
        };

        match self.mode {
            DisplayMode::Original => DisplayText {
                primary: Some(original.text.clone()),
                secondary: None,
            },
            DisplayMode::Translation => DisplayText {
                // Fall back to the source text when no entry is current
                primary: Some(
                    translation
                        .map(str::to_string)
                        .unwrap_or_else(|| original.text.clone()),
                ),
                secondary: None,
            },
            DisplayMode::Dual => DisplayText {
                primary: Some(original.text.clone()),
                secondary: translation.map(str::to_string),
            },
        }
    }

    fn rebuild_lines(&mut self) {
        self.lines = match &self.document {
            Some(doc) => {
                let shift = doc.metadata.offset_ms + self.user_offset_ms;
                if shift == 0 {
                    doc.lines.clone()
                } else {
                    apply_offset(&doc.lines, shift)
                }
            }
            None => Vec::new(),
        };
    }
}
