//! Pure time utilities for audio-lyrics synchronization
//!
//! Offset correction, scroll interpolation, per-line duration estimates and
//! naive word-timing estimation. All functions degrade to a safe default
//! (0, empty, or clamped) on out-of-range input; a sync glitch must never
//! take playback down with it.

use crate::types::LyricLine;

/// A word with its estimated display window inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTiming {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Shift every line by `offset_ms`, clamping at zero. Used both for the
/// `[offset:...]` directive and for a user's manual sync correction.
pub fn apply_offset(lines: &[LyricLine], offset_ms: i64) -> Vec<LyricLine> {
    lines
        .iter()
        .map(|line| LyricLine {
            time_ms: line.time_ms.saturating_add_signed(offset_ms),
            text: line.text.clone(),
            romanization: line.romanization.clone(),
        })
        .collect()
}

/// Linear progress of `current_ms` through `[start_ms, end_ms]`, in `[0, 1]`.
///
/// Drives scroll/animation progress only; line selection uses the interval
/// rules in [`crate::engine`]. Degenerate ranges collapse to the boundaries.
pub fn interpolate(start_ms: u64, end_ms: u64, current_ms: u64) -> f32 {
    if current_ms <= start_ms {
        return 0.0;
    }
    if current_ms >= end_ms {
        return 1.0;
    }
    (current_ms - start_ms) as f32 / (end_ms - start_ms) as f32
}

/// Estimated duration of `lines[index]`: bounded by the next line's start,
/// or `default_ms` for the final line (nothing bounds it) and for an
/// out-of-range index.
pub fn line_duration_ms(lines: &[LyricLine], index: usize, default_ms: u64) -> u64 {
    match (lines.get(index), lines.get(index + 1)) {
        (Some(current), Some(next)) => next.time_ms.saturating_sub(current.time_ms),
        _ => default_ms,
    }
}

/// Assign each whitespace-separated word of `line` an equal slice of
/// `duration_ms`, starting at the line's own time.
///
/// Slice boundaries are computed as `time + i * duration / count`, so the
/// words are contiguous, non-overlapping, and exactly cover
/// `[time, time + duration)`. This is a uniform model for karaoke-style
/// highlighting, not derived from audio analysis.
pub fn estimate_word_timings(line: &LyricLine, duration_ms: u64) -> Vec<WordTiming> {
    let words: Vec<&str> = line.text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let count = words.len() as u64;
    words
        .iter()
        .enumerate()
        .map(|(i, word)| WordTiming {
            text: (*word).to_string(),
            start_ms: line.time_ms + (i as u64) * duration_ms / count,
            end_ms: line.time_ms + (i as u64 + 1) * duration_ms / count,
        })
        .collect()
}

/// Naive words-per-minute pace of a line shown for `duration_ms`, for
/// difficulty hints alongside [`estimate_word_timings`]. No words or a zero
/// duration reads as 0.0.
pub fn words_per_minute(text: &str, duration_ms: u64) -> f64 {
    let words = text.split_whitespace().count();
    if words == 0 || duration_ms == 0 {
        return 0.0;
    }
    words as f64 * 60_000.0 / duration_ms as f64
}

/// Format a seconds value as `m:ss`, or `m:ss.ff` with centiseconds.
/// Negative or non-finite input formats as zero.
pub fn format_seconds(seconds: f64, with_centis: bool) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;

    if with_centis {
        let centis = ((seconds % 1.0) * 100.0).floor() as u64;
        format!("{}:{:02}.{:02}", mins, secs, centis)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Parse an `m:ss` or `m:ss.ff`/`m:ss.fff` display string back to seconds.
/// A missing or out-of-pattern fraction reads as zero (the minutes and
/// seconds still count); a malformed minutes:seconds part reads as 0.0.
pub fn parse_display_time(value: &str) -> f64 {
    let value = value.trim();
    let Some((min_str, rest)) = value.split_once(':') else {
        return 0.0;
    };
    let (sec_str, frac_str) = match rest.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (rest, None),
    };

    let Ok(minutes) = min_str.parse::<u64>() else {
        return 0.0;
    };
    if sec_str.len() != 2 {
        return 0.0;
    }
    let Ok(seconds) = sec_str.parse::<u64>() else {
        return 0.0;
    };

    let fraction = match frac_str {
        Some(f) if (2..=3).contains(&f.len()) && f.bytes().all(|b| b.is_ascii_digit()) => {
            let mut padded = f.to_string();
            while padded.len() < 3 {
                padded.push('0');
            }
            padded.parse::<u64>().unwrap_or(0) as f64 / 1000.0
        }
        // Fractions outside the 2-3 digit pattern are dropped, not fatal
        _ => 0.0,
    };

    minutes as f64 * 60.0 + seconds as f64 + fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_offset_clamps_at_zero() {
        let lines = vec![LyricLine::new(50, "a"), LyricLine::new(2000, "b")];
        let shifted = apply_offset(&lines, -100_000);
        assert_eq!(shifted[0].time_ms, 0);
        assert_eq!(shifted[1].time_ms, 0);

        let shifted = apply_offset(&lines, 500);
        assert_eq!(shifted[0].time_ms, 550);
        assert_eq!(shifted[1].time_ms, 2500);
    }

    #[test]
    fn test_interpolate_bounds() {
        assert_eq!(interpolate(1000, 2000, 500), 0.0);
        assert_eq!(interpolate(1000, 2000, 1000), 0.0);
        assert_eq!(interpolate(1000, 2000, 1500), 0.5);
        assert_eq!(interpolate(1000, 2000, 2000), 1.0);
        assert_eq!(interpolate(1000, 2000, 9000), 1.0);
        // Degenerate range never divides by zero
        assert_eq!(interpolate(1000, 1000, 1000), 0.0);
        assert_eq!(interpolate(2000, 1000, 1500), 1.0);
    }

    #[test]
    fn test_line_duration() {
        let lines = vec![
            LyricLine::new(0, "a"),
            LyricLine::new(1200, "b"),
            LyricLine::new(4000, "c"),
        ];
        assert_eq!(line_duration_ms(&lines, 0, 3000), 1200);
        assert_eq!(line_duration_ms(&lines, 1, 3000), 2800);
        // Final line has no successor, caller default applies
        assert_eq!(line_duration_ms(&lines, 2, 3000), 3000);
        assert_eq!(line_duration_ms(&lines, 10, 3000), 3000);
        assert_eq!(line_duration_ms(&[], 0, 3000), 3000);
    }

    #[test]
    fn test_word_timings_partition_exactly() {
        let line = LyricLine::new(0, "a b c");
        let words = estimate_word_timings(&line, 3000);
        assert_eq!(words.len(), 3);
        assert_eq!((words[0].start_ms, words[0].end_ms), (0, 1000));
        assert_eq!((words[1].start_ms, words[1].end_ms), (1000, 2000));
        assert_eq!((words[2].start_ms, words[2].end_ms), (2000, 3000));
    }

    #[test]
    fn test_word_timings_uneven_duration_stays_contiguous() {
        let line = LyricLine::new(500, "uno dos tres");
        let words = estimate_word_timings(&line, 1000);
        assert_eq!(words[0].start_ms, 500);
        // Each word's end is the next word's start
        assert_eq!(words[0].end_ms, words[1].start_ms);
        assert_eq!(words[1].end_ms, words[2].start_ms);
        // The last word closes the full window
        assert_eq!(words[2].end_ms, 1500);
    }

    #[test]
    fn test_word_timings_empty_text() {
        let line = LyricLine::new(0, "   ");
        assert!(estimate_word_timings(&line, 3000).is_empty());
    }

    #[test]
    fn test_words_per_minute() {
        assert_eq!(words_per_minute("uno dos tres", 3000), 60.0);
        assert_eq!(words_per_minute("uno dos tres", 1500), 120.0);
        assert_eq!(words_per_minute("   ", 3000), 0.0);
        assert_eq!(words_per_minute("uno", 0), 0.0);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0, false), "0:00");
        assert_eq!(format_seconds(65.0, false), "1:05");
        assert_eq!(format_seconds(65.25, true), "1:05.25");
        assert_eq!(format_seconds(-3.0, false), "0:00");
        assert_eq!(format_seconds(f64::NAN, true), "0:00.00");
    }

    #[test]
    fn test_parse_display_time() {
        assert_eq!(parse_display_time("1:05"), 65.0);
        assert_eq!(parse_display_time("1:05.25"), 65.25);
        assert_eq!(parse_display_time("0:02.500"), 2.5);
        assert_eq!(parse_display_time("not a time"), 0.0);
        assert_eq!(parse_display_time("1:5"), 0.0);
        assert_eq!(parse_display_time(""), 0.0);
    }

    #[test]
    fn test_parse_display_time_drops_odd_fractions() {
        // A fraction outside the ff/fff pattern is ignored, the rest counts
        assert_eq!(parse_display_time("1:05.2"), 65.0);
        assert_eq!(parse_display_time("1:05.2222"), 65.0);
        assert_eq!(parse_display_time("1:05.ab"), 65.0);
    }
}
