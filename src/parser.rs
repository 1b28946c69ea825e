//! Line-synchronized (LRC) lyrics parser
//!
//! Converts the `[mm:ss.fff]text` format into an ordered line list plus a
//! metadata record. Parsing is deliberately lenient: community-sourced lyrics
//! are frequently malformed, so unparseable input degrades to an empty
//! result instead of an error. Absence of synchronized lyrics is a normal
//! state, not a failure.

use crate::types::{LyricLine, LyricsMetadata};

/// Result of parsing one lyrics source. Both halves may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLyrics {
    pub metadata: LyricsMetadata,
    pub lines: Vec<LyricLine>,
}

/// Parse a timestamp tag at the start of `src`: `[m:ss]`, `[mm:ss.f]` up to
/// `[mm:ss.fff]` (`.` or `:` before the fraction).
///
/// Returns the consumed byte length and the time in milliseconds.
fn parse_timestamp(src: &str) -> Option<(usize, u64)> {
    if !src.starts_with('[') {
        return None;
    }

    let end_bracket = src.find(']')?;
    let inner = &src[1..end_bracket];

    let (min_str, rest) = inner.split_once(':')?;
    if min_str.is_empty() || min_str.len() > 2 || !min_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (sec_str, frac_str) = match rest.find(['.', ':']) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    if sec_str.len() != 2 || !sec_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes: u64 = min_str.parse().ok()?;
    let seconds: u64 = sec_str.parse().ok()?;

    // Fraction is right-padded to three digits: .5 -> 500ms, .12 -> 120ms
    let millis = match frac_str {
        Some(f) => {
            if f.is_empty() || f.len() > 3 || !f.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let raw: u64 = f.parse().ok()?;
            match f.len() {
                1 => raw * 100,
                2 => raw * 10,
                _ => raw,
            }
        }
        None => 0,
    };

    Some((end_bracket + 1, minutes * 60_000 + seconds * 1000 + millis))
}

/// Parse a leading signed integer, tolerating trailing junk ("250ms" -> 250).
/// Anything without a leading digit yields 0.
fn parse_offset(value: &str) -> i64 {
    let value = value.trim();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|v| sign * v).unwrap_or(0)
}

/// Try to interpret a whole physical line as a metadata directive
/// `[key:value]`. Recognized keys (case-insensitive) are the full names
/// `artist`/`title`/`album`/`offset` and the LRC short forms `ar`/`ti`/`al`.
///
/// Returns `true` if the line was consumed as a directive, whether or not
/// the key was recognized; a directive line is never a lyric line.
fn parse_directive(line: &str, metadata: &mut LyricsMetadata) -> bool {
    let Some(inner) = line.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
        return false;
    };
    // Directives span the whole line; an inner ']' means this is lyric text.
    if inner.contains(']') {
        return false;
    }
    let Some((key, value)) = inner.split_once(':') else {
        return false;
    };
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    match key.to_ascii_lowercase().as_str() {
        "artist" | "ar" => metadata.artist = Some(value.trim().to_string()),
        "title" | "ti" => metadata.title = Some(value.trim().to_string()),
        "album" | "al" => metadata.album = Some(value.trim().to_string()),
        "offset" => metadata.offset_ms = parse_offset(value),
        other => {
            tracing::debug!("Ignoring unrecognized lyrics directive [{}:...]", other);
        }
    }
    true
}

/// Parse a single lyric line, which may carry several timestamp tags
/// anywhere in the line. Each tag emits one entry sharing the tag-stripped
/// text (a repeated chorus is written once with multiple tags).
fn parse_line(line: &str) -> Vec<LyricLine> {
    let mut timestamps = Vec::new();
    let mut text = String::with_capacity(line.len());
    let bytes = line.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'[' {
            if let Some((consumed, time_ms)) = parse_timestamp(&line[pos..]) {
                timestamps.push(time_ms);
                pos += consumed;
                continue;
            }
        }
        // Step over the current char (which may be multibyte), then copy
        // everything up to the next '[' verbatim. '[' is ASCII, so tag
        // positions are always char boundaries.
        let step = line[pos..].chars().next().map_or(1, char::len_utf8);
        let next = line[pos + step..]
            .find('[')
            .map(|off| pos + step + off)
            .unwrap_or(bytes.len());
        text.push_str(&line[pos..next]);
        pos = next;
    }

    if timestamps.is_empty() {
        return Vec::new();
    }

    // Empty text after stripping tags is retained as an intentional blank line
    let text = text.trim().to_string();
    timestamps
        .into_iter()
        .map(|time_ms| LyricLine::new(time_ms, text.clone()))
        .collect()
}

/// Parse a complete LRC source.
///
/// Never fails: blank lines are skipped, directive lines feed the metadata
/// record, lines without a valid timestamp tag are dropped, and the result
/// is stable-sorted by time (simultaneous lines keep their source order).
pub fn parse_lrc(src: &str) -> ParsedLyrics {
    let mut parsed = ParsedLyrics::default();

    for raw_line in src.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if parse_directive(line, &mut parsed.metadata) {
            continue;
        }
        parsed.lines.extend(parse_line(line));
    }

    parsed.lines.sort_by_key(|l| l.time_ms);

    parsed
}
