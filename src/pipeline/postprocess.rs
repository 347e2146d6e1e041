//! Post-processing: deterministic cleanup of vision-model transcriptions.
//!
//! Vision models occasionally wrap their answer in a code fence, emit CRLF
//! line endings or sprinkle zero-width characters into the text. None of that
//! is content, and left alone it would skew word counts (a fence line is a
//! token; a stray zero-width joiner turns one word into two distinct
//! frequency keys).
//!
//! Rules run in this order:
//! 1. Strip an outer ```` ``` ```` / ```` ```text ```` fence
//! 2. Normalise line endings (CRLF → LF)
//! 3. Drop zero-width and soft-hyphen characters; Unicode line
//!    separators become plain newlines
//!
//! Tesseract output is used as-is; these rules exist for model output only.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a raw vision-model transcription.
pub fn clean_transcription(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    remove_invisible_chars(&s)
}

// ── Rule 1: Strip outer fences ───────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .replace(['\u{2028}', '\u{2029}'], "\n")
        .replace(
            [
                '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
            ],
            "",
        )
}
