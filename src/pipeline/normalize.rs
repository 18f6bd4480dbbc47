//! Normalisation: deterministic cleanup of raw OCR output.
//!
//! Tesseract output on scanned transcripts carries predictable artifacts:
//! stray bytes outside ASCII, runs of spaces where table columns used to be,
//! and walls of blank lines between sparse regions. These rules remove the
//! noise without touching content, so the field matchers downstream run
//! against stable input.
//!
//! ## Rule order
//!
//! Rules run in a fixed order: line endings are unified before the ASCII
//! filter (so `\r` never survives as noise), horizontal whitespace collapses
//! before lines are trimmed, and blank-line collapsing runs last over the
//! already-trimmed lines. Each rule is a pure `&str -> String` function with
//! its own tests.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw recognised text.
///
/// Returns the cleaned text; the result may be empty, which callers treat as
/// "this page contributed nothing".
pub fn clean_text(input: &str) -> String {
    let s = normalize_line_endings(input);
    let s = strip_non_ascii(&s);
    let s = collapse_spaces(&s);
    let s = trim_lines(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: Unify line endings ───────────────────────────────────────────

fn normalize_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip non-printable / non-ASCII noise ────────────────────────
//
// Recognition is whitelist-constrained already, but engine glitches and
// mis-segmented glyphs still leak control bytes and mojibake. Newlines and
// tabs survive; tabs are folded into spaces by the next rule.

fn strip_non_ascii(input: &str) -> String {
    input
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || (' '..='~').contains(&c))
        .collect()
}

// ── Rule 3: Collapse horizontal whitespace runs ──────────────────────────

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_SPACES.replace_all(input, " ").to_string()
}

// ── Rule 4: Trim every line ──────────────────────────────────────────────

fn trim_lines(input: &str) -> String {
    input
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse repeated blank lines to one ─────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_unified() {
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn non_ascii_stripped() {
        assert_eq!(strip_non_ascii("GPA\u{fffd}: 3.8\u{00a0}é"), "GPA: 3.8");
        assert_eq!(strip_non_ascii("a\x01b\x07c"), "abc");
    }

    #[test]
    fn newlines_survive_ascii_filter() {
        assert_eq!(strip_non_ascii("a\nb"), "a\nb");
    }

    #[test]
    fn space_runs_collapse() {
        assert_eq!(collapse_spaces("a   b\t\tc"), "a b c");
    }

    #[test]
    fn lines_trimmed() {
        assert_eq!(trim_lines("  a  \n  b"), "a\nb");
    }

    #[test]
    fn blank_lines_collapse_to_one() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn clean_text_full_pipeline() {
        let raw = "  State   University \r\n\r\n\r\n\r\nGPA:  3.8   \r\n";
        assert_eq!(clean_text(raw), "State University\n\nGPA: 3.8");
    }

    #[test]
    fn garbage_cleans_to_empty() {
        assert_eq!(clean_text("\u{fffd}\u{fffd}  \r\n \x02 "), "");
    }
}
