//! Text cleanup: turn raw extracted page text into slide-ready blocks.
//!
//! lopdf ends each PDF text object with a newline, so a page comes out as one
//! line per text object. Every non-empty line becomes one block.
//!
//! ## Rule Order
//!
//! Line endings are normalised before splitting; invisible characters and
//! encoding markers are removed before whitespace is collapsed so that a
//! line made only of junk ends up empty and is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Split raw page text into cleaned, non-empty text blocks.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 3. Drop font-encoding failure markers emitted by the extractor
/// 4. Replace control characters with spaces
/// 5. Collapse whitespace runs and trim each line
/// 6. Discard empty lines
pub fn split_blocks(raw: &str) -> Vec<String> {
    let s = normalise_line_endings(raw);
    let s = remove_invisible_chars(&s);
    let s = remove_encoding_markers(&s);
    s.lines()
        .map(replace_control_chars)
        .map(|line| collapse_whitespace(&line))
        .filter(|line| !line.is_empty())
        .collect()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip invisible Unicode ──────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Drop encoding markers ────────────────────────────────────────────
//
// lopdf substitutes this marker for text drawn with CID fonts it cannot decode.

const IDENTITY_H_MARKER: &str = "?Identity-H Unimplemented?";

fn remove_encoding_markers(input: &str) -> String {
    input.replace(IDENTITY_H_MARKER, "")
}

// ── Rule 4: Control characters ───────────────────────────────────────────────
//
// C0/C1 controls other than tab are not allowed in XML 1.0 text content.

fn replace_control_chars(line: &str) -> String {
    line.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

// ── Rule 5: Collapse whitespace ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(line: &str) -> String {
    RE_WHITESPACE.replace_all(line.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_remove_encoding_markers() {
        assert_eq!(
            remove_encoding_markers("?Identity-H Unimplemented??Identity-H Unimplemented?"),
            ""
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t  b\u{00A0}\u{00A0}c  "), "a b c");
    }

    #[test]
    fn test_control_chars_become_spaces() {
        assert_eq!(replace_control_chars("a\u{0001}b\u{0008}c"), "a b c");
    }

    #[test]
    fn test_split_blocks_drops_empty_lines() {
        let raw = "Title\r\n\r\n  Body   text \n\u{200B}\n?Identity-H Unimplemented?\nLast\n";
        assert_eq!(split_blocks(raw), vec!["Title", "Body text", "Last"]);
    }

    #[test]
    fn test_split_blocks_empty_page() {
        assert!(split_blocks("").is_empty());
        assert!(split_blocks("\n \n\t\n").is_empty());
    }
}
