/*!
 * Text normalization for AI-generated lesson prose.
 *
 * Completions come back as free-form text with no structural guarantees:
 * numbered lists run together on one line, lettered sub-lists hide inside
 * sentences, and emphasis markers arrive unbalanced. This module splits a
 * raw blob into the ordered logical lines the document assemblers consume.
 *
 * The heuristics are pattern-based, not structure-aware. They can insert
 * spurious breaks (a mid-sentence "b. " will split), and the regression
 * tests pin that behavior rather than hide it.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Inline numbered list marker: whitespace, one or two digits, period, whitespace
static INLINE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t]+(\d{1,2}\.[ \t])").unwrap()
});

/// Inline lettered list marker: whitespace, single lowercase letter, `.` or `)`, whitespace
static INLINE_LETTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t]+([a-z][.)][ \t])").unwrap()
});

/// Differentiation tier marker: whitespace, the literal "Tier", optional space, digit
static TIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t]+(Tier[ \t]?\d)").unwrap()
});

/// Split a raw completion blob into ordered logical lines.
///
/// An empty input yields an empty sequence. Blank lines are preserved as
/// empty strings so downstream assemblers can keep vertical spacing.
/// Breaks are only ever inserted, never removed.
pub fn split_logical_lines(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    // Stabilize line endings first so the break insertion below is
    // deterministic across platforms.
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let broken = insert_list_breaks(&unified);

    broken
        .split('\n')
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// Insert a line break before each inline list marker.
///
/// Applied in order: numbered markers, lettered markers, tier markers.
/// Each pass replaces the preceding run of spaces with a newline and keeps
/// the marker itself.
pub fn insert_list_breaks(text: &str) -> String {
    let numbered = INLINE_NUMBER_REGEX.replace_all(text, "\n$1");
    let lettered = INLINE_LETTER_REGEX.replace_all(&numbered, "\n$1");
    TIER_REGEX.replace_all(&lettered, "\n$1").into_owned()
}

/// Strip a single trailing orphan bold marker from a line.
///
/// Upstream completions sometimes close a paragraph with a dangling `**`
/// that never opened. Only an odd marker count is treated as an orphan;
/// balanced lines pass through untouched.
pub fn strip_trailing_orphan_bold(line: &str) -> String {
    let trimmed = line.trim_end();
    if trimmed.ends_with("**") && trimmed.matches("**").count() % 2 == 1 {
        return trimmed[..trimmed.len() - 2].trim_end().to_string();
    }
    line.to_string()
}
