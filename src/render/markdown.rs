/*!
 * Inline markdown tokenization for a single logical line.
 *
 * Converts one line into a flat sequence of styled runs. There is no
 * nesting: a run is bold, italic, or plain. Unbalanced markers are left
 * in place as literal characters rather than guessed at.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Bold span: text wrapped in double asterisks
static BOLD_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*").unwrap()
});

/// Italic span: text wrapped in single asterisks
static ITALIC_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^*]+)\*").unwrap()
});

/// One inline run after markdown parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    /// Visible characters of the run, markers stripped
    pub text: String,

    /// Whether the run renders bold
    pub bold: bool,

    /// Whether the run renders italic
    pub italic: bool,
}

impl TextToken {
    /// Create a plain run
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false, italic: false }
    }

    /// Create a bold run
    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true, italic: false }
    }

    /// Create an italic run
    pub fn italic(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false, italic: true }
    }
}

/// Tokenize one logical line into styled runs.
///
/// Two-pass split: bold spans are carved out first, then italic spans
/// inside the remaining segments. Concatenating `.text` across the result
/// reproduces the line's visible characters with balanced markers stripped
/// exactly once.
pub fn parse_line(line: &str) -> Vec<TextToken> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in BOLD_SPAN_REGEX.captures_iter(line) {
        let span = caps.get(0).unwrap();
        if span.start() > cursor {
            push_italic_runs(&line[cursor..span.start()], &mut tokens);
        }
        tokens.push(TextToken::bold(caps.get(1).unwrap().as_str()));
        cursor = span.end();
    }

    if cursor < line.len() {
        push_italic_runs(&line[cursor..], &mut tokens);
    }

    tokens
}

/// Split a non-bold segment into italic and plain runs.
fn push_italic_runs(segment: &str, tokens: &mut Vec<TextToken>) {
    let mut cursor = 0;

    for caps in ITALIC_SPAN_REGEX.captures_iter(segment) {
        let span = caps.get(0).unwrap();
        if span.start() > cursor {
            tokens.push(TextToken::plain(&segment[cursor..span.start()]));
        }
        tokens.push(TextToken::italic(caps.get(1).unwrap().as_str()));
        cursor = span.end();
    }

    if cursor < segment.len() {
        tokens.push(TextToken::plain(&segment[cursor..]));
    }
}

/// Concatenate the visible text of a token sequence.
pub fn visible_text(tokens: &[TextToken]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}
