/*!
 * Tests for the inline markdown tokenizer
 */

use lessonforge::render::markdown::{parse_line, visible_text, TextToken};

/// Core property: balanced double markers are stripped exactly once and
/// concatenating token text reproduces the visible characters.
#[test]
fn test_parseLine_withBalancedBold_shouldReproduceVisibleText() {
    let line = "Learners **observe** the materials and **record** findings";
    let tokens = parse_line(line);
    assert_eq!(
        visible_text(&tokens),
        "Learners observe the materials and record findings"
    );

    let bold: Vec<&TextToken> = tokens.iter().filter(|t| t.bold).collect();
    assert_eq!(bold.len(), 2);
    assert_eq!(bold[0].text, "observe");
    assert_eq!(bold[1].text, "record");
}

#[test]
fn test_parseLine_withPlainText_shouldReturnSinglePlainToken() {
    let tokens = parse_line("no markers here");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0], TextToken::plain("no markers here"));
}

#[test]
fn test_parseLine_withEmptyLine_shouldReturnNoTokens() {
    assert!(parse_line("").is_empty());
}

#[test]
fn test_parseLine_withItalicSpan_shouldFlagItalic() {
    let tokens = parse_line("sing *softly* now");
    assert_eq!(tokens.len(), 3);
    assert!(!tokens[0].italic);
    assert!(tokens[1].italic);
    assert_eq!(tokens[1].text, "softly");
    assert_eq!(visible_text(&tokens), "sing softly now");
}

#[test]
fn test_parseLine_withBoldAndItalic_shouldSplitInOrder() {
    let tokens = parse_line("**Head** then *aside* done");
    assert_eq!(tokens.len(), 4);
    assert!(tokens[0].bold);
    assert_eq!(tokens[0].text, "Head");
    assert!(tokens[2].italic);
    assert_eq!(tokens[2].text, "aside");
    assert_eq!(visible_text(&tokens), "Head then aside done");
}

/// Unbalanced markers are left as literal characters, a known source of
/// visual artifacts upstream.
#[test]
fn test_parseLine_withUnbalancedBold_shouldKeepMarkersLiteral() {
    let line = "an **unclosed marker";
    let tokens = parse_line(line);
    assert_eq!(visible_text(&tokens), line);
    assert!(tokens.iter().all(|t| !t.bold));
}

/// An odd third marker pair-boundary: the first balanced span parses,
/// the leftover stays literal.
#[test]
fn test_parseLine_withOddMarkerCount_shouldParseBalancedPrefix() {
    let tokens = parse_line("**a** and **b");
    assert_eq!(visible_text(&tokens), "a and **b");
    assert!(tokens[0].bold);
}

#[test]
fn test_parseLine_withAdjacentBoldSpans_shouldEmitSeparateTokens() {
    let tokens = parse_line("**one****two**");
    let bold: Vec<&TextToken> = tokens.iter().filter(|t| t.bold).collect();
    assert_eq!(bold.len(), 2);
    assert_eq!(visible_text(&tokens), "onetwo");
}
