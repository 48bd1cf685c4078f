/*!
 * Tests for the print-ready HTML assembler
 */

use lessonforge::render::html::{escape_html, render_lesson, render_printable, LessonPage};

use crate::common;

fn sample_page() -> LessonPage {
    LessonPage {
        term: "Term 2".to_string(),
        week: "Week 5".to_string(),
        day: "Monday".to_string(),
        subject: "Science".to_string(),
        duration: "60 minutes".to_string(),
        strand: "Diversity of Matter".to_string(),
        sub_strand: "Materials".to_string(),
        class_name: "Basic 4".to_string(),
        content_standard: "B4.1.1.1".to_string(),
        indicator: "B4.1.1.1.1".to_string(),
        starter: "Sing the water song".to_string(),
        new_learning: "Activity 1 Observe materials\n1. Collect samples 2. Sort them".to_string(),
        reflection: "Exit ticket".to_string(),
    }
}

#[test]
fn test_renderLesson_withAllFields_shouldEmitMetaAndPhases() {
    let html = render_lesson(&sample_page());

    assert!(html.contains("Term:</span> Term 2"));
    assert!(html.contains("Subject:</span> Science"));
    assert!(html.contains("Phase 1: Starter"));
    assert!(html.contains("Phase 2: New Learning"));
    assert!(html.contains("Phase 3: Reflection"));
    assert!(html.contains("Sing the water song"));
}

/// The phase formatter re-implements the line heuristics: activity
/// headers bold, inline numbered lists split into separate paragraphs.
#[test]
fn test_renderLesson_withNumberedPhaseText_shouldSplitIntoParagraphs() {
    let html = render_lesson(&sample_page());

    assert!(html.contains("<strong>Activity 1 Observe materials</strong>"));
    assert!(html.contains("<p>1. Collect samples</p>"));
    assert!(html.contains("<p>2. Sort them</p>"));
}

#[test]
fn test_renderLesson_withEmphasisSpans_shouldMapToTags() {
    let mut page = sample_page();
    page.reflection = "Learners share **one** thing they *liked*".to_string();
    let html = render_lesson(&page);

    assert!(html.contains("<strong>one</strong>"));
    assert!(html.contains("<em>liked</em>"));
}

#[test]
fn test_renderLesson_withMarkupInFields_shouldEscape() {
    let mut page = sample_page();
    page.subject = "Maths <advanced>".to_string();
    let html = render_lesson(&page);

    assert!(html.contains("Maths &lt;advanced&gt;"));
    assert!(!html.contains("<advanced>"));
}

#[test]
fn test_renderPrintable_withMultipleLessons_shouldInsertPageBreaks() {
    let pages = vec![sample_page(), sample_page(), sample_page()];
    let html = render_printable(&pages);

    // Two breaks between three lessons
    assert_eq!(html.matches("<div class=\"page-break\"></div>").count(), 2);
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("@media print"));
}

#[test]
fn test_renderPrintable_withSingleLesson_shouldHaveNoPageBreak() {
    let html = render_printable(&[sample_page()]);
    assert_eq!(html.matches("<div class=\"page-break\"></div>").count(), 0);
}

#[test]
fn test_escapeHtml_withMetacharacters_shouldEscapeAll() {
    assert_eq!(escape_html("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
}

/// Freeform content splits into phases at recognized header lines
#[test]
fn test_fromFreeform_withPhaseHeaders_shouldAssignSections() {
    let content = "Starter\nSing a song\nNew Learning\nObserve materials\nReflection\nShare one thing";
    let page = LessonPage::from_freeform(&common::sample_metadata(), content);

    assert_eq!(page.starter.trim(), "Sing a song");
    assert_eq!(page.new_learning.trim(), "Observe materials");
    assert_eq!(page.reflection.trim(), "Share one thing");
    assert_eq!(page.subject, "Science");
    assert_eq!(page.class_name, "Basic 4");
}

/// Without recognizable headers everything lands in new learning
#[test]
fn test_fromFreeform_withNoHeaders_shouldDefaultToNewLearning() {
    let page = LessonPage::from_freeform(&common::sample_metadata(), "just one paragraph");
    assert_eq!(page.new_learning.trim(), "just one paragraph");
    assert!(page.starter.is_empty());
}
