/*!
 * Print-ready HTML assembly for lesson pages.
 *
 * Unlike the DOCX path, this assembler works from a fixed schema of named
 * lesson fields rather than freeform text, and renders a multi-table
 * layout the user opens in a browser and prints to PDF.
 *
 * The line-classification heuristics here mirror the DOCX assembler but
 * are re-implemented independently; the two paths diverged in the source
 * system and the duplication is kept deliberately (see DESIGN.md).
 */

use once_cell::sync::Lazy;
use regex::Regex;

static PHASE_ACTIVITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Activity|Step|Part|Phase|Group)\s+\d+").unwrap()
});

static PHASE_MD_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#{1,6}\s+").unwrap()
});

static PHASE_BULLET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-*]\s+").unwrap()
});

static PHASE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t]+(\d{1,2}\.[ \t])").unwrap()
});

static PHASE_BOLD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*").unwrap()
});

static PHASE_ITALIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^*]+)\*").unwrap()
});

/// Fixed field schema of one printable lesson page.
#[derive(Debug, Clone, Default)]
pub struct LessonPage {
    /// Academic term, e.g. "Term 2"
    pub term: String,
    /// Week label
    pub week: String,
    /// Day label
    pub day: String,
    /// Subject name
    pub subject: String,
    /// Lesson duration, e.g. "60 minutes"
    pub duration: String,
    /// Curriculum strand
    pub strand: String,
    /// Curriculum sub-strand
    pub sub_strand: String,
    /// Class, e.g. "Basic 4"
    pub class_name: String,
    /// Content standard identifier
    pub content_standard: String,
    /// Indicator identifier
    pub indicator: String,
    /// Phase 1: starter activity text
    pub starter: String,
    /// Phase 2: new learning text
    pub new_learning: String,
    /// Phase 3: reflection text
    pub reflection: String,
}

impl LessonPage {
    /// Build a page from note metadata and freeform generated content.
    ///
    /// Phase sections are located by their header lines (starter /
    /// new learning / reflection, case-insensitive). Content before the
    /// first recognized header, or all of it when none is found, lands in
    /// the new-learning phase.
    pub fn from_freeform(metadata: &crate::render::docx::NoteMetadata, content: &str) -> Self {
        let mut page = LessonPage {
            subject: metadata.subject.clone(),
            class_name: metadata.level.clone(),
            strand: metadata.strand.clone(),
            sub_strand: metadata.sub_strand.clone(),
            content_standard: metadata.content_standard.clone(),
            ..LessonPage::default()
        };

        #[derive(Clone, Copy, PartialEq)]
        enum Section {
            Unassigned,
            Starter,
            NewLearning,
            Reflection,
        }

        let mut current = Section::Unassigned;
        let mut unassigned = String::new();

        for line in content.lines() {
            let lowered = line.trim().trim_start_matches(['#', '*', ' ']).to_lowercase();
            if lowered.starts_with("starter") {
                current = Section::Starter;
                continue;
            } else if lowered.starts_with("new learning") {
                current = Section::NewLearning;
                continue;
            } else if lowered.starts_with("reflection") {
                current = Section::Reflection;
                continue;
            }

            let target = match current {
                Section::Starter => &mut page.starter,
                Section::NewLearning => &mut page.new_learning,
                Section::Reflection => &mut page.reflection,
                Section::Unassigned => &mut unassigned,
            };
            target.push_str(line);
            target.push('\n');
        }

        if page.new_learning.is_empty() {
            page.new_learning = unassigned;
        } else if !unassigned.trim().is_empty() {
            page.new_learning = format!("{}\n{}", unassigned.trim_end(), page.new_learning);
        }

        page
    }
}

/// Render one lesson page as an HTML fragment.
pub fn render_lesson(page: &LessonPage) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"lesson\">\n");
    html.push_str("<table class=\"meta\">\n<tr>");
    for (label, value) in [
        ("Term", &page.term),
        ("Week", &page.week),
        ("Day", &page.day),
    ] {
        html.push_str(&format!(
            "<td><span class=\"label\">{}:</span> {}</td>",
            label,
            escape_html(value)
        ));
    }
    html.push_str("</tr>\n<tr>");
    for (label, value) in [
        ("Subject", &page.subject),
        ("Class", &page.class_name),
        ("Duration", &page.duration),
    ] {
        html.push_str(&format!(
            "<td><span class=\"label\">{}:</span> {}</td>",
            label,
            escape_html(value)
        ));
    }
    html.push_str("</tr>\n</table>\n");

    html.push_str("<table class=\"standards\">\n");
    for (label, value) in [
        ("Strand", &page.strand),
        ("Sub-strand", &page.sub_strand),
        ("Content standard", &page.content_standard),
        ("Indicator", &page.indicator),
    ] {
        if !value.is_empty() {
            html.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>\n",
                label,
                escape_html(value)
            ));
        }
    }
    html.push_str("</table>\n");

    html.push_str("<table class=\"phases\">\n");
    html.push_str("<tr><th>Phase 1: Starter</th><th>Phase 2: New Learning</th><th>Phase 3: Reflection</th></tr>\n");
    html.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        format_phase(&page.starter),
        format_phase(&page.new_learning),
        format_phase(&page.reflection)
    ));
    html.push_str("</table>\n</div>\n");

    html
}

/// Render a complete printable document from one or more lesson pages.
///
/// Pages are concatenated with explicit page-break markers so each lesson
/// starts on a fresh sheet when printed.
pub fn render_printable(pages: &[LessonPage]) -> String {
    let mut body = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            body.push_str("<div class=\"page-break\"></div>\n");
        }
        body.push_str(&render_lesson(page));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Lesson Notes</title>
<style>
{PRINT_CSS}
</style>
</head>
<body>
{body}</body>
</html>
"#
    )
}

/// Convert one phase's freeform text into HTML lines.
///
/// Applies the phase-text heuristics: break before inline numbered
/// markers, bold activity headers, strip markdown heading markers, turn
/// bullets into glyphs, and map emphasis spans to strong/em.
fn format_phase(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let broken = PHASE_NUMBER_REGEX.replace_all(&unified, "\n$1");

    let mut out = String::new();
    for line in broken.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if PHASE_ACTIVITY_REGEX.is_match(trimmed) {
            out.push_str(&format!(
                "<p class=\"activity\"><strong>{}</strong></p>\n",
                inline_markup(trimmed)
            ));
        } else if let Some(m) = PHASE_MD_HEADING_REGEX.find(trimmed) {
            out.push_str(&format!(
                "<p class=\"heading\"><strong>{}</strong></p>\n",
                inline_markup(&trimmed[m.end()..])
            ));
        } else if let Some(m) = PHASE_BULLET_REGEX.find(trimmed) {
            out.push_str(&format!(
                "<p class=\"bullet\">\u{2022} {}</p>\n",
                inline_markup(&trimmed[m.end()..])
            ));
        } else {
            out.push_str(&format!("<p>{}</p>\n", inline_markup(trimmed)));
        }
    }

    out
}

/// Escape, then map `**` and `*` spans to strong/em tags.
fn inline_markup(line: &str) -> String {
    let escaped = escape_html(line);
    let bolded = PHASE_BOLD_REGEX.replace_all(&escaped, "<strong>$1</strong>");
    PHASE_ITALIC_REGEX
        .replace_all(&bolded, "<em>$1</em>")
        .into_owned()
}

/// Escape the HTML metacharacters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const PRINT_CSS: &str = r#"body { font-family: "Times New Roman", serif; font-size: 12pt; margin: 2cm; }
table { width: 100%; border-collapse: collapse; margin-bottom: 12px; }
th, td { border: 1px solid #444; padding: 6px 8px; text-align: left; vertical-align: top; }
.meta td { border: none; padding: 2px 8px; }
.label { font-weight: bold; }
.phases th { background: #f0f0f0; }
.activity { margin: 6px 0 2px 0; }
.bullet { margin: 2px 0 2px 12px; }
p { margin: 4px 0; }
.page-break { page-break-after: always; }
@media print { body { margin: 1cm; } }"#;
