/*!
 * Prompt templates for lesson note generation.
 *
 * The system prompt pins the model to the role of a Ghanaian basic-school
 * teacher and the curriculum taxonomy; the user prompt carries the
 * specifics of the requested notes.
 */

use serde::{Deserialize, Serialize};

/// A request for one or more lesson notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRequest {
    /// Subject name, e.g. "Science"
    pub subject: String,
    /// Level / class, e.g. "Basic 4"
    pub level: String,
    /// Curriculum strand
    pub strand: String,
    /// Curriculum sub-strand
    pub sub_strand: String,
    /// Content standard identifier, e.g. "B4.1.1.1"
    pub content_standard: String,
    /// Name of the note template to follow
    pub template_name: String,
    /// Number of lessons to generate
    pub lesson_count: u32,
    /// Extra instructions from the teacher, appended verbatim
    #[serde(default)]
    pub extra_instructions: Option<String>,
}

impl LessonRequest {
    /// A lesson count of zero still means one note
    pub fn effective_lesson_count(&self) -> u32 {
        self.lesson_count.max(1)
    }
}

/// System prompt template with `{placeholder}` substitution.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template against a lesson request.
    pub fn render(&self, request: &LessonRequest) -> String {
        self.template
            .replace("{subject}", &request.subject)
            .replace("{level}", &request.level)
            .replace("{strand}", &request.strand)
            .replace("{sub_strand}", &request.sub_strand)
            .replace("{content_standard}", &request.content_standard)
            .replace("{template_name}", &request.template_name)
            .replace(
                "{lesson_count}",
                &request.effective_lesson_count().to_string(),
            )
    }
}

/// Builder for the user prompt of a generation request.
#[derive(Debug, Clone)]
pub struct LessonPromptBuilder {
    request: LessonRequest,
}

impl LessonPromptBuilder {
    /// Create a builder for the given request.
    pub fn new(request: LessonRequest) -> Self {
        Self { request }
    }

    /// Build the user prompt text.
    pub fn build(&self) -> String {
        let mut prompt = format!(
            "Write {count} complete lesson note(s).\n\
             Subject: {subject}\n\
             Class: {level}\n\
             Strand: {strand}\n\
             Sub-strand: {sub_strand}\n\
             Content standard: {standard}\n\
             Template: {template}\n",
            count = self.request.effective_lesson_count(),
            subject = self.request.subject,
            level = self.request.level,
            strand = self.request.strand,
            sub_strand = self.request.sub_strand,
            standard = self.request.content_standard,
            template = self.request.template_name,
        );

        prompt.push_str(
            "Each note must include: performance indicator, teaching resources, \
             starter activity, new learning activities numbered 1. 2. 3., \
             differentiation as Tier 1 / Tier 2 / Tier 3, and a reflection phase. \
             Use **bold** for headings and | pipes | for any tables.\n",
        );

        if let Some(extra) = &self.request.extra_instructions {
            if !extra.trim().is_empty() {
                prompt.push_str("Additional instructions: ");
                prompt.push_str(extra);
                prompt.push('\n');
            }
        }

        prompt
    }
}
