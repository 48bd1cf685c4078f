/*!
 * The lesson-content-to-document rendering pipeline.
 *
 * Free-form AI prose goes in; structured documents come out:
 *
 * - `normalize`: split jumbled inline lists into logical lines
 * - `markdown`: tokenize one line into bold/italic/plain runs
 * - `docx`: assemble paragraphs and tables into a `.docx` blob
 * - `html`: assemble the fixed lesson-page schema into printable HTML
 */

pub mod docx;
pub mod html;
pub mod markdown;
pub mod normalize;

// Re-export main types for easier usage
pub use docx::{assemble, DocxBlock, DocxDocument, NoteMetadata};
pub use html::{render_lesson, render_printable, LessonPage};
pub use markdown::{parse_line, TextToken};
pub use normalize::split_logical_lines;
