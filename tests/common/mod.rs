/*!
 * Common test utilities for the lessonforge test suite
 */

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;

use lessonforge::generation::LessonRequest;
use lessonforge::render::NoteMetadata;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A representative lesson request used across suites
pub fn sample_request() -> LessonRequest {
    LessonRequest {
        subject: "Science".to_string(),
        level: "Basic 4".to_string(),
        strand: "Diversity of Matter".to_string(),
        sub_strand: "Materials".to_string(),
        content_standard: "B4.1.1.1".to_string(),
        template_name: "GES Standard".to_string(),
        lesson_count: 1,
        extra_instructions: None,
    }
}

/// Matching metadata for the sample request
pub fn sample_metadata() -> NoteMetadata {
    NoteMetadata {
        subject: "Science".to_string(),
        level: "Basic 4".to_string(),
        strand: "Diversity of Matter".to_string(),
        sub_strand: "Materials".to_string(),
        content_standard: "B4.1.1.1".to_string(),
        template_name: "GES Standard".to_string(),
    }
}

/// A lesson note body exercising every line classification
pub fn sample_note_text() -> String {
    [
        "# Lesson Note",
        "**Indicator:** B4.1.1.1",
        "",
        "Activity 1: Warm-up discussion",
        "- Ask learners about sources of water",
        "* Collect answers on the board",
        "",
        "| Phase | Activity |",
        "|---|---|",
        "| Starter | Water sources chat |",
        "| Reflection | Exit ticket |",
        "",
        "Closing remarks with *emphasis* and **weight**.",
    ]
    .join("\n")
}
