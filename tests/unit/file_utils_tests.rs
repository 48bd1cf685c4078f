/*!
 * Tests for file utilities
 */

use std::path::PathBuf;

use lessonforge::file_utils::FileManager;

use crate::common;

#[test]
fn test_generateOutputPath_withSubjectAndLevel_shouldBuildSlugName() {
    let path = FileManager::generate_output_path("/tmp/notes", "Our World Our People", "Basic 2", "docx");
    assert_eq!(
        path,
        PathBuf::from("/tmp/notes/our-world-our-people-basic-2.docx")
    );
}

#[test]
fn test_generateOutputPath_withDottedExtension_shouldNotDoubleDot() {
    let path = FileManager::generate_output_path("/tmp", "Science", "B4", ".html");
    assert_eq!(path, PathBuf::from("/tmp/science-b4.html"));
}

#[test]
fn test_writeToFile_thenRead_shouldRoundTrip() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("note.txt");

    FileManager::write_to_file(&path, "lesson content").unwrap();
    assert_eq!(FileManager::read_to_string(&path).unwrap(), "lesson content");
}

#[test]
fn test_writeBytes_withNestedDir_shouldCreateParents() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("a").join("b").join("note.docx");

    FileManager::write_bytes(&path, b"PK").unwrap();
    assert!(FileManager::file_exists(&path));
}

#[test]
fn test_writeToFile_overExisting_shouldReplaceContent() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("note.txt");

    FileManager::write_to_file(&path, "first").unwrap();
    FileManager::write_to_file(&path, "second").unwrap();
    assert_eq!(FileManager::read_to_string(&path).unwrap(), "second");
}

#[test]
fn test_findFiles_withMixedExtensions_shouldFilter() {
    let dir = common::create_temp_dir().unwrap();
    let base = dir.path().to_path_buf();
    common::create_test_file(&base, "one.docx", "x").unwrap();
    common::create_test_file(&base, "two.html", "x").unwrap();
    common::create_test_file(&base, "three.DOCX", "x").unwrap();

    let found = FileManager::find_files(&base, "docx").unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn test_ensureDir_withMissingPath_shouldCreateIt() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("x").join("y");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(FileManager::dir_exists(&nested));
}
