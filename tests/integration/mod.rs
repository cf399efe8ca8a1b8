// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory tree holding documents to scan
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a document with given content, parent directories included
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        self.create_bytes(relative_path, content.as_bytes())
    }

    /// Create a file with raw bytes, for malformed input
    pub fn create_bytes<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write a queries file, one query per line
    pub fn create_queries_file(&self, queries: &[&str]) -> PathBuf {
        let path = self.root_path.join("queries.list");
        fs::write(&path, queries.join("\n")).expect("Failed to write queries file");
        path
    }

    /// Path for a stats file inside the fixture
    pub fn stats_path(&self) -> PathBuf {
        self.root_path.join("scan_stats.json")
    }

    /// Parsed stats file
    pub fn read_stats(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.stats_path()).expect("Failed to read stats file");
        serde_json::from_str(&content).expect("Stats file should be valid JSON")
    }
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_lines(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines\nActual:\n{}",
            context,
            expected_lines.len(),
            actual_lines.len(),
            actual
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }
}
