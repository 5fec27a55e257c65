/*!
 * Core types and data structures for codepack
 */

use serde::Serialize;

/// One scanned code file with its decoded content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    path: String,
    language: String,
    size: usize,
    content: String,
}

impl FileRecord {
    /// Build a record; `size` is the character count of `content`
    pub fn new(path: impl Into<String>, language: impl Into<String>, content: String) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            size: content.chars().count(),
            content,
        }
    }

    /// Path relative to the scan root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Language tag derived from the file name
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Number of characters in the decoded content
    pub fn size(&self) -> usize {
        self.size
    }

    /// Decoded content
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A candidate left out because it exceeded the size ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEntry {
    /// Path relative to the scan root
    pub path: String,
    /// Size on disk in bytes
    pub raw_size: u64,
}

/// Result of reading a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Content was read and decoded
    Record(FileRecord),
    /// File was too large and never opened
    Skipped(SkipEntry),
}

/// Everything produced by one scan pass
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    records: Vec<FileRecord>,
    skipped: Vec<SkipEntry>,
    dropped: usize,
}

impl ScanResult {
    /// Assemble a result, sorting records and skip entries by path
    pub fn new(mut records: Vec<FileRecord>, mut skipped: Vec<SkipEntry>, dropped: usize) -> Self {
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records.dedup_by(|a, b| a.path == b.path);
        skipped.sort_by(|a, b| a.path.cmp(&b.path));

        Self {
            records,
            skipped,
            dropped,
        }
    }

    /// Records in ascending path order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Files left out because of the size ceiling
    pub fn skipped(&self) -> &[SkipEntry] {
        &self.skipped
    }

    /// Candidates dropped because of a read error
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of records
    pub fn file_count(&self) -> usize {
        self.records.len()
    }

    /// Sum of decoded characters over all records
    pub fn total_size(&self) -> usize {
        self.records.iter().map(|r| r.size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
