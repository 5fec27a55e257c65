/*!
 * Size-gated file reading with an ordered decode chain
 */

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::language::detect_language;
use crate::types::{FileRecord, ReadOutcome, SkipEntry};

/// Default per-file ceiling: 1 MiB
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024;

/// Bytes inspected by the binary heuristic
const SAMPLE_SIZE: usize = 8192;

/// Text encodings tried while decoding file content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
    Windows1252,
    Iso8859_1,
}

/// Order in which encodings are attempted
pub const DECODE_CHAIN: [Encoding; 4] = [
    Encoding::Utf8,
    Encoding::Latin1,
    Encoding::Windows1252,
    Encoding::Iso8859_1,
];

/// cp1252 replacements for 0x80..=0x9F; `None` marks undefined bytes
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl Encoding {
    /// Name used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
            Encoding::Windows1252 => "cp1252",
            Encoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decode `bytes`, or `None` if they are not valid text in this encoding
    ///
    /// Valid UTF-8 is always text. The single-byte fallbacks accept almost any
    /// input, so they refuse content that looks binary.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        if *self != Encoding::Utf8 && looks_binary(bytes) {
            return None;
        }

        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Encoding::Latin1 | Encoding::Iso8859_1 => {
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
            Encoding::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
                    _ => Some(char::from(b)),
                })
                .collect(),
        }
    }
}

/// Heuristic for binary data: too many control bytes in the leading sample
pub fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }

    // Count control characters (0x00-0x08, 0x0E-0x1F)
    let binary_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    let binary_ratio = binary_count as f32 / sample.len() as f32;

    binary_ratio >= 0.1
}

/// Placeholder content for files no encoding could decode
pub fn binary_placeholder(file_name: &str) -> String {
    format!("[Binary file - could not decode: {}]", file_name)
}

/// Decode bytes through [`DECODE_CHAIN`], returning the winning encoding
pub fn decode(bytes: &[u8]) -> Option<(Encoding, String)> {
    DECODE_CHAIN
        .iter()
        .find_map(|enc| enc.decode(bytes).map(|text| (*enc, text)))
}

/// Reads candidate files into records
#[derive(Debug, Clone, Copy)]
pub struct ContentReader {
    max_size: u64,
}

impl Default for ContentReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl ContentReader {
    /// Create a reader with the given per-file byte ceiling
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// Read `abs_path`, reporting it under `rel_path`
    ///
    /// Files larger than the ceiling are never opened and come back as
    /// [`ReadOutcome::Skipped`] with their size on disk.
    pub fn read(&self, abs_path: &Path, rel_path: &str) -> Result<ReadOutcome> {
        let raw_size = fs::metadata(abs_path)?.len();
        if raw_size > self.max_size {
            debug!(path = rel_path, raw_size, "file exceeds size ceiling");
            return Ok(ReadOutcome::Skipped(SkipEntry {
                path: rel_path.to_string(),
                raw_size,
            }));
        }

        let bytes = fs::read(abs_path)?;
        let content = match decode(&bytes) {
            Some((Encoding::Utf8, text)) => text,
            Some((encoding, text)) => {
                debug!(path = rel_path, encoding = encoding.name(), "decoded with fallback");
                text
            }
            None => {
                warn!(path = rel_path, "could not decode file, treating as binary");
                let file_name = abs_path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                binary_placeholder(&file_name)
            }
        };

        Ok(ReadOutcome::Record(FileRecord::new(
            rel_path,
            detect_language(abs_path),
            content,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_utf8_first() {
        let (enc, text) = decode("fn main() { println!(\"héllo\"); }".as_bytes()).unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert!(text.contains("héllo"));
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in latin-1
        let bytes = b"name = 'caf\xe9'\n";
        let (enc, text) = decode(bytes).unwrap();
        assert_eq!(enc, Encoding::Latin1);
        assert_eq!(text, "name = 'café'\n");
    }

    #[test]
    fn test_cp1252_table() {
        let text = Encoding::Windows1252.decode(b"\x93quoted\x94 \x80").unwrap();
        assert_eq!(text, "\u{201C}quoted\u{201D} \u{20AC}");
        assert!(Encoding::Windows1252.decode(b"bad \x81 byte").is_none());
    }

    #[test]
    fn test_binary_exhausts_chain() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        assert!(looks_binary(&bytes));
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn test_valid_utf8_with_escape_bytes_is_text() {
        // Terminal color codes: one ESC byte per short line
        let script = "R=\x1b[31m\nG=\x1b[32m\nB=\x1b[1m\nN=\x1b[0m\n";
        assert!(looks_binary(script.as_bytes()));

        let (enc, text) = decode(script.as_bytes()).unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert_eq!(text, script);
    }

    #[test]
    fn test_empty_is_text() {
        let (enc, text) = decode(b"").unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert!(text.is_empty());
    }

    #[test]
    fn test_read_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.py");
        File::create(&path).unwrap().write_all(b"x=1").unwrap();

        let outcome = ContentReader::default().read(&path, "a.py").unwrap();
        match outcome {
            ReadOutcome::Record(record) => {
                assert_eq!(record.path(), "a.py");
                assert_eq!(record.language(), "python");
                assert_eq!(record.size(), 3);
                assert_eq!(record.content(), "x=1");
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn test_read_skips_large_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.js");
        File::create(&path).unwrap().write_all(&[b'a'; 100]).unwrap();

        let outcome = ContentReader::new(99).read(&path, "big.js").unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::Skipped(SkipEntry {
                path: "big.js".to_string(),
                raw_size: 100,
            })
        );

        // Exactly at the ceiling is still read
        let outcome = ContentReader::new(100).read(&path, "big.js").unwrap();
        assert!(matches!(outcome, ReadOutcome::Record(_)));
    }

    #[test]
    fn test_read_binary_placeholder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.rs");
        let mut bytes = vec![0u8; 64];
        bytes.push(0xFF);
        File::create(&path).unwrap().write_all(&bytes).unwrap();

        match ContentReader::default().read(&path, "blob.rs").unwrap() {
            ReadOutcome::Record(record) => {
                assert_eq!(record.content(), "[Binary file - could not decode: blob.rs]");
                assert_eq!(record.language(), "rust");
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn test_read_colored_shell_script() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("color.sh");
        let script = "R=\x1b[31m\nG=\x1b[32m\nB=\x1b[1m\nN=\x1b[0m\n";
        assert!(looks_binary(script.as_bytes()));
        File::create(&path)
            .unwrap()
            .write_all(script.as_bytes())
            .unwrap();

        match ContentReader::default().read(&path, "color.sh").unwrap() {
            ReadOutcome::Record(record) => {
                assert_eq!(record.content(), script);
                assert_eq!(record.language(), "bash");
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn test_read_missing_file_errors() {
        let dir = tempdir().unwrap();
        assert!(ContentReader::default()
            .read(&dir.path().join("gone.py"), "gone.py")
            .is_err());
    }
}
