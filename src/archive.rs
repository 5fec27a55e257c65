/*!
 * Zip packaging of a finished output document
 */

use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::writer::write_atomic;

/// Archive path for an output file: same name, `.zip` extension
pub fn archive_path(output: &Path) -> PathBuf {
    output.with_extension("zip")
}

/// Store `document` as the single deflated entry of a zip next to `output`
pub fn write_archive(output: &Path, document: &str) -> Result<PathBuf> {
    let entry_name = output
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options)?;
    zip.write_all(document.as_bytes())?;
    let bytes = zip.finish()?.into_inner();

    let path = archive_path(output);
    write_atomic(&path, &bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    #[test]
    fn test_archive_path() {
        assert_eq!(
            archive_path(Path::new("out/codebase_compressed.md")),
            PathBuf::from("out/codebase_compressed.zip")
        );
        assert_eq!(archive_path(Path::new("dump")), PathBuf::from("dump.zip"));
    }

    #[test]
    fn test_single_entry_archive() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("codebase_compressed.txt");
        let document = "=== CODEBASE ANALYSIS (1 files) ===\n\n";

        let path = write_archive(&output, document).unwrap();
        assert_eq!(path, dir.path().join("codebase_compressed.zip"));

        let mut archive = ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "codebase_compressed.txt");
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        assert_eq!(text, document);
    }
}
