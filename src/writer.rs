/*!
 * Output formats and document writing for codepack
 */

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use clap::ValueEnum;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use strum::{Display, EnumIter, EnumProperty, EnumString};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::types::{FileRecord, ScanResult};

/// Serialization format of the output document
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    EnumProperty,
    ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Headings and fenced code blocks
    #[default]
    #[strum(props(extension = "md"))]
    Markdown,
    /// Pretty-printed array of file records
    #[strum(props(extension = "json"))]
    Json,
    /// Banner-delimited plain text
    #[strum(props(extension = "txt"))]
    Plain,
    /// XML document with system information
    #[strum(props(extension = "xml"))]
    Xml,
}

impl OutputFormat {
    /// File extension for documents in this format
    pub fn extension(&self) -> &'static str {
        self.get_str("extension").unwrap_or("txt")
    }

    /// Output file name used when none is given
    pub fn default_file_name(&self) -> String {
        format!("codebase_compressed.{}", self.extension())
    }

    /// Serialize a scan result into a document
    pub fn render(&self, result: &ScanResult) -> Result<String> {
        match self {
            Self::Markdown => Ok(render_markdown(result.records())),
            Self::Json => render_json(result.records()),
            Self::Plain => Ok(render_plain(result.records())),
            Self::Xml => render_xml(result.records()),
        }
    }
}

fn render_json(records: &[FileRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn render_markdown(records: &[FileRecord]) -> String {
    let mut out = String::new();
    out.push_str("# Codebase for Refactoring\n\n");
    let _ = write!(out, "**Total files:** {}\n\n", records.len());

    for record in records {
        let _ = write!(out, "## {}\n\n", record.path());
        let _ = write!(out, "**Size:** {} bytes  \n", record.size());
        let _ = write!(out, "**Language:** {}\n\n", record.language());
        let _ = writeln!(out, "```{}", record.language());
        out.push_str(record.content());
        out.push_str("\n```\n\n");
    }

    out
}

fn render_plain(records: &[FileRecord]) -> String {
    let mut out = String::new();
    let _ = write!(out, "=== CODEBASE ANALYSIS ({} files) ===\n\n", records.len());

    for record in records {
        let _ = writeln!(out, "=== FILE: {} ===", record.path());
        let _ = writeln!(out, "Language: {}", record.language());
        let _ = writeln!(out, "Size: {} bytes", record.size());
        out.push_str("Content:\n");
        out.push_str(record.content());
        out.push_str("\n\n");
    }

    out
}

/// Replace C0 control characters that XML 1.0 does not allow
fn xml_safe(text: &str) -> std::borrow::Cow<'_, str> {
    let invalid = |c: char| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r');
    if text.chars().any(invalid) {
        text.chars()
            .map(|c| if invalid(c) { '\u{FFFD}' } else { c })
            .collect::<String>()
            .into()
    } else {
        text.into()
    }
}

fn render_xml(records: &[FileRecord]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    // Write XML declaration
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut start_tag = BytesStart::new("codebase");
    let total = records.len().to_string();
    let timestamp = Local::now().to_rfc3339();
    start_tag.push_attribute(("total_files", total.as_str()));
    start_tag.push_attribute(("generated", timestamp.as_str()));
    writer.write_event(Event::Start(start_tag))?;

    write_system_info(&mut writer)?;

    for record in records {
        let size = record.size().to_string();
        let mut file_tag = BytesStart::new("file");
        let path = xml_safe(record.path());
        file_tag.push_attribute(("path", path.as_ref()));
        file_tag.push_attribute(("language", record.language()));
        file_tag.push_attribute(("size", size.as_str()));
        writer.write_event(Event::Start(file_tag))?;
        let content = xml_safe(record.content());
        writer.write_event(Event::Text(BytesText::new(&content)))?;
        writer.write_event(Event::End(BytesEnd::new("file")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("codebase")))?;

    let bytes = writer.into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write system information to XML
fn write_system_info<W: Write>(writer: &mut Writer<W>) -> io::Result<()> {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    writer.write_event(Event::Start(BytesStart::new("system_info")))?;
    for (tag, value) in [
        ("hostname", hostname.as_str()),
        ("os", std::env::consts::OS),
        ("family", std::env::consts::FAMILY),
    ] {
        writer.write_event(Event::Start(BytesStart::new(tag)))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("system_info")))?;

    Ok(())
}

/// Writes rendered documents to the configured sink
pub struct DocumentWriter {
    /// Writer configuration
    config: Config,
}

impl DocumentWriter {
    /// Create a new document writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render `result` and write it to the output file or stdout
    ///
    /// Returns the rendered document so it can be archived afterwards.
    pub fn write(&self, result: &ScanResult) -> Result<String> {
        let document = self.config.format.render(result)?;

        match &self.config.output_file {
            Some(path) => {
                write_atomic(path, document.as_bytes())?;
                info!("Saved to: {}", path.display());
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(document.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(document)
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory
///
/// The destination only ever holds a complete document.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn sample() -> ScanResult {
        ScanResult::new(
            vec![
                FileRecord::new("src/lib.rs", "rust", "pub fn naïve() {}".to_string()),
                FileRecord::new("a.py", "python", "x=1".to_string()),
            ],
            vec![],
            0,
        )
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Plain.extension(), "txt");
        assert_eq!(OutputFormat::Xml.default_file_name(), "codebase_compressed.xml");
    }

    #[test]
    fn test_plain_layout() {
        let doc = OutputFormat::Plain.render(&sample()).unwrap();
        let expected = "=== CODEBASE ANALYSIS (2 files) ===\n\n\
            === FILE: a.py ===\nLanguage: python\nSize: 3 bytes\nContent:\nx=1\n\n\
            === FILE: src/lib.rs ===\nLanguage: rust\nSize: 17 bytes\nContent:\npub fn naïve() {}\n\n";
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_markdown_layout() {
        let doc = OutputFormat::Markdown.render(&sample()).unwrap();
        assert!(doc.starts_with("# Codebase for Refactoring\n\n**Total files:** 2\n\n"));
        assert!(doc.contains(
            "## a.py\n\n**Size:** 3 bytes  \n**Language:** python\n\n```python\nx=1\n```\n\n"
        ));
        assert!(doc.find("## a.py").unwrap() < doc.find("## src/lib.rs").unwrap());
    }

    #[test]
    fn test_json_layout() {
        let doc = OutputFormat::Json.render(&sample()).unwrap();
        assert!(doc.contains("naïve"));
        assert!(doc.starts_with("[\n  {\n    \"path\": \"a.py\",\n    \"language\": \"python\",\n    \"size\": 3,\n    \"content\": \"x=1\"\n  },"));

        let parsed: serde_json::Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["path"], "src/lib.rs");
    }

    #[test]
    fn test_xml_escapes_content() {
        let result = ScanResult::new(
            vec![FileRecord::new("t.html", "html", "<b>&</b>".to_string())],
            vec![],
            0,
        );
        let doc = OutputFormat::Xml.render(&result).unwrap();
        assert!(doc.contains("total_files=\"1\""));
        assert!(doc.contains("<system_info>"));
        assert!(doc.contains("path=\"t.html\""));
        assert!(doc.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn test_xml_replaces_control_characters() {
        let result = ScanResult::new(
            vec![FileRecord::new(
                "esc.sh",
                "bash",
                "echo \u{1b}[31mred\u{1b}[0m\tok\r\n".to_string(),
            )],
            vec![],
            0,
        );
        let doc = OutputFormat::Xml.render(&result).unwrap();
        assert!(!doc.contains('\u{1b}'));
        assert!(doc.contains("echo \u{FFFD}[31mred\u{FFFD}[0m\tok"));

        let mut reader = quick_xml::Reader::from_str(&doc);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("Error parsing XML: {}", e),
            }
        }
    }

    #[test]
    fn test_every_format_lists_every_path() {
        let result = sample();
        for format in OutputFormat::iter() {
            let doc = format.render(&result).unwrap();
            for record in result.records() {
                assert!(doc.contains(record.path()), "{} missing {}", format, record.path());
            }
        }
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
