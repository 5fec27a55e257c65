/*!
 * codepack - Pack the code files of a directory tree into one document
 *
 * This library walks a directory, keeps the files that look like code,
 * decodes their content and serializes everything as markdown, JSON,
 * plain text or XML for use as context for Large Language Models.
 */

pub mod archive;
pub mod config;
pub mod error;
pub mod language;
pub mod patterns;
pub mod reader;
pub mod report;
pub mod scanner;
pub mod signal;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Args, Config};
pub use error::{CodepackError, Result};
pub use language::{detect_language, is_code_file, ExtensionSet};
pub use patterns::{IgnoreRules, DEFAULT_IGNORE};
pub use reader::ContentReader;
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use scanner::{Candidate, Scanner};
pub use types::{FileRecord, ReadOutcome, ScanResult, SkipEntry};
pub use utils::format_file_size;
pub use writer::{DocumentWriter, OutputFormat};
