/*!
 * Reporting functionality for codepack
 *
 * Renders run summaries as console tables using the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{ScanResult, SkipEntry};
use crate::utils::format_file_size;

/// Per-file line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Path relative to the scan root
    pub path: String,
    /// Language tag
    pub language: String,
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

/// Statistics for a finished run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Where the document went
    pub output: String,
    /// Archive written next to the output, if any
    pub archive: Option<String>,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Number of files processed
    pub files_processed: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file
    pub file_details: Vec<FileReportInfo>,
    /// Files left out because of the size ceiling
    pub skipped: Vec<SkipEntry>,
    /// Files dropped because they could not be read
    pub dropped: usize,
}

impl ScanReport {
    /// Collect report data from a scan result
    pub fn from_result(result: &ScanResult, output: String, duration: Duration) -> Self {
        let file_details = result
            .records()
            .iter()
            .map(|r| FileReportInfo {
                path: r.path().to_string(),
                language: r.language().to_string(),
                lines: r.content().lines().count(),
                chars: r.size(),
            })
            .collect();

        Self {
            output,
            archive: None,
            duration,
            files_processed: result.file_count(),
            total_chars: result.total_size(),
            file_details,
            skipped: result.skipped().to_vec(),
            dropped: result.dropped(),
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for scan results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string based on scan statistics
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stderr, keeping stdout free for the document
    pub fn print_report(&self, report: &ScanReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    // Keep the tail of long paths, where the file name is
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in path.split('/').rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn style(table: &mut Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output".to_string(),
                value: report.output.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Processed".to_string(),
                value: self.format_number(report.files_processed),
            },
            SummaryRow {
                key: "📊 Total Characters".to_string(),
                value: self.format_number(report.total_chars),
            },
            SummaryRow {
                key: "📦 LLM Tokens".to_string(),
                value: format!(
                    "{} tokens (estimated)",
                    self.format_number(report.total_chars / 4)
                ),
            },
        ];

        if !report.skipped.is_empty() {
            rows.push(SummaryRow {
                key: "⏭️ Skipped (too large)".to_string(),
                value: report.skipped.len().to_string(),
            });
        }

        if report.dropped > 0 {
            rows.push(SummaryRow {
                key: "⚠️ Unreadable".to_string(),
                value: report.dropped.to_string(),
            });
        }

        if let Some(archive) = &report.archive {
            rows.push(SummaryRow {
                key: "🗜️ Zip Archive".to_string(),
                value: archive.clone(),
            });
        }

        Self::style(&mut Table::new(rows))
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Language")]
            language: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        // Largest files first
        let mut files: Vec<&FileReportInfo> = report.file_details.iter().collect();
        files.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.path.cmp(&b.path)));

        let files_to_show = if files.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|info| FileRow {
                path: self.format_path(&info.path, 60),
                language: info.language.clone(),
                lines: self.format_number(info.lines),
                tokens: self.format_number(info.chars / 4),
            })
            .collect();

        Self::style(&mut Table::new(rows))
    }

    fn create_skipped_table(&self, skipped: &[SkipEntry]) -> String {
        #[derive(Tabled)]
        struct SkipRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Size")]
            size: String,
        }

        let rows: Vec<SkipRow> = skipped
            .iter()
            .map(|entry| SkipRow {
                path: self.format_path(&entry.path, 60),
                size: format_file_size(entry.raw_size),
            })
            .collect();

        Self::style(&mut Table::new(rows))
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &ScanReport) -> String {
        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  PROCESSED FILES"
        };

        let mut out = format!("{}\n{}\n", files_title, self.create_files_table(report));

        if !report.skipped.is_empty() {
            out.push_str(&format!(
                "\n⏭️  SKIPPED LARGE FILES\n{}\n",
                self.create_skipped_table(&report.skipped)
            ));
        }

        out.push_str(&format!(
            "\n✅  COMPRESSION COMPLETE\n{}",
            self.create_summary_table(report)
        ));
        out
    }
}
