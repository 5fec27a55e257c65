/*!
 * Configuration handling for codepack
 */

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::ensure;
use crate::error::Result;
use crate::language::ExtensionSet;
use crate::patterns::IgnoreRules;
use crate::reader::DEFAULT_MAX_SIZE;
use crate::writer::OutputFormat;

/// Output path meaning standard output
pub const STDOUT_MARKER: &str = "-";

/// Command-line arguments for codepack
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "codepack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pack the code files of a directory into one document for LLM context",
    long_about = "Scans a directory tree for code files and writes their contents into a single markdown, JSON, plain text or XML document, ready to paste into an AI assistant."
)]
pub struct Args {
    /// Path to the codebase directory
    #[clap(default_value = ".")]
    pub path: String,

    /// Output file path ("-" for stdout); defaults to codebase_compressed.<ext>
    #[clap(short, long)]
    pub output: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,

    /// Additional ignore patterns (repeatable or comma-separated)
    #[clap(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Do not start from the built-in ignore patterns
    #[clap(long)]
    pub no_default_ignores: bool,

    /// Comma-separated list of file extensions to include (replaces defaults)
    #[clap(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Maximum file size in bytes
    #[clap(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: u64,

    /// Also create a zip file with the output
    #[clap(long)]
    pub zip: bool,

    /// Only list files that would be processed
    #[clap(long)]
    pub list_files: bool,

    /// Only log warnings and errors
    #[clap(short, long)]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory to scan
    pub target_dir: PathBuf,

    /// Output file path; `None` writes to stdout
    pub output_file: Option<PathBuf>,

    /// Output format
    pub format: OutputFormat,

    /// Ignore rules (defaults merged with user patterns)
    pub ignore_rules: IgnoreRules,

    /// Extensions accepted as code
    pub extensions: ExtensionSet,

    /// Per-file byte ceiling
    pub max_size: u64,

    /// Write a zip archive next to the output
    pub zip: bool,

    /// Only list candidate files
    pub list_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            output_file: None,
            format: OutputFormat::default(),
            ignore_rules: IgnoreRules::with_defaults(),
            extensions: ExtensionSet::default(),
            max_size: DEFAULT_MAX_SIZE,
            zip: false,
            list_only: false,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let mut ignore_rules = if args.no_default_ignores {
            IgnoreRules::new()
        } else {
            IgnoreRules::with_defaults()
        };
        ignore_rules.extend(args.ignore.iter().map(String::as_str));

        let extensions = match &args.extensions {
            Some(list) => ExtensionSet::from_list(list.iter().map(String::as_str)),
            None => ExtensionSet::default(),
        };

        let output_file = match args.output.as_deref() {
            Some(STDOUT_MARKER) => None,
            Some(path) => Some(PathBuf::from(path)),
            None if args.list_files => None,
            None => Some(PathBuf::from(args.format.default_file_name())),
        };

        Self {
            target_dir: PathBuf::from(args.path),
            output_file,
            format: args.format,
            ignore_rules,
            extensions,
            max_size: args.max_size,
            zip: args.zip,
            list_only: args.list_files,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.exists(),
            InvalidInput,
            "Path '{}' does not exist",
            self.target_dir.display()
        );
        ensure!(
            self.target_dir.is_dir(),
            InvalidInput,
            "Path '{}' is not a directory",
            self.target_dir.display()
        );
        ensure!(
            !self.extensions.is_empty(),
            Config,
            "Extension list is empty"
        );

        if let Some(output) = &self.output_file {
            if let Some(parent) = output.parent() {
                ensure!(
                    parent.as_os_str().is_empty() || parent.is_dir(),
                    Config,
                    "Output directory not found: {}",
                    parent.display()
                );
            }
        } else {
            ensure!(
                !self.zip || self.list_only,
                Config,
                "--zip needs an output file, not stdout"
            );
        }

        Ok(())
    }
}
