//! Global error handling for codepack
//!
//! One error type covers every fatal condition of a run. Per-file problems
//! never surface here: the scanner absorbs them and only counts them.

use std::io;
use thiserror::Error;

/// Global error type for codepack operations
#[derive(Error, Debug)]
pub enum CodepackError {
    /// The root path does not exist or is not a directory
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The scan produced no file records
    #[error("No code files found in {root} ({skipped} skipped as too large, {dropped} unreadable)")]
    NoFilesFound {
        root: String,
        skipped: usize,
        dropped: usize,
    },

    /// The run was cancelled with Ctrl-C
    #[error("Cancelled by user")]
    Interrupted,

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Zip archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Moving the finished temporary output into place failed
    #[error("Failed to persist output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CodepackError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Specialized Result type for codepack operations
pub type Result<T> = std::result::Result<T, CodepackError>;

/// Creates a CodepackError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CodepackError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            CodepackError::Unexpected(format!("{}: {}", context, e))
        })
    }
}
