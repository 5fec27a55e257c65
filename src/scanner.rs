/*!
 * Directory traversal, candidate selection and content collection
 */

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{CodepackError, Result, ResultExt};
use crate::language::is_code_file;
use crate::reader::ContentReader;
use crate::types::{ReadOutcome, ScanResult};

/// A file selected for reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path used for I/O
    pub abs_path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub rel_path: String,
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Set once the user asks to stop
    interrupted: Arc<AtomicBool>,
    /// Resolved location of this run's output, excluded from the scan
    output_path: Option<PathBuf>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        let output_path = config.output_file.as_deref().and_then(resolve_output_path);

        Self {
            config,
            progress,
            interrupted: Arc::new(AtomicBool::new(false)),
            output_path,
        }
    }

    /// Share a stop flag with a signal handler
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    fn check_interrupt(&self) -> Result<()> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(CodepackError::Interrupted);
        }
        Ok(())
    }

    /// Check if an entry should be ignored by name or relative path
    pub fn should_ignore(&self, name: &str, rel_path: &str) -> bool {
        self.config.ignore_rules.matches(name, rel_path)
    }

    fn is_output_file(&self, path: &Path) -> bool {
        let Some(output) = &self.output_path else {
            return false;
        };
        if path.file_name() != output.file_name() {
            return false;
        }
        fs::canonicalize(path).map_or(false, |p| &p == output)
    }

    /// Enumerate code files under the target directory, sorted by relative path
    ///
    /// Ignored directories are pruned without descending, so a file is kept
    /// only if neither it nor any directory between the root and it matches
    /// an ignore rule.
    pub fn collect(&self) -> Result<Vec<Candidate>> {
        let root = fs::canonicalize(&self.config.target_dir).with_context(|| {
            format!("Cannot resolve {}", self.config.target_dir.display())
        })?;
        let mut visited = HashSet::from([root.clone()]);
        let mut pending = vec![(root, String::new())];
        let mut candidates = Vec::new();

        while let Some((dir, rel_dir)) = pending.pop() {
            self.check_interrupt()?;

            let entries = WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .follow_links(true);

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                        continue;
                    }
                };

                let name = entry.file_name().to_string_lossy().to_string();
                let rel_path = if rel_dir.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", rel_dir, name)
                };

                if self.should_ignore(&name, &rel_path) {
                    debug!(path = %rel_path, "ignored");
                    continue;
                }

                let file_type = entry.file_type();
                if file_type.is_dir() && entry.path_is_symlink() {
                    debug!(path = %rel_path, "not following directory symlink");
                } else if file_type.is_dir() {
                    match fs::canonicalize(entry.path()) {
                        Ok(real) => {
                            if visited.contains(&real) {
                                debug!(path = %rel_path, target = %real.display(), "directory already visited");
                            } else {
                                visited.insert(real);
                                pending.push((entry.path().to_path_buf(), rel_path));
                            }
                        }
                        Err(e) => warn!("Cannot resolve directory {}: {}", rel_path, e),
                    }
                } else if file_type.is_file()
                    && is_code_file(entry.path(), &self.config.extensions)
                    && !self.is_output_file(entry.path())
                {
                    candidates.push(Candidate {
                        abs_path: entry.path().to_path_buf(),
                        rel_path,
                    });
                }
            }
        }

        candidates.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        candidates.dedup_by(|a, b| a.rel_path == b.rel_path);
        Ok(candidates)
    }

    /// List candidates with their size on disk, without reading content
    pub fn list(&self) -> Result<Vec<(String, u64)>> {
        let candidates = self.collect()?;
        Ok(candidates
            .into_iter()
            .map(|c| {
                let size = fs::metadata(&c.abs_path).map(|m| m.len()).unwrap_or(0);
                (c.rel_path, size)
            })
            .collect())
    }

    /// Scan the target directory and read every candidate
    pub fn scan(&self) -> Result<ScanResult> {
        info!("Scanning codebase in: {}", self.config.target_dir.display());

        let candidates = self.collect()?;
        if candidates.is_empty() {
            return Err(self.no_files(0, 0));
        }
        info!("Found {} code files", candidates.len());

        self.read_candidates(&candidates)
    }

    /// Read collected candidates into a scan result
    ///
    /// A candidate that fails to read is logged and counted, never fatal.
    pub fn read_candidates(&self, candidates: &[Candidate]) -> Result<ScanResult> {
        self.progress.set_length(candidates.len() as u64);
        let reader = ContentReader::new(self.config.max_size);
        let mut records = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();
        let mut dropped = 0;

        for candidate in candidates {
            self.check_interrupt()?;
            self.progress.inc(1);
            self.progress
                .set_message(format!("Current file: {}", display_name(&candidate.rel_path)));

            match reader.read(&candidate.abs_path, &candidate.rel_path) {
                Ok(ReadOutcome::Record(record)) => records.push(record),
                Ok(ReadOutcome::Skipped(entry)) => skipped.push(entry),
                Err(e) => {
                    warn!("Error processing {}: {}", candidate.rel_path, e);
                    dropped += 1;
                }
            }
        }

        let result = ScanResult::new(records, skipped, dropped);
        if result.is_empty() {
            return Err(self.no_files(result.skipped().len(), dropped));
        }

        info!(
            "Processed {} files, {} characters",
            result.file_count(),
            result.total_size()
        );
        Ok(result)
    }

    fn no_files(&self, skipped: usize, dropped: usize) -> CodepackError {
        CodepackError::NoFilesFound {
            root: self.config.target_dir.display().to_string(),
            skipped,
            dropped,
        }
    }
}

/// Absolute form of the output path, usable before the file exists
fn resolve_output_path(path: &Path) -> Option<PathBuf> {
    if let Ok(real) = fs::canonicalize(path) {
        return Some(real);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(fs::canonicalize(parent).ok()?.join(path.file_name()?))
}

// Truncate if too long to avoid display issues
fn display_name(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() > 40 {
        let tail: String = chars[chars.len() - 37..].iter().collect();
        format!("...{}", tail)
    } else {
        path.to_string()
    }
}
