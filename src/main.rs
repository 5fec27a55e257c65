/*!
 * Command-line interface for codepack
 */

use std::io;
use std::process::ExitCode;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use codepack::archive::write_archive;
use codepack::config::{Args, Config};
use codepack::error::{CodepackError, Result};
use codepack::report::{ReportFormat, Reporter, ScanReport};
use codepack::scanner::Scanner;
use codepack::signal::{ensure_running, setup_signal_handler};
use codepack::utils::format_file_size;
use codepack::writer::DocumentWriter;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "codepack", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(args.quiet);

    match run(Config::from_args(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CodepackError::Interrupted) => {
            eprintln!("\n❌ Cancelled by user");
            ExitCode::from(CodepackError::Interrupted.exit_code() as u8)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(config: Config) -> Result<()> {
    // Validate configuration
    config.validate()?;
    debug!(
        "Ignore patterns: {}",
        config.ignore_rules.patterns().collect::<Vec<_>>().join(", ")
    );

    let interrupted = setup_signal_handler()?;

    if config.list_only {
        return list_files(config, interrupted);
    }

    // Create progress bar
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
            .map_err(|e| codepack::error!(Unexpected, "Invalid progress template: {}", e))?,
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📊 Processing");

    let scanner = Scanner::new(config.clone(), Arc::new(progress.clone()))
        .with_interrupt(Arc::clone(&interrupted));
    let writer = DocumentWriter::new(config.clone());

    // Start timing both scan and write operations
    let start_time = Instant::now();

    let scanned = scanner.scan();
    progress.finish_and_clear();
    let result = scanned?;

    for entry in result.skipped() {
        warn!(
            "Skipped large file {} ({})",
            entry.path,
            format_file_size(entry.raw_size)
        );
    }

    ensure_running(&interrupted, &[])?;

    let document = writer.write(&result)?;
    let written: Vec<&Path> = config.output_file.iter().map(|p| p.as_path()).collect();
    ensure_running(&interrupted, &written)?;

    let archive = match (&config.output_file, config.zip) {
        (Some(output), true) => {
            let path = write_archive(output, &document)?;
            ensure_running(&interrupted, &[output.as_path(), path.as_path()])?;
            info!("Created zip: {}", path.display());
            Some(path.display().to_string())
        }
        _ => None,
    };

    let output = config
        .output_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdout>".to_string());

    let mut report = ScanReport::from_result(&result, output, start_time.elapsed());
    report.archive = archive;
    Reporter::new(ReportFormat::ConsoleTable).print_report(&report);

    Ok(())
}

fn list_files(config: Config, interrupted: Arc<AtomicBool>) -> Result<()> {
    let scanner = Scanner::new(config, Arc::new(ProgressBar::hidden()))
        .with_interrupt(Arc::clone(&interrupted));
    let files = scanner.list()?;
    ensure_running(&interrupted, &[])?;

    println!("Found {} code files:", files.len());
    for (path, size) in files {
        println!("  {} ({})", path, format_file_size(size));
    }

    Ok(())
}
