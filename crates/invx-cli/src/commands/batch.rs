//! Batch processing command for multiple input files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use invx_core::{InvoiceRecord, TextInvoiceParser};

use super::output::{format_record, record_row, OutputFormat, RECORD_COLUMNS};
use super::{extract_record, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    record: Result<InvoiceRecord, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let format = OutputFormat::resolve(args.format, &config.output)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(TextInvoiceParser::from_config(&config.extraction)?);

    let mut tasks = stream::iter(files)
        .map(|path| {
            let parser = Arc::clone(&parser);
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let record = extract_record(&task_path, &parser).map_err(|e| format!("{:#}", e));
                FileOutcome {
                    path: task_path,
                    record,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                }
            });
            async move {
                handle.await.unwrap_or_else(|e| FileOutcome {
                    path,
                    record: Err(format!("Processing failed: {}", e)),
                    processing_time_ms: 0,
                })
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(outcome) = tasks.next().await {

        if let Err(e) = &outcome.record {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", outcome.path.display(), e);
            } else {
                error!("Failed to process {}: {}", outcome.path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", outcome.path.display(), e);
            }
        }

        overall_pb.inc(1);
        results.push(outcome);
    }

    overall_pb.finish_with_message("Complete");

    // Completion order is arbitrary
    results.sort_by(|a, b| a.path.cmp(&b.path));

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok(record) = &result.record {
                let output_path = output_path(output_dir, &result.path, format);
                fs::write(&output_path, format_record(record, format, config.output.pretty)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileOutcome> = results.iter().filter(|r| r.record.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(e) = &result.record {
                println!("  - {}: Processing failed ({})", result.path.display(), e);
            }
        }
    }

    Ok(())
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");

    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(RECORD_COLUMNS);
    header.extend(["warnings", "processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &result.record {
            Ok(record) => {
                row.push("success".to_string());
                row.extend(record_row(record));
                row.push(record.validate().len().to_string());
                row.push(result.processing_time_ms.to_string());
                row.push(String::new());
            }
            Err(e) => {
                row.push("error".to_string());
                row.extend(RECORD_COLUMNS.iter().map(|_| String::new()));
                row.push(String::new());
                row.push(result.processing_time_ms.to_string());
                row.push(e.clone());
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
