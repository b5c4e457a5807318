//! Batch processing command for multiple permit files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, warn};

use permit_core::{formats, BatchEntry, BatchReport, DocumentInput, ExtractionResult, ProcessOptions};

use super::output::{field_columns, field_values, format_result, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Declared permit type applied to every file
    #[arg(short = 't', long)]
    document_type: Option<String>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Batch report as written to `batch_report.json`.
#[derive(Serialize)]
struct BatchManifest<'a> {
    generated_at: String,
    total: usize,
    succeeded: usize,
    failed: usize,
    results: &'a [BatchEntry],
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| formats::is_supported(&p.to_string_lossy()))
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

    let mut inputs = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for path in &files {
        match DocumentInput::from_path(path) {
            Ok(input) => inputs.push(input),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                unreadable.push(BatchEntry {
                    filename: path.display().to_string(),
                    result: ExtractionResult::failure(e.to_string(), None),
                });
            }
        }
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading OCR models...");

    let pipeline = super::build_pipeline(&config, args.model_dir.as_deref())?;
    let options = ProcessOptions {
        extract_fields: config.extraction.extract_fields,
        document_type: args.document_type.clone(),
    };

    pb.set_message(format!("Processing {} files...", inputs.len()));
    let mut report =
        tokio::task::spawn_blocking(move || pipeline.process_batch(&inputs, &options)).await?;
    report.total += unreadable.len();
    report.results.extend(unreadable);
    pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        write_outputs(output_dir, &report, args.format)?;
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.total,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(report.succeeded()).green(),
        style(report.failed()).red()
    );

    let failed: Vec<&BatchEntry> = report.results.iter().filter(|e| !e.result.success).collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for entry in failed {
            println!(
                "  - {}: {}",
                entry.filename,
                entry.result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_outputs(output_dir: &Path, report: &BatchReport, format: OutputFormat) -> anyhow::Result<()> {
    for entry in report.results.iter().filter(|e| e.result.success) {
        let stem = Path::new(&entry.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("permit");
        let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

        fs::write(&output_path, format_result(&entry.result, format)?)?;
        debug!("Wrote output to {}", output_path.display());
    }

    let manifest = BatchManifest {
        generated_at: Utc::now().to_rfc3339(),
        total: report.total,
        succeeded: report.succeeded(),
        failed: report.failed(),
        results: &report.results,
    };
    fs::write(
        output_dir.join("batch_report.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    Ok(())
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(field_columns());
    header.extend(["confidence", "processing_time", "error"]);
    wtr.write_record(&header)?;

    for entry in &report.results {
        let result = &entry.result;
        let status = if result.success { "success" } else { "error" };

        let mut row = vec![entry.filename.clone(), status.to_string()];
        row.extend(field_values(result));
        row.push(format!("{:.4}", result.confidence));
        row.push(format!("{:.3}", result.processing_time));
        row.push(result.error.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
