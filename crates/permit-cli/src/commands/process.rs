//! Process command - extract permit fields from a single file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use permit_core::{formats, DocumentInput, ProcessOptions};

use super::output::{format_result, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Declared permit type (e.g. building, electrical)
    #[arg(short = 't', long)]
    document_type: Option<String>,

    /// Skip permit field extraction
    #[arg(long)]
    no_fields: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Show confidence and timing after the output
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let input = DocumentInput::from_path(&args.input)?;
    if !formats::is_supported(&input.filename) {
        anyhow::bail!("Unsupported file format: {}", input.filename);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading OCR models...");

    let pipeline = super::build_pipeline(&config, args.model_dir.as_deref())?;
    let options = ProcessOptions {
        extract_fields: config.extraction.extract_fields && !args.no_fields,
        document_type: args.document_type.clone(),
    };

    pb.set_message("Running OCR...");
    let result = tokio::task::spawn_blocking(move || pipeline.process(&input, &options)).await?;
    pb.finish_and_clear();

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} OCR confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence * 100.0
        );
        println!(
            "{} Processing time: {:.0}ms",
            style("ℹ").blue(),
            result.processing_time * 1000.0
        );
    }

    debug!("Total command time: {:?}", start.elapsed());

    if let Some(error) = &result.error {
        anyhow::bail!("Processing failed: {}", error);
    }

    Ok(())
}
