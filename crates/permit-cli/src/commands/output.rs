//! Rendering of extraction results.

use permit_core::{ExtractionResult, PermitField};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

/// Column names shared by per-document CSV output and the batch summary.
pub fn field_columns() -> impl Iterator<Item = &'static str> {
    PermitField::ALL.into_iter().map(|f| f.as_str())
}

/// Field values in [`field_columns`] order, empty where nothing was extracted.
pub fn field_values(result: &ExtractionResult) -> Vec<String> {
    PermitField::ALL
        .into_iter()
        .map(|f| result.field(f).unwrap_or_default().to_string())
        .collect()
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = field_columns().collect();
    header.extend(["confidence", "pages"]);
    wtr.write_record(&header)?;

    let mut row = field_values(result);
    row.push(format!("{:.4}", result.confidence));
    row.push(result.metadata.pages.to_string());
    wtr.write_record(&row)?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    if let Some(error) = &result.error {
        output.push_str(&format!("Error: {}\n", error));
        return output;
    }

    if let Some(kind) = result.metadata.file_type {
        output.push_str(&format!("File type: {}\n", kind));
    }
    output.push_str(&format!("Pages: {}\n", result.metadata.pages));
    output.push_str(&format!("Confidence: {:.1}%\n", result.confidence * 100.0));
    output.push_str(&format!("Processing time: {:.2}s\n", result.processing_time));

    match &result.extracted_fields {
        Some(fields) if !fields.is_empty() => {
            output.push_str("\nPermit fields:\n");
            for (field, value) in fields {
                output.push_str(&format!("  {}: {}\n", field, value.replace('\n', " ")));
            }
        }
        Some(_) => output.push_str("\nPermit fields: none found\n"),
        None => {}
    }

    output.push_str("\nText:\n");
    output.push_str(&result.text);
    output.push('\n');

    output
}
