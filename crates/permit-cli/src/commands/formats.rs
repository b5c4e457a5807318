//! Formats command - list accepted input formats.

use console::style;

use permit_core::SUPPORTED_FORMATS;

pub fn run() -> anyhow::Result<()> {
    println!("{}", style("Supported formats:").bold());

    for format in SUPPORTED_FORMATS {
        println!(
            "  {:<6} {:<18} {}",
            format.extension,
            format.mime_type,
            style(format.description).dim()
        );
    }

    Ok(())
}
