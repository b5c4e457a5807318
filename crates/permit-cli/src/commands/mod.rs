//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod formats;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use permit_core::{Pipeline, PermitConfig, PureOcrEngine};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("permit")
        .join("config.json")
}

/// Resolve the configuration file: the `--config` path if given, else the default.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<PermitConfig> {
    let path = config_path(explicit);

    if explicit.is_some() || path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(PermitConfig::from_file(&path)?)
    } else {
        Ok(PermitConfig::default())
    }
}

/// Load the recognizer and build a pipeline around it.
pub fn build_pipeline(
    config: &PermitConfig,
    model_dir: Option<&Path>,
) -> anyhow::Result<Pipeline<PureOcrEngine>> {
    let model_dir = model_dir.unwrap_or(&config.models.model_dir);

    let engine = PureOcrEngine::from_dir(model_dir, &config.models, config.ocr.clone()).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\nPlace the OCR models in {} or pass --model-dir.",
            e,
            model_dir.display()
        )
    })?;

    Ok(Pipeline::from_config(Arc::new(engine), config))
}
