//! Configuration structures for the permit OCR pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PermitError;

/// Main configuration for the permit pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermitConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF rasterization configuration.
    pub pdf: PdfConfig,

    /// Permit field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens emitted by the recognizer instead of replacing them with spaces.
    pub keep_unk: bool,

    /// Lines recognized below this confidence (0.0 - 1.0) are dropped by the engine.
    pub min_line_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            min_line_confidence: 0.0,
        }
    }
}

/// PDF rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rasterizing PDF pages before recognition.
    pub render_dpi: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 0,
        }
    }
}

/// Permit field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run field extraction after recognition.
    pub extract_fields: bool,

    /// Longest project description kept before truncation.
    pub description_max_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extract_fields: true,
            description_max_chars: crate::permit::DEFAULT_DESCRIPTION_MAX_CHARS,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl PermitConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, PermitError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| PermitError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), PermitError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| PermitError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PermitConfig::default();
        assert_eq!(config.pdf.render_dpi, 300);
        assert_eq!(config.extraction.description_max_chars, 500);
        assert!(config.extraction.extract_fields);
        assert_eq!(config.models.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PermitConfig = serde_json::from_str(r#"{"pdf": {"render_dpi": 150}}"#).unwrap();
        assert_eq!(config.pdf.render_dpi, 150);
        assert_eq!(config.pdf.max_pages, 0);
        assert_eq!(config.models.recognition_model, "latin_rec.onnx");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PermitConfig::default();
        config.extraction.extract_fields = false;
        config.save(&path).unwrap();

        let loaded = PermitConfig::from_file(&path).unwrap();
        assert!(!loaded.extraction.extract_fields);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(PermitConfig::from_file(&path), Err(PermitError::Config(_))));
    }
}
