//! Pure Rust recognizer using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{RawRecognition, Recognizer};

/// Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Loading the models is expensive; build one engine per process and share it.
/// Calls are serialized through a lock around the underlying session.
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path, models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing model file {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            config,
        })
    }

    fn clean_text(&self, text: &str) -> String {
        if self.config.keep_unk {
            text.to_string()
        } else {
            text.replace("[UNK]", " ")
        }
    }
}

impl Recognizer for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawRecognition>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("empty image {}x{}", width, height)));
        }

        debug!("Recognizing image: {}x{}", width, height);

        let engine = self
            .engine
            .lock()
            .map_err(|_| OcrError::Recognition("engine lock poisoned".to_string()))?;
        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let recognitions: Vec<RawRecognition> = results
            .iter()
            .filter(|r| r.confidence as f32 >= self.config.min_line_confidence)
            .map(|r| RawRecognition {
                quad: polygon_to_quad(&r.bounding_box),
                text: self.clean_text(&r.text),
                confidence: (r.confidence as f32).clamp(0.0, 1.0),
            })
            .collect();

        debug!(
            "Recognized {} of {} regions in {}ms",
            recognitions.len(),
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(recognitions)
    }
}

/// Convert a `Polygon<f64>` into four `[x, y]` corners.
///
/// Takes the first four exterior points; missing points stay at the origin.
fn polygon_to_quad(polygon: &pure_onnx_ocr::Polygon<f64>) -> [[f32; 2]; 4] {
    let mut quad = [[0.0f32; 2]; 4];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        quad[i] = [coord.x as f32, coord.y as f32];
    }
    quad
}
