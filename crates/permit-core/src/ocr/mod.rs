//! Recognition capability and per-page line normalization.

mod confidence;
mod normalize;
#[cfg(feature = "native")]
mod pure_engine;

pub use confidence::aggregate;
pub use normalize::{normalize_page, PageText};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// One detected text region as produced by a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecognition {
    /// Quadrilateral corners as `[x, y]`, top-left first and bottom-right third.
    pub quad: [[f32; 2]; 4],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl RawRecognition {
    pub fn new(quad: [[f32; 2]; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Build a recognition from an axis-aligned rectangle.
    pub fn from_rect(x1: f32, y1: f32, x2: f32, y2: f32, text: impl Into<String>, confidence: f32) -> Self {
        Self::new([[x1, y1], [x2, y1], [x2, y2], [x1, y2]], text, confidence)
    }
}

/// An OCR capability: turns one page image into recognized text regions.
///
/// Implementations are long-lived handles, created once and shared across
/// documents. A page with no text yields an empty vector, not an error.
pub trait Recognizer: Send + Sync {
    /// Short engine identifier.
    fn name(&self) -> &str;

    /// Recognize all text regions on one page, in reading order.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawRecognition>, OcrError>;
}

impl<R: Recognizer + ?Sized> Recognizer for std::sync::Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawRecognition>, OcrError> {
        (**self).recognize(image)
    }
}
