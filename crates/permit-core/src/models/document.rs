//! Document-level data model: recognized lines and the extraction result.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::formats::SourceKind;
use crate::permit::PermitField;

/// Extracted permit fields. Only fields that matched are present.
pub type FieldMap = BTreeMap<PermitField, String>;

/// Axis-aligned pixel box taken from two corners of the recognizer's quadrilateral.
///
/// The recognizer is expected to return the top-left corner first and the
/// bottom-right corner third. That ordering is not checked, so `x1 > x2` or
/// `y1 > y2` can occur and is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Build a box from corner 0 and corner 2 of a quadrilateral.
    pub fn from_quad(quad: &[[f32; 2]; 4]) -> Self {
        Self {
            x1: quad[0][0] as i32,
            y1: quad[0][1] as i32,
            x2: quad[2][0] as i32,
            y2: quad[2][1] as i32,
        }
    }

    /// Whether the box has zero or negative extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }
}

/// One recognized text region on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    /// Text as produced by recognition.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Pixel bounding box.
    pub bbox: BoundingBox,

    /// Page number (1-indexed).
    pub page: u32,
}

/// Pixel dimensions of a single-image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Document metadata reported alongside the text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Number of pages recognized.
    pub pages: usize,

    /// Source kind (pdf or image), when it could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<SourceKind>,

    /// Declared permit type, echoed back.
    pub document_type: Option<String>,

    /// Image dimensions, for image sources only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// False only when a collaborator (rasterizer, decoder, recognizer) failed.
    pub success: bool,

    /// Document text: page texts separated by a blank line.
    pub text: String,

    /// All lines, ordered by page then recognition order.
    pub lines: Vec<RecognizedLine>,

    /// Document metadata.
    pub metadata: DocumentMetadata,

    /// Extracted permit fields: `None` when extraction was not requested,
    /// an empty map when it was requested and nothing matched.
    pub extracted_fields: Option<FieldMap>,

    /// Unweighted mean of all line confidences.
    pub confidence: f64,

    /// Wall-clock processing time in seconds.
    pub processing_time: f64,

    /// Failure message, present only when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Create a failed result carrying the collaborator's message.
    pub fn failure(message: impl Into<String>, file_type: Option<SourceKind>) -> Self {
        Self {
            success: false,
            text: String::new(),
            lines: Vec::new(),
            metadata: DocumentMetadata {
                file_type,
                ..Default::default()
            },
            extracted_fields: None,
            confidence: 0.0,
            processing_time: 0.0,
            error: Some(message.into()),
        }
    }

    /// Set the processing time from an elapsed duration.
    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = elapsed.as_secs_f64();
        self
    }

    /// Look up a single extracted field.
    pub fn field(&self, field: PermitField) -> Option<&str> {
        self.extracted_fields
            .as_ref()
            .and_then(|fields| fields.get(&field))
            .map(String::as_str)
    }
}
