//! Core library for permit document OCR processing.
//!
//! This crate provides:
//! - Line normalization of raw recognition output into structured lines
//! - Document-level confidence aggregation
//! - Permit field extraction (address, contractor, valuation, parcel, ...)
//! - A pipeline that drives an injected recognizer over PDFs and images

pub mod error;
pub mod formats;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod permit;
pub mod pipeline;

pub use error::{OcrError, PdfError, PermitError, Result};
pub use formats::{FormatDescriptor, SourceKind, SUPPORTED_FORMATS};
pub use models::config::PermitConfig;
pub use models::document::{
    BoundingBox, Dimensions, DocumentMetadata, ExtractionResult, FieldMap, RecognizedLine,
};
pub use ocr::{RawRecognition, Recognizer};
pub use pdf::{PdfRasterizer, Rasterizer};
pub use permit::{extract_fields, PermitField, PermitFieldExtractor};
pub use pipeline::{assemble, assemble_with, AssembleOptions, BatchEntry, BatchReport, DocumentInput, Pipeline, ProcessOptions};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
