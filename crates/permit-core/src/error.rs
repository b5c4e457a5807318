//! Error types for the permit-core library.

use thiserror::Error;

/// Main error type for the permit library.
#[derive(Error, Debug)]
pub enum PermitError {
    /// PDF rasterization error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR recognition error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is neither a PDF nor a supported image.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF rasterization.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract a page image from the PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to OCR recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the permit library.
pub type Result<T> = std::result::Result<T, PermitError>;
