//! PDF rasterization.

mod extractor;

pub use extractor::PdfRasterizer;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A rasterization capability: turns PDF bytes into one image per page, in page order.
pub trait Rasterizer: Send + Sync {
    /// Rasterize every page at the given resolution.
    fn rasterize(&self, data: &[u8], dpi: u32) -> Result<Vec<DynamicImage>>;
}
