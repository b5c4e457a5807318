//! Supported input formats and source-kind classification.

use serde::{Deserialize, Serialize};

/// How a document is turned into page images before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Rasterized page by page.
    Pdf,
    /// Decoded and recognized as a single page.
    Image,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supported file format, for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub description: &'static str,
}

/// Every format the pipeline accepts.
pub const SUPPORTED_FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor { extension: ".pdf", mime_type: "application/pdf", description: "PDF documents" },
    FormatDescriptor { extension: ".jpg", mime_type: "image/jpeg", description: "JPEG images" },
    FormatDescriptor { extension: ".jpeg", mime_type: "image/jpeg", description: "JPEG images" },
    FormatDescriptor { extension: ".png", mime_type: "image/png", description: "PNG images" },
    FormatDescriptor { extension: ".tiff", mime_type: "image/tiff", description: "TIFF images" },
    FormatDescriptor { extension: ".tif", mime_type: "image/tiff", description: "TIFF images" },
    FormatDescriptor { extension: ".bmp", mime_type: "image/bmp", description: "BMP images" },
];

/// Classify a document by its declared content type and file extension.
///
/// A `.pdf` name or `application/pdf` type is always a PDF. Otherwise any
/// `image/*` type, or a supported image extension, is an image. Returns
/// `None` for anything else.
pub fn classify(filename: &str, content_type: Option<&str>) -> Option<SourceKind> {
    let content_type = content_type.map(|c| c.trim().to_ascii_lowercase());
    let lower = filename.to_ascii_lowercase();

    if content_type.as_deref() == Some("application/pdf") || lower.ends_with(".pdf") {
        return Some(SourceKind::Pdf);
    }

    if content_type.is_some_and(|c| c.starts_with("image/")) {
        return Some(SourceKind::Image);
    }

    SUPPORTED_FORMATS
        .iter()
        .any(|f| lower.ends_with(f.extension))
        .then_some(SourceKind::Image)
}

/// Whether a path looks like something the pipeline accepts.
pub fn is_supported(filename: &str) -> bool {
    classify(filename, None).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify("permit.PDF", None), Some(SourceKind::Pdf));
        assert_eq!(classify("scan.jpeg", None), Some(SourceKind::Image));
        assert_eq!(classify("scan.TIF", None), Some(SourceKind::Image));
        assert_eq!(classify("notes.txt", None), None);
        assert_eq!(classify("pdf", None), None);
    }

    #[test]
    fn test_content_type_wins() {
        assert_eq!(classify("upload.bin", Some("application/pdf")), Some(SourceKind::Pdf));
        assert_eq!(classify("upload", Some("image/png")), Some(SourceKind::Image));
        assert_eq!(classify("scan.png", Some("application/octet-stream")), Some(SourceKind::Image));
        assert_eq!(classify("upload", Some("image/x-tiff")), Some(SourceKind::Image));
    }

    #[test]
    fn test_pdf_extension_beats_image_content_type() {
        assert_eq!(classify("permit.pdf", Some("image/png")), Some(SourceKind::Pdf));
        assert_eq!(classify("upload.bin", Some("text/plain")), None);
    }

    #[test]
    fn test_supported_formats_list() {
        assert_eq!(SUPPORTED_FORMATS.len(), 7);
        assert!(SUPPORTED_FORMATS.iter().all(|f| f.extension.starts_with('.')));
        assert!(is_supported("a.bmp"));
        assert!(!is_supported("a.gif"));
    }
}
