//! Document assembly and the end-to-end processing pipeline.
//!
//! [`assemble`] turns per-page recognition output into an
//! [`ExtractionResult`]. [`Pipeline`] drives the injected collaborators
//! (rasterizer, recognizer) over a single document or a batch and never
//! fails: collaborator errors become failed results.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::GenericImageView;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{PermitError, Result};
use crate::formats::{self, SourceKind};
use crate::models::config::PermitConfig;
use crate::models::document::{Dimensions, DocumentMetadata, ExtractionResult};
use crate::ocr::{self, RawRecognition, Recognizer};
use crate::pdf::{PdfRasterizer, Rasterizer};
use crate::permit::PermitFieldExtractor;

/// Separator placed after every page's text.
const PAGE_SEPARATOR: &str = "\n\n";

/// Options for assembling a result from recognized pages.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Run field extraction over the document text.
    pub extract_fields: bool,

    /// Declared permit type, if the caller knows it.
    pub document_type: Option<String>,

    /// Kind of source the pages came from.
    pub source_kind: SourceKind,

    /// Pixel dimensions, for single-image sources.
    pub dimensions: Option<Dimensions>,
}

impl AssembleOptions {
    /// Options for the given source kind, with field extraction enabled.
    pub fn new(source_kind: SourceKind) -> Self {
        Self {
            extract_fields: true,
            document_type: None,
            source_kind,
            dimensions: None,
        }
    }

    pub fn with_extract_fields(mut self, extract_fields: bool) -> Self {
        self.extract_fields = extract_fields;
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Assemble an extraction result from per-page recognition output.
///
/// Pages are numbered from 1 in the order given. Uses the default field
/// extractor; see [`assemble_with`] for a custom one.
pub fn assemble(pages: &[Vec<RawRecognition>], options: &AssembleOptions) -> ExtractionResult {
    assemble_with(pages, options, &PermitFieldExtractor::default())
}

/// Assemble an extraction result using a specific field extractor.
pub fn assemble_with(
    pages: &[Vec<RawRecognition>],
    options: &AssembleOptions,
    extractor: &PermitFieldExtractor,
) -> ExtractionResult {
    let mut text = String::new();
    let mut lines = Vec::new();

    for (index, raw) in pages.iter().enumerate() {
        let page = ocr::normalize_page(raw, index as u32 + 1);
        text.push_str(&page.text);
        text.push_str(PAGE_SEPARATOR);
        lines.extend(page.lines);
    }

    let text = text.trim().to_string();
    let confidence = ocr::aggregate(&lines);

    let extracted_fields = if options.extract_fields {
        Some(
            extractor
                .extract(&text, options.document_type.as_deref())
                .unwrap_or_default(),
        )
    } else {
        None
    };

    debug!(
        "Assembled {} pages, {} lines, confidence {:.3}",
        pages.len(),
        lines.len(),
        confidence
    );

    ExtractionResult {
        success: true,
        text,
        lines,
        metadata: DocumentMetadata {
            pages: pages.len(),
            file_type: Some(options.source_kind),
            document_type: options.document_type.clone(),
            dimensions: options.dimensions,
        },
        extracted_fields,
        confidence,
        processing_time: 0.0,
        error: None,
    }
}

/// One document to process.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Original filename, used to classify the source by extension.
    pub filename: String,

    /// Declared content type, if the caller has one.
    pub content_type: Option<String>,

    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl DocumentInput {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a document from disk, keeping only the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, data))
    }
}

/// Per-document processing options.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Run field extraction.
    pub extract_fields: bool,

    /// Declared permit type.
    pub document_type: Option<String>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            extract_fields: true,
            document_type: None,
        }
    }
}

/// Outcome of one document within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub filename: String,
    pub result: ExtractionResult,
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<BatchEntry>,
    pub total: usize,
}

impl BatchReport {
    /// Number of documents processed successfully.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|e| e.result.success).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.total - self.succeeded()
    }
}

/// Processing pipeline over an injected recognizer and rasterizer.
pub struct Pipeline<R: Recognizer, P: Rasterizer = PdfRasterizer> {
    recognizer: Arc<R>,
    rasterizer: P,
    render_dpi: u32,
    extractor: PermitFieldExtractor,
}

impl<R: Recognizer> Pipeline<R, PdfRasterizer> {
    /// Create a pipeline with the lopdf rasterizer and default settings.
    pub fn new(recognizer: Arc<R>) -> Self {
        Self::from_config(recognizer, &PermitConfig::default())
    }

    /// Create a pipeline configured from a [`PermitConfig`].
    pub fn from_config(recognizer: Arc<R>, config: &PermitConfig) -> Self {
        Self {
            recognizer,
            rasterizer: PdfRasterizer::new().with_max_pages(config.pdf.max_pages),
            render_dpi: config.pdf.render_dpi,
            extractor: PermitFieldExtractor::new()
                .with_description_max_chars(config.extraction.description_max_chars),
        }
    }
}

impl<R: Recognizer, P: Rasterizer> Pipeline<R, P> {
    /// Replace the rasterizer.
    pub fn with_rasterizer<Q: Rasterizer>(self, rasterizer: Q) -> Pipeline<R, Q> {
        Pipeline {
            recognizer: self.recognizer,
            rasterizer,
            render_dpi: self.render_dpi,
            extractor: self.extractor,
        }
    }

    /// Set the PDF rendering resolution.
    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.render_dpi = dpi;
        self
    }

    /// Replace the field extractor.
    pub fn with_extractor(mut self, extractor: PermitFieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The shared recognizer handle.
    pub fn recognizer(&self) -> &Arc<R> {
        &self.recognizer
    }

    /// Process one document. Failures are reported in the result.
    pub fn process(&self, input: &DocumentInput, options: &ProcessOptions) -> ExtractionResult {
        let start = Instant::now();
        let kind = formats::classify(&input.filename, input.content_type.as_deref());

        match self.run(input, kind, options) {
            Ok(result) => {
                info!(
                    "Processed {} with {}: {} lines, confidence {:.3}",
                    input.filename,
                    self.recognizer.name(),
                    result.lines.len(),
                    result.confidence
                );
                result.with_processing_time(start.elapsed())
            }
            Err(e) => {
                error!("OCR processing error for {}: {}", input.filename, e);
                ExtractionResult::failure(e.to_string(), kind).with_processing_time(start.elapsed())
            }
        }
    }

    /// Process several documents independently, in order.
    pub fn process_batch(&self, inputs: &[DocumentInput], options: &ProcessOptions) -> BatchReport {
        let results: Vec<BatchEntry> = inputs
            .iter()
            .map(|input| BatchEntry {
                filename: input.filename.clone(),
                result: self.process(input, options),
            })
            .collect();

        let report = BatchReport {
            total: results.len(),
            results,
        };
        if report.failed() > 0 {
            warn!("Batch finished with {} of {} documents failed", report.failed(), report.total);
        }
        report
    }

    fn run(
        &self,
        input: &DocumentInput,
        kind: Option<SourceKind>,
        options: &ProcessOptions,
    ) -> Result<ExtractionResult> {
        let kind = kind.ok_or_else(|| PermitError::UnsupportedFormat(input.filename.clone()))?;

        let mut assemble_options = AssembleOptions::new(kind).with_extract_fields(options.extract_fields);
        assemble_options.document_type = options.document_type.clone();

        let pages = match kind {
            SourceKind::Pdf => {
                let images = self.rasterizer.rasterize(&input.data, self.render_dpi)?;
                debug!("Rasterized {} pages at {} DPI", images.len(), self.render_dpi);
                images
                    .iter()
                    .map(|image| self.recognizer.recognize(image))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            SourceKind::Image => {
                let image = image::load_from_memory(&input.data)?;
                let (width, height) = image.dimensions();
                assemble_options = assemble_options.with_dimensions(Dimensions { width, height });
                vec![self.recognizer.recognize(&image)?]
            }
        };

        Ok(assemble_with(&pages, &assemble_options, &self.extractor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use crate::permit::PermitField;
    use image::{DynamicImage, ImageFormat};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    /// Recognizer that returns one line per image, or fails on images of a given width.
    struct WidthRecognizer {
        fail_width: Option<u32>,
    }

    impl Recognizer for WidthRecognizer {
        fn name(&self) -> &str {
            "width"
        }

        fn recognize(&self, image: &DynamicImage) -> std::result::Result<Vec<RawRecognition>, OcrError> {
            if Some(image.width()) == self.fail_width {
                return Err(OcrError::Recognition("engine crashed".to_string()));
            }
            Ok(vec![RawRecognition::from_rect(
                0.0,
                0.0,
                10.0,
                5.0,
                format!("Page width {}", image.width()),
                0.9,
            )])
        }
    }

    /// Rasterizer that yields blank pages of increasing width.
    struct BlankRasterizer {
        pages: u32,
    }

    impl Rasterizer for BlankRasterizer {
        fn rasterize(&self, _data: &[u8], _dpi: u32) -> crate::pdf::Result<Vec<DynamicImage>> {
            if self.pages == 0 {
                return Err(PdfError::NoPages);
            }
            Ok((1..=self.pages).map(|w| DynamicImage::new_rgb8(w, 1)).collect())
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn pipeline(fail_width: Option<u32>, pages: u32) -> Pipeline<WidthRecognizer, BlankRasterizer> {
        Pipeline::new(Arc::new(WidthRecognizer { fail_width })).with_rasterizer(BlankRasterizer { pages })
    }

    #[test]
    fn test_assemble_joins_pages_with_blank_line() {
        let pages = vec![
            vec![RawRecognition::from_rect(0.0, 0.0, 5.0, 5.0, "Hello", 0.8)],
            vec![RawRecognition::from_rect(0.0, 0.0, 5.0, 5.0, "World", 1.0)],
        ];
        let result = assemble(&pages, &AssembleOptions::new(SourceKind::Pdf).with_extract_fields(false));

        assert!(result.success);
        assert_eq!(result.text, "Hello\n\nWorld");
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].page, 1);
        assert_eq!(result.lines[1].page, 2);
        assert!((result.confidence - 0.9).abs() < 1e-6);
        assert_eq!(result.metadata.pages, 2);
        assert_eq!(result.extracted_fields, None);
    }

    #[test]
    fn test_assemble_without_lines() {
        let result = assemble(&[vec![]], &AssembleOptions::new(SourceKind::Image));

        assert!(result.success);
        assert_eq!(result.text, "");
        assert!(result.lines.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.extracted_fields, Some(Default::default()));
    }

    #[test]
    fn test_assemble_extracts_fields_with_declared_type() {
        let pages = vec![vec![
            RawRecognition::from_rect(0.0, 0.0, 50.0, 10.0, "Owner: Jane Doe", 0.95),
            RawRecognition::from_rect(0.0, 12.0, 50.0, 22.0, "APN: 77-100", 0.9),
        ]];
        let options = AssembleOptions::new(SourceKind::Pdf).with_document_type("electrical");
        let result = assemble(&pages, &options);

        // Lines on one page are joined by spaces, so the owner capture runs on
        assert_eq!(result.text, "Owner: Jane Doe APN: 77-100");
        assert_eq!(result.field(PermitField::OwnerName), Some("Jane Doe APN: 77-100"));
        assert_eq!(result.field(PermitField::ParcelNumber), Some("77-100"));
        assert_eq!(result.field(PermitField::PermitType), Some("electrical"));
        assert_eq!(result.metadata.document_type.as_deref(), Some("electrical"));
    }

    #[test]
    fn test_process_image_records_dimensions() {
        let input = DocumentInput::new("scan.png", png(7, 3));
        let result = pipeline(None, 1).process(&input, &ProcessOptions::default());

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.text, "Page width 7");
        assert_eq!(result.metadata.pages, 1);
        assert_eq!(result.metadata.file_type, Some(SourceKind::Image));
        assert_eq!(result.metadata.dimensions, Some(Dimensions { width: 7, height: 3 }));
        assert!(result.processing_time >= 0.0);
    }

    #[test]
    fn test_process_pdf_pages_in_order() {
        let input = DocumentInput::new("permit.pdf", b"%PDF".to_vec());
        let result = pipeline(None, 2).process(&input, &ProcessOptions::default());

        assert!(result.success);
        assert_eq!(result.text, "Page width 1\n\nPage width 2");
        assert_eq!(result.metadata.pages, 2);
        assert_eq!(result.metadata.dimensions, None);
    }

    #[test]
    fn test_content_type_wins_over_extension() {
        let input = DocumentInput::new("upload.bin", b"%PDF".to_vec()).with_content_type("application/pdf");
        let result = pipeline(None, 1).process(&input, &ProcessOptions::default());
        assert_eq!(result.metadata.file_type, Some(SourceKind::Pdf));
        assert!(result.success);
    }

    #[test]
    fn test_rasterizer_failure_becomes_failed_result() {
        let input = DocumentInput::new("empty.pdf", Vec::new());
        let result = pipeline(None, 0).process(&input, &ProcessOptions::default());

        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.metadata.file_type, Some(SourceKind::Pdf));
    }

    #[test]
    fn test_unsupported_format() {
        let input = DocumentInput::new("notes.txt", b"hello".to_vec());
        let result = pipeline(None, 1).process(&input, &ProcessOptions::default());

        assert!(!result.success);
        assert_eq!(result.metadata.file_type, None);
        assert!(result.error.unwrap().contains("notes.txt"));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let inputs = vec![
            DocumentInput::new("a.png", png(1, 1)),
            DocumentInput::new("b.png", png(2, 1)),
            DocumentInput::new("c.png", png(3, 1)),
        ];
        let report = pipeline(Some(2), 1).process_batch(&inputs, &ProcessOptions::default());

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);

        let names: Vec<&str> = report.results.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert!(report.results[0].result.success);
        assert!(!report.results[1].result.success);
        assert!(report.results[1].result.error.as_deref().unwrap().contains("engine crashed"));
        assert!(report.results[2].result.success);
    }

    #[test]
    fn test_shared_recognizer_handle() {
        let recognizer = Arc::new(WidthRecognizer { fail_width: None });
        let first = Pipeline::new(Arc::clone(&recognizer));
        let second = Pipeline::new(Arc::clone(&recognizer));
        assert!(Arc::ptr_eq(first.recognizer(), second.recognizer()));
        assert_eq!(second.recognizer().name(), "width");
    }
}
