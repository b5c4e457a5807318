//! WASM bindings for permit field extraction.
//!
//! Recognition runs elsewhere (e.g. a browser OCR library); these bindings
//! take its output or plain text and return the same structures as the
//! native pipeline.

use wasm_bindgen::prelude::*;

use permit_core::{
    assemble_with, AssembleOptions, PermitFieldExtractor, RawRecognition, SourceKind,
    SUPPORTED_FORMATS,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract permit fields from document text.
///
/// Returns an object keyed by field name, or `null` when nothing matched.
#[wasm_bindgen]
pub fn extract_fields_from_text(text: &str, document_type: Option<String>) -> Result<JsValue, JsValue> {
    let fields = permit_core::extract_fields(text, document_type.as_deref());
    to_js(&fields)
}

/// List supported input formats as `{extension, mime_type, description}` objects.
#[wasm_bindgen]
pub fn supported_formats() -> Result<JsValue, JsValue> {
    to_js(&SUPPORTED_FORMATS)
}

/// Field extractor with configurable settings.
#[wasm_bindgen]
pub struct FieldExtractor {
    extractor: PermitFieldExtractor,
}

#[wasm_bindgen]
impl FieldExtractor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: PermitFieldExtractor::new(),
        }
    }

    /// Set the project description length limit, in characters.
    #[wasm_bindgen]
    pub fn set_description_max_chars(&mut self, max_chars: usize) {
        self.extractor = PermitFieldExtractor::new().with_description_max_chars(max_chars);
    }

    /// Extract fields from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, document_type: Option<String>) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text, document_type.as_deref()))
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects recognition output from browser-side OCR, page by page.
#[wasm_bindgen]
pub struct RecognitionBuilder {
    pages: Vec<Vec<RawRecognition>>,
}

#[wasm_bindgen]
impl RecognitionBuilder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Start a new page. Lines added afterwards belong to it.
    #[wasm_bindgen]
    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    /// Add a line to the current page, starting the first page if needed.
    ///
    /// Corners are given clockwise from the top-left.
    #[wasm_bindgen]
    pub fn add_line(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let quad = [[x1, y1], [x2, y2], [x3, y3], [x4, y4]];
        if let Some(page) = self.pages.last_mut() {
            page.push(RawRecognition::new(quad, text, confidence));
        }
    }

    /// Number of pages collected so far.
    #[wasm_bindgen]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Assemble the collected pages into an extraction result.
    #[wasm_bindgen]
    pub fn assemble(
        &self,
        is_pdf: bool,
        extract_fields: bool,
        document_type: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let kind = if is_pdf { SourceKind::Pdf } else { SourceKind::Image };
        let mut options = AssembleOptions::new(kind).with_extract_fields(extract_fields);
        options.document_type = document_type;

        let result = assemble_with(&self.pages, &options, &PermitFieldExtractor::new());
        to_js(&result)
    }

    /// Assembled result as a JSON string.
    #[wasm_bindgen]
    pub fn to_json(&self, is_pdf: bool) -> Result<String, JsValue> {
        let kind = if is_pdf { SourceKind::Pdf } else { SourceKind::Image };
        let result = assemble_with(&self.pages, &AssembleOptions::new(kind), &PermitFieldExtractor::new());
        serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for RecognitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_builder_starts_first_page() {
        let mut builder = RecognitionBuilder::new();
        builder.add_line("Owner: Jane", 0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0, 0.9);
        assert_eq!(builder.page_count(), 1);

        builder.add_page();
        builder.add_line("APN: 1-2", 0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0, 0.7);
        assert_eq!(builder.page_count(), 2);
    }

    #[wasm_bindgen_test]
    fn test_builder_json() {
        let mut builder = RecognitionBuilder::new();
        builder.add_line("Hello", 0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0, 1.0);
        builder.add_page();
        builder.add_line("World", 0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0, 1.0);

        let json: serde_json::Value = serde_json::from_str(&builder.to_json(true).unwrap()).unwrap();
        assert_eq!(json["text"], "Hello\n\nWorld");
        assert_eq!(json["metadata"]["pages"], 2);
    }

    #[wasm_bindgen_test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
