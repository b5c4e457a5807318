//! Per-page normalization of raw recognitions into structured lines.

use tracing::trace;

use crate::models::document::{BoundingBox, RecognizedLine};

use super::RawRecognition;

/// Text and lines of one normalized page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    /// Line texts joined by single spaces, trailing whitespace trimmed.
    pub text: String,

    /// Lines in recognition order.
    pub lines: Vec<RecognizedLine>,
}

/// Normalize one page of recognizer output.
///
/// Text is kept exactly as recognized; each line contributes its text plus
/// one space to the page text. An empty input is a page with no text.
pub fn normalize_page(raw: &[RawRecognition], page: u32) -> PageText {
    if raw.is_empty() {
        trace!("Page {} has no recognized text", page);
        return PageText::default();
    }

    let mut text = String::new();
    let mut lines = Vec::with_capacity(raw.len());

    for recognition in raw {
        text.push_str(&recognition.text);
        text.push(' ');

        let bbox = BoundingBox::from_quad(&recognition.quad);
        if bbox.is_degenerate() {
            trace!("Degenerate box {:?} on page {} for {:?}", bbox, page, recognition.text);
        }

        lines.push(RecognizedLine {
            text: recognition.text.clone(),
            confidence: recognition.confidence,
            bbox,
            page,
        });
    }

    text.truncate(text.trim_end().len());

    trace!("Normalized page {}: {} lines, {} chars", page, lines.len(), text.len());

    PageText { text, lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_page() {
        let page = normalize_page(&[], 3);
        assert_eq!(page, PageText::default());
    }

    #[test]
    fn test_lines_joined_with_spaces() {
        let raw = vec![
            RawRecognition::from_rect(0.0, 0.0, 100.0, 20.0, "Permit No:", 0.98),
            RawRecognition::from_rect(110.0, 0.0, 200.0, 20.0, "B-2024-001", 0.91),
        ];

        let page = normalize_page(&raw, 2);

        assert_eq!(page.text, "Permit No: B-2024-001");
        assert_eq!(page.lines.len(), 2);
        assert_eq!(page.lines[1].text, "B-2024-001");
        assert_eq!(page.lines[1].page, 2);
        assert_eq!(page.lines[1].bbox, BoundingBox { x1: 110, y1: 0, x2: 200, y2: 20 });
    }

    #[test]
    fn test_text_not_trimmed_per_line() {
        let raw = vec![
            RawRecognition::from_rect(0.0, 0.0, 1.0, 1.0, " padded ", 0.5),
            RawRecognition::from_rect(0.0, 0.0, 1.0, 1.0, "tail  ", 0.5),
        ];

        let page = normalize_page(&raw, 1);

        assert_eq!(page.lines[0].text, " padded ");
        assert_eq!(page.text, " padded  tail");
    }

    #[test]
    fn test_degenerate_quad_tolerated() {
        let raw = vec![RawRecognition::new(
            [[30.0, 30.0], [0.0, 0.0], [5.0, 5.0], [0.0, 0.0]],
            "x",
            0.2,
        )];

        let page = normalize_page(&raw, 1);

        assert_eq!(page.lines[0].bbox, BoundingBox { x1: 30, y1: 30, x2: 5, y2: 5 });
        assert!(page.lines[0].bbox.is_degenerate());
        assert_eq!(page.text, "x");
    }
}
