//! Cascade evaluation: turns document text into a sparse permit field map.

use tracing::{debug, trace};

use crate::models::document::FieldMap;

use super::rules::{CaptureMode, FieldRule, FIELD_RULES, LABEL_LINE, PERMIT_TYPE_KEYWORDS};
use super::PermitField;

/// Default length limit for project descriptions, in characters.
pub const DEFAULT_DESCRIPTION_MAX_CHARS: usize = 500;

/// Appended to descriptions that were cut at the length limit.
const ELLIPSIS: &str = "...";

/// Permit field extractor over the built-in cascades.
#[derive(Debug, Clone)]
pub struct PermitFieldExtractor {
    description_max_chars: usize,
}

impl PermitFieldExtractor {
    /// Create an extractor with the default description limit.
    pub fn new() -> Self {
        Self {
            description_max_chars: DEFAULT_DESCRIPTION_MAX_CHARS,
        }
    }

    /// Set the description length limit.
    pub fn with_description_max_chars(mut self, max_chars: usize) -> Self {
        self.description_max_chars = max_chars;
        self
    }

    /// Extract every field that matches.
    ///
    /// A declared permit type is used verbatim; otherwise the type is inferred
    /// from keywords. Returns `None` when no field matched at all.
    pub fn extract(&self, text: &str, declared_type: Option<&str>) -> Option<FieldMap> {
        let mut fields = FieldMap::new();

        for rule in FIELD_RULES.iter() {
            if let Some(value) = self.apply_rule(rule, text) {
                fields.insert(rule.field, value);
            }
        }

        let permit_type = declared_type
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| infer_permit_type(text).map(str::to_string));
        if let Some(permit_type) = permit_type {
            fields.insert(PermitField::PermitType, permit_type);
        }

        debug!("Extracted {} permit fields from {} chars", fields.len(), text.len());

        if fields.is_empty() { None } else { Some(fields) }
    }

    /// Run one cascade; the first matching pattern wins.
    fn apply_rule(&self, rule: &FieldRule, text: &str) -> Option<String> {
        for (index, pattern) in rule.patterns.iter().enumerate() {
            let Some(capture) = pattern.captures(text).and_then(|caps| caps.get(1)) else {
                continue;
            };

            let value = match rule.mode {
                CaptureMode::Single => capture.as_str().trim().to_string(),
                CaptureMode::Paragraph => {
                    let end = extend_paragraph(text, capture.end());
                    truncate_chars(text[capture.start()..end].trim(), self.description_max_chars)
                }
            };

            trace!("{} matched pattern {}", rule.field, index);
            return Some(value);
        }

        None
    }
}

impl Default for PermitFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract permit fields with the default settings.
pub fn extract_fields(text: &str, declared_type: Option<&str>) -> Option<FieldMap> {
    PermitFieldExtractor::new().extract(text, declared_type)
}

/// Infer the permit type from the first keyword present in the text.
pub fn infer_permit_type(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    PERMIT_TYPE_KEYWORDS
        .into_iter()
        .find(|keyword| lower.contains(keyword))
}

/// Extend a capture ending at `end` over following non-empty lines that do
/// not start a new `Label:` entry. Returns the new end offset.
fn extend_paragraph(text: &str, mut end: usize) -> usize {
    while let Some(after) = text[end..].strip_prefix('\n') {
        let line = after.split('\n').next().unwrap_or_default();
        if line.is_empty() || LABEL_LINE.is_match(line) {
            break;
        }
        end += 1 + line.len();
    }
    end
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &value[..cut], ELLIPSIS),
        None => value.to_string(),
    }
}
