//! Permit field extraction from recognized document text.

mod extractor;
mod fields;
pub mod rules;

pub use extractor::{extract_fields, infer_permit_type, PermitFieldExtractor, DEFAULT_DESCRIPTION_MAX_CHARS};
pub use fields::PermitField;
pub use rules::{CaptureMode, FieldRule, FIELD_RULES, PERMIT_TYPE_KEYWORDS};
