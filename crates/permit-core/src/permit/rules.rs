//! Pattern cascades for permit field extraction.
//!
//! Each field owns an ordered list of patterns. The first pattern that
//! matches decides the value; later patterns are never consulted. All
//! patterns are case-insensitive and capture the value in group 1.

use lazy_static::lazy_static;
use regex::Regex;

use super::PermitField;

/// How a matched capture becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Group 1, trimmed.
    Single,
    /// Group 1 plus continuation lines up to the next `Label:` line, trimmed and length-limited.
    Paragraph,
}

/// An ordered cascade of candidate patterns for one field.
#[derive(Debug)]
pub struct FieldRule {
    pub field: PermitField,
    pub patterns: Vec<Regex>,
    pub mode: CaptureMode,
}

impl FieldRule {
    fn new(field: PermitField, mode: CaptureMode, patterns: &[&str]) -> Self {
        Self {
            field,
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
            mode,
        }
    }
}

/// Keywords scanned, in order, to infer the permit type when none is declared.
pub const PERMIT_TYPE_KEYWORDS: [&str; 4] = ["building", "electrical", "plumbing", "mechanical"];

lazy_static! {
    // A line that opens a new `Label:` entry ends a paragraph capture
    pub static ref LABEL_LINE: Regex = Regex::new(r"^\w+:").unwrap();

    /// Cascades for every pattern-driven field, in evaluation order.
    pub static ref FIELD_RULES: Vec<FieldRule> = vec![
        FieldRule::new(PermitField::ProjectAddress, CaptureMode::Single, &[
            r"(?i)(?:project\s+)?address[:\s]+([^\n]+)",
            r"(?i)(?:site|property)\s+address[:\s]+([^\n]+)",
            r"(?i)location[:\s]+([^\n]+)",
            r"(?i)(\d+\s+[A-Za-z\s]+(?:street|st|avenue|ave|road|rd|lane|ln|drive|dr|court|ct|boulevard|blvd)[^\n]*)",
        ]),
        FieldRule::new(PermitField::ContractorName, CaptureMode::Single, &[
            r"(?i)contractor[:\s]+([^\n]+)",
            r"(?i)contractor\s+name[:\s]+([^\n]+)",
            r"(?i)licensed\s+contractor[:\s]+([^\n]+)",
        ]),
        FieldRule::new(PermitField::ContractorLicense, CaptureMode::Single, &[
            r"(?i)license\s*(?:#|number|no\.?)?[:\s]+([A-Z0-9\-]+)",
            r"(?i)contractor\s+license[:\s]+([A-Z0-9\-]+)",
            r"(?i)lic\.?\s*(?:#|no\.?)?[:\s]+([A-Z0-9\-]+)",
        ]),
        FieldRule::new(PermitField::Valuation, CaptureMode::Single, &[
            r"(?i)(?:project\s+)?(?:value|valuation|cost)[:\s]+\$?([0-9,]+(?:\.[0-9]{2})?)",
            r"(?i)estimated\s+(?:cost|value)[:\s]+\$?([0-9,]+(?:\.[0-9]{2})?)",
            r"(?i)total\s+(?:cost|value)[:\s]+\$?([0-9,]+(?:\.[0-9]{2})?)",
        ]),
        FieldRule::new(PermitField::SquareFootage, CaptureMode::Single, &[
            r"(?i)(?:square\s+feet|sq\.?\s*ft\.?|sf)[:\s]+([0-9,]+)",
            r"(?i)([0-9,]+)\s*(?:square\s+feet|sq\.?\s*ft\.?|sf)",
            r"(?i)area[:\s]+([0-9,]+)\s*(?:square\s+feet|sq\.?\s*ft\.?|sf)?",
        ]),
        FieldRule::new(PermitField::OwnerName, CaptureMode::Single, &[
            r"(?i)(?:property\s+)?owner[:\s]+([^\n]+)",
            r"(?i)owner\s+name[:\s]+([^\n]+)",
            r"(?i)applicant[:\s]+([^\n]+)",
        ]),
        FieldRule::new(PermitField::ParcelNumber, CaptureMode::Single, &[
            r"(?i)(?:parcel|apn|assessor's\s+parcel)\s*(?:#|number|no\.?)?[:\s]+([A-Z0-9\-]+)",
            r"(?i)apn[:\s]+([A-Z0-9\-]+)",
            r"(?i)parcel\s+id[:\s]+([A-Z0-9\-]+)",
        ]),
        FieldRule::new(PermitField::ProjectDescription, CaptureMode::Paragraph, &[
            r"(?i)(?:project\s+)?description[:\s]+([^\n]+)",
            r"(?i)scope\s+of\s+work[:\s]+([^\n]+)",
            r"(?i)work\s+description[:\s]+([^\n]+)",
        ]),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_pattern_field_has_a_rule() {
        let fields: Vec<PermitField> = FIELD_RULES.iter().map(|r| r.field).collect();
        let expected: Vec<PermitField> = PermitField::ALL
            .into_iter()
            .filter(|f| *f != PermitField::PermitType)
            .collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn test_patterns_have_capture_group() {
        for rule in FIELD_RULES.iter() {
            assert!(!rule.patterns.is_empty(), "{} has no patterns", rule.field);
            for pattern in &rule.patterns {
                assert_eq!(pattern.captures_len(), 2, "{} pattern {}", rule.field, pattern);
            }
        }
    }

    #[test]
    fn test_label_line() {
        assert!(LABEL_LINE.is_match("Owner: Jane"));
        assert!(LABEL_LINE.is_match("APN:123"));
        assert!(!LABEL_LINE.is_match("Owner Name: Jane"));
        assert!(!LABEL_LINE.is_match("replace windows"));
    }
}
