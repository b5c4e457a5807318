//! Document-level confidence aggregation.

use crate::models::document::RecognizedLine;

/// Unweighted arithmetic mean of every line's confidence.
///
/// Every line counts equally regardless of its length, box area or page.
/// A document with no lines scores `0.0`.
pub fn aggregate(lines: &[RecognizedLine]) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }

    let sum: f64 = lines.iter().map(|line| f64::from(line.confidence)).sum();
    sum / lines.len() as f64
}
