//! Structured field extraction from normalised transcript text.
//!
//! Extraction is a table of independent schema matchers, one per document
//! layout convention. Each matcher is a pure function from text to a partial
//! field map and never fails — a pattern that does not occur simply
//! contributes nothing. The orchestrator applies every matcher in
//! [`SchemaMatcher::ALL`] order and merges the partial maps; on a key
//! collision the later matcher wins. That is a deliberate simplicity
//! trade-off, not conflict resolution, and it is pinned by test.
//!
//! Numeric GPA-like fields are bounds-checked to `[0, 5]` and silently
//! dropped when out of range; a nonsense value is worse than no value when
//! the destination is a form the user will submit.

mod secondary;
mod university;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single extracted value: free text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

/// Field name → value. Keys come from the closed per-schema field sets;
/// absence of a key means "not detected".
pub type ExtractedFields = BTreeMap<String, FieldValue>;

/// One document layout convention the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaMatcher {
    /// US-style university transcript: institution, degree, major, state,
    /// gpa, gradDate.
    UniversityTranscript,
    /// Secondary-school certificate: studentName, fatherName, motherName,
    /// rollNumber, dob, medium, cgpa.
    SecondaryCertificate,
}

impl SchemaMatcher {
    /// Every matcher, in application order. Later entries win collisions.
    pub const ALL: [SchemaMatcher; 2] = [
        SchemaMatcher::UniversityTranscript,
        SchemaMatcher::SecondaryCertificate,
    ];

    /// Run this matcher against normalised text.
    pub fn apply(&self, text: &str) -> ExtractedFields {
        match self {
            SchemaMatcher::UniversityTranscript => university::match_fields(text),
            SchemaMatcher::SecondaryCertificate => secondary::match_fields(text),
        }
    }
}

/// Apply every schema matcher and merge the partial maps, later wins.
pub fn extract_fields(text: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::new();
    for matcher in SchemaMatcher::ALL {
        fields.extend(matcher.apply(text));
    }
    fields
}

/// Parse a GPA-like capture, enforcing the `[0, 5]` bound.
///
/// Out-of-range and unparsable values return `None`: the field is simply
/// absent, never an error.
pub(crate) fn bounded_gpa(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if (0.0..=5.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_later_matcher_wins() {
        // Pins the documented collision rule: ALL-order is application order,
        // and a later matcher's value replaces an earlier one's.
        let mut first = ExtractedFields::new();
        first.insert("institution".into(), FieldValue::Text("From First".into()));
        first.insert("gpa".into(), FieldValue::Number(3.0));

        let mut second = ExtractedFields::new();
        second.insert("institution".into(), FieldValue::Text("From Second".into()));

        let mut merged = ExtractedFields::new();
        merged.extend(first);
        merged.extend(second);

        assert_eq!(
            merged.get("institution"),
            Some(&FieldValue::Text("From Second".into()))
        );
        // Non-colliding keys from the earlier matcher survive.
        assert_eq!(merged.get("gpa"), Some(&FieldValue::Number(3.0)));
    }

    #[test]
    fn matcher_order_is_university_then_secondary() {
        assert_eq!(
            SchemaMatcher::ALL,
            [
                SchemaMatcher::UniversityTranscript,
                SchemaMatcher::SecondaryCertificate
            ]
        );
    }

    #[test]
    fn bounded_gpa_enforces_range() {
        assert_eq!(bounded_gpa("3.75"), Some(3.75));
        assert_eq!(bounded_gpa("0"), Some(0.0));
        assert_eq!(bounded_gpa("5.0"), Some(5.0));
        assert_eq!(bounded_gpa("5.5"), None);
        assert_eq!(bounded_gpa("-1"), None);
        assert_eq!(bounded_gpa("abc"), None);
    }

    #[test]
    fn extract_combines_both_schemas() {
        let text = "State University Degree: Bachelor of Science \
                    Roll No: 4521 CGPA: 3.9";
        let fields = extract_fields(text);
        assert!(fields.contains_key("institution"));
        assert!(fields.contains_key("rollNumber"));
        assert_eq!(fields.get("cgpa"), Some(&FieldValue::Number(3.9)));
    }

    #[test]
    fn empty_text_extracts_nothing() {
        assert!(extract_fields("").is_empty());
    }

    #[test]
    fn field_value_serialises_untagged() {
        let json = serde_json::to_string(&FieldValue::Number(3.8)).unwrap();
        assert_eq!(json, "3.8");
        let json = serde_json::to_string(&FieldValue::Text("BS".into())).unwrap();
        assert_eq!(json, "\"BS\"");
    }
}
