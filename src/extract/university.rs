//! University-transcript schema: institution, degree, major, state, gpa,
//! gradDate.
//!
//! The patterns follow the labels US registrars actually print. The regex
//! engine here has no lookahead, so open-ended captures run greedy and a
//! second pass strips any section label the capture swallowed — cheaper to
//! reason about than hand-tuned terminator alternations in every pattern.

use super::{bounded_gpa, ExtractedFields, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;

/// Institution: up to a few capitalised words ending in an institution
/// keyword, optionally "of <Name>".
static RE_INSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b((?:[A-Z][A-Za-z&.'-]*\s+){0,5}(?:University|College|Institute|School|Academy)(?:\s+of(?:\s+[A-Z][A-Za-z&.'-]*)+)?)",
    )
    .unwrap()
});

/// Degree: abbreviations (B.S., BSc, M.S., MSc) or spelled-out
/// Bachelor/Master with an optional capitalised "of …" tail.
static RE_DEGREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b((?:B\.?S\.?c?|M\.?S\.?c?|Bachelor(?:'s)?|Master(?:'s)?)(?:\s+of(?:\s+[A-Z][A-Za-z&]*)+)?)",
    )
    .unwrap()
});

static RE_MAJOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:Major|Program|Field)\s*[:\-]\s*([A-Za-z &/]+)").unwrap());

static RE_STATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:State|Province)\s*[:\-]\s*([A-Za-z .]+)").unwrap());

static RE_GPA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bGPA\s*[:\-]?\s*(\d(?:\.\d{1,2})?)\b").unwrap());

/// Graduation date: month-name form first, numeric `M/YYYY` as fallback.
static RE_GRAD_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{4})\b")
        .unwrap()
});

static RE_GRAD_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}[/\-]\d{4})\b").unwrap());

/// Section labels that a greedy capture may have swallowed.
///
/// Captures stop at the next `:` on their own (no pattern's character class
/// admits a colon), so a swallowed label is always a suffix of the capture —
/// possibly a multi-word one like `Roll No`. Stripping is anchored at the end
/// so label words inside a value ("Michigan State University") survive.
static RE_TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\s*\b(?:Degree|Major|Minor|Program|Field|GPA|CGPA|Grad(?:uation)?|Roll|No|Name|Father(?:'s)?|Mother(?:'s)?|DOB|Medium|Board|Class|State|Province))+\s*$",
    )
    .unwrap()
});

fn cut_at_label(capture: &str) -> String {
    RE_TRAILING_LABEL
        .replace(capture, "")
        .trim()
        .trim_end_matches([',', ';', '-', ':'])
        .trim()
        .to_string()
}

pub(super) fn match_fields(text: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::new();

    if let Some(caps) = RE_INSTITUTION.captures(text) {
        let value = cut_at_label(&caps[1]);
        if !value.is_empty() {
            fields.insert("institution".into(), FieldValue::Text(value));
        }
    }

    if let Some(caps) = RE_DEGREE.captures(text) {
        let value = cut_at_label(&caps[1]);
        if !value.is_empty() {
            fields.insert("degree".into(), FieldValue::Text(value));
        }
    }

    if let Some(caps) = RE_MAJOR.captures(text) {
        let value = cut_at_label(&caps[1]);
        if !value.is_empty() {
            fields.insert("major".into(), FieldValue::Text(value));
        }
    }

    if let Some(caps) = RE_STATE.captures(text) {
        let value = cut_at_label(&caps[1]);
        if !value.is_empty() {
            fields.insert("state".into(), FieldValue::Text(value));
        }
    }

    if let Some(gpa) = RE_GPA.captures(text).and_then(|c| bounded_gpa(&c[1])) {
        fields.insert("gpa".into(), FieldValue::Number(gpa));
    }

    let grad = RE_GRAD_MONTH
        .captures(text)
        .or_else(|| RE_GRAD_NUMERIC.captures(text));
    if let Some(caps) = grad {
        fields.insert("gradDate".into(), FieldValue::Text(caps[1].to_string()));
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_transcript_example() {
        let text = "State University ... Degree: Bachelor of Science ... \
                    Major: Computer Science ... GPA: 3.8 ... Graduation: May 2025";
        let fields = match_fields(text);

        assert_eq!(fields["institution"], FieldValue::Text("State University".into()));
        assert_eq!(fields["degree"], FieldValue::Text("Bachelor of Science".into()));
        assert_eq!(fields["major"], FieldValue::Text("Computer Science".into()));
        assert_eq!(fields["gpa"], FieldValue::Number(3.8));
        assert_eq!(fields["gradDate"], FieldValue::Text("May 2025".into()));
    }

    #[test]
    fn run_on_text_without_separators() {
        // Normalised OCR output has no "..." between sections; greedy
        // captures must still stop at the next label.
        let text = "Michigan State University Degree: Bachelor of Arts \
                    Major: History GPA: 3.2 Graduation: Dec 2024";
        let fields = match_fields(text);

        assert_eq!(
            fields["institution"],
            FieldValue::Text("Michigan State University".into())
        );
        assert_eq!(fields["degree"], FieldValue::Text("Bachelor of Arts".into()));
        assert_eq!(fields["major"], FieldValue::Text("History".into()));
    }

    #[test]
    fn institution_of_form() {
        let fields = match_fields("University of Texas GPA: 3.5");
        assert_eq!(
            fields["institution"],
            FieldValue::Text("University of Texas".into())
        );
    }

    #[test]
    fn degree_abbreviations() {
        assert_eq!(
            match_fields("Degree: B.S. Major: Physics")["degree"],
            FieldValue::Text("B.S.".into())
        );
        assert_eq!(
            match_fields("earned an MSc at college")["degree"],
            FieldValue::Text("MSc".into())
        );
    }

    #[test]
    fn state_field() {
        let fields = match_fields("State: California GPA: 3.9");
        assert_eq!(fields["state"], FieldValue::Text("California".into()));
    }

    #[test]
    fn gpa_out_of_range_dropped() {
        assert!(!match_fields("GPA: 5.5").contains_key("gpa"));
        assert!(!match_fields("GPA: -1").contains_key("gpa"));
        assert_eq!(match_fields("GPA: 3.75")["gpa"], FieldValue::Number(3.75));
    }

    #[test]
    fn cgpa_label_does_not_leak_into_gpa() {
        // \bGPA must not match the tail of "CGPA".
        assert!(!match_fields("CGPA: 3.9").contains_key("gpa"));
    }

    #[test]
    fn numeric_grad_date_fallback() {
        let fields = match_fields("Graduation: 05/2025");
        assert_eq!(fields["gradDate"], FieldValue::Text("05/2025".into()));
    }

    #[test]
    fn no_patterns_no_fields() {
        assert!(match_fields("lorem ipsum dolor sit amet").is_empty());
    }
}
