//! Secondary-school certificate schema: studentName, fatherName, motherName,
//! rollNumber, dob, medium, cgpa.
//!
//! Board certificates are rigidly labelled documents, so every pattern here
//! is anchored on its printed label. The same greedy-capture-then-strip
//! technique as the university schema applies: name captures swallow the next
//! label and lose it in a suffix pass.

use super::{bounded_gpa, ExtractedFields, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_STUDENT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:Student'?s?\s+Name|Candidate'?s?\s+Name|Name\s+of\s+(?:the\s+)?(?:Student|Candidate))\s*[:\-]\s*([A-Za-z .']+)",
    )
    .unwrap()
});

static RE_FATHER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bFather'?s?\s+Name\s*[:\-]\s*([A-Za-z .']+)").unwrap()
});

static RE_MOTHER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bMother'?s?\s+Name\s*[:\-]\s*([A-Za-z .']+)").unwrap()
});

static RE_ROLL_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bRoll\s*(?:No\.?|Number|#)?\s*[:\-]\s*([A-Za-z0-9/-]+)").unwrap()
});

static RE_DOB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:DOB|Date\s+of\s+Birth)\s*[:\-]?\s*(\d{1,2}[./-]\d{1,2}[./-]\d{2,4})")
        .unwrap()
});

static RE_MEDIUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bMedium(?:\s+of\s+Instruction)?\s*[:\-]\s*([A-Za-z]+)").unwrap()
});

static RE_CGPA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCGPA\s*[:\-]?\s*(\d{1,2}(?:\.\d{1,2})?)\b").unwrap());

/// Labels the greedy name captures may have swallowed as a suffix.
static RE_TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\s*\b(?:Father(?:'s)?|Mother(?:'s)?|Student(?:'s)?|Candidate(?:'s)?|Name|Roll|No|Number|DOB|Date|Medium|CGPA|Class|Board|School|Year))+\s*$",
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

fn insert_name(fields: &mut ExtractedFields, key: &str, re: &Regex, text: &str) {
    if let Some(caps) = re.captures(text) {
        let value = cut_at_label(&caps[1]);
        if !value.is_empty() {
            fields.insert(key.to_string(), FieldValue::Text(value));
        }
    }
}

pub(super) fn match_fields(text: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::new();

    insert_name(&mut fields, "studentName", &RE_STUDENT_NAME, text);
    insert_name(&mut fields, "fatherName", &RE_FATHER_NAME, text);
    insert_name(&mut fields, "motherName", &RE_MOTHER_NAME, text);

    if let Some(caps) = RE_ROLL_NUMBER.captures(text) {
        fields.insert("rollNumber".into(), FieldValue::Text(caps[1].to_string()));
    }

    if let Some(caps) = RE_DOB.captures(text) {
        fields.insert("dob".into(), FieldValue::Text(caps[1].to_string()));
    }

    if let Some(caps) = RE_MEDIUM.captures(text) {
        fields.insert("medium".into(), FieldValue::Text(caps[1].to_string()));
    }

    if let Some(cgpa) = RE_CGPA.captures(text).and_then(|c| bounded_gpa(&c[1])) {
        fields.insert("cgpa".into(), FieldValue::Number(cgpa));
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_certificate_example() {
        let text = "Student Name: Ravi Kumar Father's Name: Suresh Kumar \
                    Mother's Name: Anita Devi Roll No: 452118 \
                    DOB: 14/06/2007 Medium: English CGPA: 4.2";
        let fields = match_fields(text);

        assert_eq!(fields["studentName"], FieldValue::Text("Ravi Kumar".into()));
        assert_eq!(fields["fatherName"], FieldValue::Text("Suresh Kumar".into()));
        assert_eq!(fields["motherName"], FieldValue::Text("Anita Devi".into()));
        assert_eq!(fields["rollNumber"], FieldValue::Text("452118".into()));
        assert_eq!(fields["dob"], FieldValue::Text("14/06/2007".into()));
        assert_eq!(fields["medium"], FieldValue::Text("English".into()));
        assert_eq!(fields["cgpa"], FieldValue::Number(4.2));
    }

    #[test]
    fn name_of_student_variant() {
        let fields = match_fields("Name of the Student: Priya Sharma Roll No: 88");
        assert_eq!(fields["studentName"], FieldValue::Text("Priya Sharma".into()));
    }

    #[test]
    fn bare_name_label_is_not_a_student_name() {
        // "Name:" alone is ambiguous with "Father's Name:" upstream; only the
        // explicit student/candidate forms count.
        let fields = match_fields("Father's Name: Suresh Kumar");
        assert!(!fields.contains_key("studentName"));
        assert_eq!(fields["fatherName"], FieldValue::Text("Suresh Kumar".into()));
    }

    #[test]
    fn cgpa_out_of_range_dropped() {
        // Ten-point-scale values fall outside the accepted [0, 5] band.
        assert!(!match_fields("CGPA: 9.2").contains_key("cgpa"));
        assert!(!match_fields("CGPA: 5.5").contains_key("cgpa"));
        assert_eq!(match_fields("CGPA: 3.75")["cgpa"], FieldValue::Number(3.75));
    }

    #[test]
    fn roll_number_with_letters() {
        let fields = match_fields("Roll Number: R-2024/118 DOB: 01/01/2007");
        assert_eq!(fields["rollNumber"], FieldValue::Text("R-2024/118".into()));
    }

    #[test]
    fn dotted_dob() {
        let fields = match_fields("Date of Birth: 14.06.2007");
        assert_eq!(fields["dob"], FieldValue::Text("14.06.2007".into()));
    }

    #[test]
    fn no_patterns_no_fields() {
        assert!(match_fields("State University GPA: 3.8").is_empty());
    }
}
