//! Result types returned by the pipeline.
//!
//! A successful run always returns an [`ExtractionOutput`], even when some
//! pages failed — per-page failures live in `page_errors` so the caller can
//! distinguish "clean run" from "usable but degraded". Only document-level
//! failures surface as [`crate::error::PipelineError`].

use crate::error::PageError;
use crate::extract::ExtractedFields;
use serde::{Deserialize, Serialize};

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Cleaned per-page texts joined in ascending page order.
    pub aggregated_text: String,
    /// Detected fields; empty map when nothing matched.
    pub fields: ExtractedFields,
    /// Pages that contributed nothing, ascending by page index.
    pub page_errors: Vec<PageError>,
    /// Timing and page accounting for this run.
    pub stats: RunStats,
}

impl ExtractionOutput {
    /// Whether any field was detected.
    ///
    /// This is the signal the embedding form uses to flip its
    /// "document attached" flag after applying the extracted values.
    pub fn fields_detected(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether every page made it through recognition.
    pub fn is_clean(&self) -> bool {
        self.page_errors.is_empty()
    }
}

/// Page accounting and stage timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Pages the rasteriser produced.
    pub total_pages: usize,
    /// Pages that contributed text to the aggregate.
    pub recognized_pages: usize,
    /// Pages recorded in `page_errors`.
    pub failed_pages: usize,
    /// Whether the page bitmaps came from the cache.
    pub cache_hit: bool,
    /// Mean recognition confidence over contributing pages, 0–100.
    pub mean_confidence: u8,
    /// Wall-clock duration of the rasterisation stage.
    pub render_duration_ms: u64,
    /// Wall-clock duration of preprocessing + recognition.
    pub recognition_duration_ms: u64,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FieldValue;

    fn output_with(fields: ExtractedFields, page_errors: Vec<PageError>) -> ExtractionOutput {
        ExtractionOutput {
            aggregated_text: String::new(),
            fields,
            page_errors,
            stats: RunStats::default(),
        }
    }

    #[test]
    fn fields_detected_tracks_map() {
        let empty = output_with(ExtractedFields::new(), vec![]);
        assert!(!empty.fields_detected());

        let mut fields = ExtractedFields::new();
        fields.insert("gpa".into(), FieldValue::Number(3.8));
        assert!(output_with(fields, vec![]).fields_detected());
    }

    #[test]
    fn is_clean_tracks_page_errors() {
        assert!(output_with(ExtractedFields::new(), vec![]).is_clean());
        let degraded = output_with(
            ExtractedFields::new(),
            vec![PageError::NoText { page: 1 }],
        );
        assert!(!degraded.is_clean());
    }

    #[test]
    fn output_serialises_to_json() {
        let mut fields = ExtractedFields::new();
        fields.insert("institution".into(), FieldValue::Text("State University".into()));
        fields.insert("gpa".into(), FieldValue::Number(3.8));
        let out = output_with(fields, vec![]);

        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"institution\":\"State University\""));
        assert!(json.contains("\"gpa\":3.8"));
    }
}
