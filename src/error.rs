//! Error types for the transcript-ocr library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PipelineError`] — **Fatal**: the run cannot proceed at all (input is
//!   not a parsable document, zero pages rendered, the recognition engine
//!   cannot start, or no page produced any readable text). Returned as
//!   `Err(PipelineError)` from [`crate::Pipeline::process`].
//!
//! * [`PageError`] — **Non-fatal**: a single page failed (render glitch,
//!   recognition produced nothing) but the other pages are fine. Collected in
//!   [`crate::output::ExtractionOutput::page_errors`] so callers can inspect
//!   partial success rather than losing the whole document to one bad page.
//!
//! Missing or malformed *extracted fields* are neither: absence of a field is
//! the normal outcome of extraction and never surfaces through either type.

use thiserror::Error;

/// Message shown to end users for any fatal pipeline error.
///
/// The embedding form displays one generic string regardless of which stage
/// failed; the specific variant is for logs and programmatic handling.
pub const USER_FACING_MESSAGE: &str =
    "Failed to process file. Try a clear scan/photo or a smaller PDF.";

/// All fatal errors returned by the pipeline.
///
/// Page-level failures use [`PageError`] and are reported in
/// [`crate::output::ExtractionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The byte stream is not a parsable document of a supported type.
    #[error("could not read '{name}': {detail}")]
    Decode { name: String, detail: String },

    /// The document parsed but zero pages rendered successfully.
    #[error("no valid pages in '{name}'")]
    NoPages { name: String },

    /// The recognition worker could not be initialised.
    ///
    /// This blocks every subsequent run on the same [`crate::Pipeline`] until
    /// the owner calls [`crate::Pipeline::reset_recognizer`].
    #[error("recognition engine failed to initialise: {detail}")]
    RecognitionInit { detail: String },

    /// Every page yielded empty text after recognition and cleanup.
    #[error("no readable text detected in '{name}'")]
    EmptyResult { name: String },

    /// Unexpected internal error (task panic, channel teardown).
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// The single user-facing message for this error.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_MESSAGE
    }
}

/// A non-fatal error for a single page.
///
/// The run continues unless *all* pages fail, in which case the orchestrator
/// returns [`PipelineError::EmptyResult`] instead.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page could not be rasterised; it is omitted from the sequence
    /// without renumbering the pages that follow it.
    #[error("page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The recognition engine returned an error for this page.
    #[error("page {page}: recognition failed: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// Recognition ran but produced no text under the character whitelist.
    #[error("page {page}: no text recognised")]
    NoText { page: usize },

    /// Recognition produced text, but cleanup reduced it to nothing.
    #[error("page {page}: text was empty after cleanup")]
    EmptyText { page: usize },

    /// Recognition exceeded the configured per-page timeout.
    #[error("page {page}: recognition timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },
}

impl PageError {
    /// 0-based index of the page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::RecognitionFailed { page, .. }
            | PageError::NoText { page }
            | PageError::EmptyText { page }
            | PageError::Timeout { page, .. } => *page,
        }
    }
}
