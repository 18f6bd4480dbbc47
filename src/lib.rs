//! # transcript-ocr
//!
//! Turn an uploaded transcript (PDF or image) into machine-usable academic
//! fields, entirely in-process.
//!
//! ## Why this crate?
//!
//! Scholarship and admissions forms ask applicants to re-type information
//! that is already printed on the transcript they just uploaded. This crate
//! reads the upload instead: it rasterises the document, runs OCR over each
//! page, and pattern-matches the cleaned text against known transcript
//! layouts, so the embedding form can pre-fill institution, degree, GPA, and
//! friends. Recognition quality is whatever the scan allows — the pipeline's
//! contract is about structure, ordering, and failure isolation, not
//! accuracy.
//!
//! ## Pipeline Overview
//!
//! ```text
//! bytes
//!  │
//!  ├─ 1. Raster      PDF pages via pdfium (spawn_blocking), images via `image`
//!  ├─ 2. Preprocess  grayscale + threshold binarisation per page
//!  ├─ 3. Recognize   long-lived Tesseract worker, whitelist-constrained
//!  ├─ 4. Normalize   strip OCR artifacts, collapse whitespace
//!  ├─ 5. Extract     schema matchers → merged field map
//!  └─ 6. Output      aggregated text + fields + per-page error report
//! ```
//!
//! Page bitmaps are cached per upload identity (name, size, mtime), so
//! re-running over the same file skips straight to recognition. A single bad
//! page never aborts a run; it lands in `page_errors` and the rest of the
//! document carries on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transcript_ocr::{DocumentSource, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("transcript.pdf")?;
//!     let source = DocumentSource::new("transcript.pdf", "application/pdf", 0, bytes);
//!
//!     let pipeline = Pipeline::new();
//!     let output = pipeline.process(&source).await?;
//!
//!     for (field, value) in &output.fields {
//!         println!("{field}: {value:?}");
//!     }
//!     if !output.is_clean() {
//!         eprintln!("{} pages skipped", output.page_errors.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `transcript-ocr` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! transcript-ocr = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! PDF rasterisation binds to a `pdfium` shared library at runtime
//! (`PDFIUM_LIB_PATH` or standard locations); recognition links against the
//! system Tesseract with the `eng` language data installed. Neither is
//! touched until the corresponding stage actually runs — image-only
//! pipelines with a custom recognizer need neither.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::PageCache;
pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_CHAR_WHITELIST};
pub use error::{PageError, PipelineError, USER_FACING_MESSAGE};
pub use extract::{extract_fields, ExtractedFields, FieldValue, SchemaMatcher};
pub use output::{ExtractionOutput, RunStats};
pub use pipeline::raster::RenderedPage;
pub use pipeline::recognize::{Recognize, RecognitionResult, RecognizeError, TesseractEngine};
pub use process::{process_document, Pipeline};
pub use source::{DocumentSource, Fingerprint};
