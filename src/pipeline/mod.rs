//! Pipeline stages for transcript OCR.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. switch the recognition backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ raster ──▶ preprocess ──▶ encode ──▶ recognize ──▶ normalize
//! (bytes)    (pdfium)   (binarize)     (PNG)      (tesseract)   (cleanup)
//! ```
//!
//! 1. [`raster`]     — decode PDF or image bytes into ordered page bitmaps;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 2. [`preprocess`] — grayscale + threshold binarization to sharpen the
//!    recognition signal; pure, never fails
//! 3. [`encode`]     — PNG-encode each binarized page for the engine
//! 4. [`recognize`]  — drive the long-lived Tesseract worker; the only stage
//!    with persistent state
//! 5. [`normalize`]  — deterministic text-cleanup rules for OCR artifacts

pub mod encode;
pub mod normalize;
pub mod preprocess;
pub mod raster;
pub mod recognize;
