//! Configuration for the OCR pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads and to diff two runs to understand
//! why their outputs differ.

use crate::error::PipelineError;
use crate::pipeline::recognize::Recognize;
use std::fmt;
use std::sync::Arc;

/// The Tesseract character whitelist applied to every recognition call.
///
/// Letters, digits, and the punctuation that actually occurs on transcripts
/// (grade separators, dates, GPA decimals). Everything else is noise that
/// costs accuracy on the characters that matter.
pub const DEFAULT_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-.,:/()&% ";

/// Configuration for a pipeline instance.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use transcript_ocr::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .render_scale(2.0)
///     .binarize_threshold(180)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Zoom factor applied when rasterising PDF pages. Range 0.5–4.0. Default: 2.0.
    ///
    /// 2× renders transcript body text at roughly 20 px x-height, which is
    /// where Tesseract accuracy plateaus. Lower it on memory-constrained or
    /// high-density targets where the page cache would otherwise balloon.
    pub render_scale: f32,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 4000.
    ///
    /// A safety cap independent of scale: a 2× render of an A0-sized page
    /// would exhaust memory. Either dimension is capped, the other scales
    /// proportionally.
    pub max_rendered_pixels: u32,

    /// Luminance threshold for binarization, 0–255. Default: 180.
    ///
    /// Pixels with luminance above the threshold become white, the rest
    /// black. 180 keeps faint laser-printed text while dropping scanner
    /// background tint.
    pub binarize_threshold: u8,

    /// Tesseract language code. Default: `"eng"`.
    pub ocr_language: String,

    /// Character whitelist handed to the recognition engine.
    /// Default: [`DEFAULT_CHAR_WHITELIST`].
    pub char_whitelist: String,

    /// Number of pages preprocessed concurrently within one run. Default: 4.
    ///
    /// Preprocessing is CPU-bound and parallelises cleanly; recognition calls
    /// still serialise through the single engine worker. This also caps the
    /// number of page buffers in flight at once.
    pub concurrency: usize,

    /// Per-page recognition timeout in seconds. Default: `None` (no timeout).
    ///
    /// When set, a page that exceeds the deadline is recorded as a
    /// [`crate::error::PageError::Timeout`] and the run continues.
    pub recognition_timeout_secs: Option<u64>,

    /// Maximum number of documents kept in the page cache. Default: 8.
    ///
    /// Eviction is least-recently-used by document fingerprint. Each entry
    /// holds every rendered page bitmap of one document, so this is the
    /// memory knob.
    pub cache_capacity: usize,

    /// Pre-constructed recognition engine. Takes precedence over the built-in
    /// Tesseract worker. Useful in tests and for embedders that pool workers.
    pub recognizer: Option<Arc<dyn Recognize>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            max_rendered_pixels: 4000,
            binarize_threshold: 180,
            ocr_language: "eng".to_string(),
            char_whitelist: DEFAULT_CHAR_WHITELIST.to_string(),
            concurrency: 4,
            recognition_timeout_secs: None,
            cache_capacity: 8,
            recognizer: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("render_scale", &self.render_scale)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("binarize_threshold", &self.binarize_threshold)
            .field("ocr_language", &self.ocr_language)
            .field("concurrency", &self.concurrency)
            .field("recognition_timeout_secs", &self.recognition_timeout_secs)
            .field("cache_capacity", &self.cache_capacity)
            .field("recognizer", &self.recognizer.as_ref().map(|_| "<dyn Recognize>"))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale.clamp(0.5, 4.0);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn binarize_threshold(mut self, threshold: u8) -> Self {
        self.config.binarize_threshold = threshold;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn char_whitelist(mut self, whitelist: impl Into<String>) -> Self {
        self.config.char_whitelist = whitelist.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn recognition_timeout_secs(mut self, secs: u64) -> Self {
        self.config.recognition_timeout_secs = Some(secs);
        self
    }

    pub fn cache_capacity(mut self, n: usize) -> Self {
        self.config.cache_capacity = n.max(1);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn Recognize>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        if !(0.5..=4.0).contains(&c.render_scale) {
            return Err(PipelineError::Internal(format!(
                "render_scale must be 0.5-4.0, got {}",
                c.render_scale
            )));
        }
        if c.ocr_language.is_empty() {
            return Err(PipelineError::Internal(
                "ocr_language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = PipelineConfig::default();
        assert_eq!(c.render_scale, 2.0);
        assert_eq!(c.binarize_threshold, 180);
        assert_eq!(c.ocr_language, "eng");
        assert!(c.recognition_timeout_secs.is_none());
        assert!(c.char_whitelist.contains("0123456789"));
    }

    #[test]
    fn setters_clamp() {
        let c = PipelineConfig::builder()
            .render_scale(9.0)
            .concurrency(0)
            .cache_capacity(0)
            .build()
            .unwrap();
        assert_eq!(c.render_scale, 4.0);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.cache_capacity, 1);
    }

    #[test]
    fn empty_language_rejected() {
        let err = PipelineConfig::builder().ocr_language("").build();
        assert!(err.is_err());
    }
}
