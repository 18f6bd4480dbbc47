//! The pipeline orchestrator: one document in, extracted fields out.
//!
//! [`Pipeline`] is the only stateful component. It owns the page cache and
//! the recognition engine and sequences the stateless stages per run:
//!
//! ```text
//! rasterize ─▶ (preprocess ─▶ encode ─▶ recognize ─▶ normalize) per page ─▶ aggregate ─▶ extract
//! ```
//!
//! Runs are serialised: the recognition worker is a single shared resource,
//! so overlapping runs would interleave pages. Within a run, pages fan out
//! over a bounded set of in-flight tasks and the aggregation step re-sorts by
//! page index — completion order is an implementation detail, page order is a
//! contract.
//!
//! ## Cancellation
//!
//! Dropping the future returned by [`Pipeline::process`] abandons the run:
//! in-flight page tasks are dropped, the recognition worker finishes its
//! current job into a dead reply channel, and the run lock releases. The next
//! run observes no residue.

use crate::cache::PageCache;
use crate::config::PipelineConfig;
use crate::error::{PageError, PipelineError};
use crate::extract;
use crate::output::{ExtractionOutput, RunStats};
use crate::pipeline::raster::RenderedPage;
use crate::pipeline::recognize::{Recognize, RecognizeError, TesseractEngine};
use crate::pipeline::{encode, normalize, preprocess, raster};
use crate::source::DocumentSource;
use futures::stream::{self, StreamExt};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// Process a single document with a throwaway pipeline.
///
/// Convenience wrapper for one-shot callers; anything processing more than
/// one document should hold a [`Pipeline`] so the page cache and the warm
/// recognition engine survive between runs.
pub async fn process_document(
    source: &DocumentSource,
    config: &PipelineConfig,
) -> Result<ExtractionOutput, PipelineError> {
    Pipeline::with_config(config.clone()).process(source).await
}

/// A reusable OCR pipeline: page cache + recognition engine + config.
pub struct Pipeline {
    config: PipelineConfig,
    cache: PageCache,
    recognizer: RwLock<Arc<dyn Recognize>>,
    /// Serialises runs: the recognition worker is one shared resource.
    run_lock: tokio::sync::Mutex<()>,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with the given configuration.
    ///
    /// The recognition engine is the configured override when present,
    /// otherwise the built-in Tesseract worker. Either way the engine is
    /// acquired here and released exactly once when the pipeline drops.
    pub fn with_config(config: PipelineConfig) -> Self {
        let recognizer: Arc<dyn Recognize> = match config.recognizer.clone() {
            Some(custom) => custom,
            None => Arc::new(TesseractEngine::new(
                config.ocr_language.clone(),
                config.char_whitelist.clone(),
            )),
        };

        Self {
            cache: PageCache::new(config.cache_capacity),
            recognizer: RwLock::new(recognizer),
            run_lock: tokio::sync::Mutex::new(()),
            config,
        }
    }

    /// Replace a recognition engine that failed to initialise.
    ///
    /// Initialisation failure is sticky by design — see
    /// [`crate::error::PipelineError::RecognitionInit`]. Recovery is the
    /// owner's explicit decision, made here: the old worker is dropped (and
    /// joined) and a fresh one spawned. With a configured custom recognizer
    /// this reinstalls that same recognizer.
    pub fn reset_recognizer(&self) {
        let fresh: Arc<dyn Recognize> = match self.config.recognizer.clone() {
            Some(custom) => custom,
            None => Arc::new(TesseractEngine::new(
                self.config.ocr_language.clone(),
                self.config.char_whitelist.clone(),
            )),
        };
        *self.recognizer.write().expect("recognizer lock poisoned") = fresh;
        info!("recognition engine reset");
    }

    /// The page cache backing this pipeline.
    ///
    /// Exposed for inspection and for embedders that pre-render documents;
    /// cached sequences are served exactly as if freshly rasterised.
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Drop every cached page sequence.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Run the full pipeline over one document.
    ///
    /// # Returns
    /// `Ok(ExtractionOutput)` whenever at least one page produced text, even
    /// if other pages failed (check `output.page_errors`).
    ///
    /// # Errors
    /// Only document-level failures:
    /// - [`PipelineError::Decode`] / [`PipelineError::NoPages`] — rasterisation
    /// - [`PipelineError::RecognitionInit`] — engine cannot start
    /// - [`PipelineError::EmptyResult`] — no page produced readable text
    pub async fn process(
        &self,
        source: &DocumentSource,
    ) -> Result<ExtractionOutput, PipelineError> {
        // One run at a time; released on every exit path, including drops.
        let _run = self.run_lock.lock().await;

        let total_start = Instant::now();
        info!(
            "processing '{}' ({} bytes, {})",
            source.name, source.byte_size, source.mime_type
        );

        // ── Step 1: Rasterise (or serve from cache) ──────────────────────
        let render_start = Instant::now();
        let cache_hit = self.cache.get(&source.fingerprint()).is_some();
        let pages = raster::render_document(source, &self.config, &self.cache).await?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        debug!(
            "rasterised {} pages in {render_duration_ms}ms (cache_hit={cache_hit})",
            pages.len()
        );

        // ── Step 2: Preprocess + recognise + normalise, per page ─────────
        let recognition_start = Instant::now();
        let recognizer = Arc::clone(&self.recognizer.read().expect("recognizer lock poisoned"));
        let outcomes: Vec<PageOutcome> = stream::iter(pages.iter().map(|page| {
            let recognizer = Arc::clone(&recognizer);
            let config = &self.config;
            async move { process_page(recognizer.as_ref(), page, config).await }
        }))
        .buffer_unordered(self.config.concurrency)
        .collect()
        .await;
        let recognition_duration_ms = recognition_start.elapsed().as_millis() as u64;

        // ── Step 3: Split outcomes, restore page order ───────────────────
        let mut texts: Vec<(usize, String, u8)> = Vec::new();
        let mut page_errors: Vec<PageError> = Vec::new();

        for outcome in outcomes {
            match outcome {
                PageOutcome::Text {
                    index,
                    text,
                    confidence,
                } => texts.push((index, text, confidence)),
                PageOutcome::Skipped(err) => {
                    warn!("{err}");
                    page_errors.push(err);
                }
                // Engine never came up: abort the whole run. The failure is
                // sticky inside the worker, so later runs fail fast too.
                PageOutcome::Fatal(err) => return Err(err),
            }
        }

        texts.sort_by_key(|(index, _, _)| *index);
        page_errors.sort_by_key(|e| e.page());

        // ── Step 4: Aggregate ────────────────────────────────────────────
        if texts.is_empty() {
            return Err(PipelineError::EmptyResult {
                name: source.name.clone(),
            });
        }

        let mean_confidence = (texts
            .iter()
            .map(|(_, _, confidence)| u32::from(*confidence))
            .sum::<u32>()
            / texts.len() as u32) as u8;

        let aggregated_text = texts
            .iter()
            .map(|(_, text, _)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        // ── Step 5: Extract fields ───────────────────────────────────────
        let fields = extract::extract_fields(&aggregated_text);
        debug!("extracted {} fields", fields.len());

        let stats = RunStats {
            total_pages: pages.len(),
            recognized_pages: texts.len(),
            failed_pages: page_errors.len(),
            cache_hit,
            mean_confidence,
            render_duration_ms,
            recognition_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "done: {}/{} pages, {} fields, {}ms",
            stats.recognized_pages,
            stats.total_pages,
            fields.len(),
            stats.total_duration_ms
        );

        Ok(ExtractionOutput {
            aggregated_text,
            fields,
            page_errors,
            stats,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one page's preprocess → recognise → normalise chain.
enum PageOutcome {
    /// The page contributed text.
    Text {
        index: usize,
        text: String,
        confidence: u8,
    },
    /// The page is skipped; the run continues.
    Skipped(PageError),
    /// The run must abort (engine initialisation failure).
    Fatal(PipelineError),
}

async fn process_page(
    recognizer: &dyn Recognize,
    page: &RenderedPage,
    config: &PipelineConfig,
) -> PageOutcome {
    let index = page.index;

    // Binarisation walks every pixel; keep it off the async threads just
    // like rasterisation. The clone leaves the cached bitmap untouched.
    let image = page.image.clone();
    let threshold = config.binarize_threshold;
    let encoded = tokio::task::spawn_blocking(move || {
        let binarized = preprocess::binarize(&image, threshold);
        encode::encode_page(&binarized)
    })
    .await;

    let png = match encoded {
        Ok(Ok(png)) => png,
        Ok(Err(e)) => {
            return PageOutcome::Skipped(PageError::RenderFailed {
                page: index,
                detail: format!("page encoding failed: {e}"),
            });
        }
        Err(e) => {
            return PageOutcome::Fatal(PipelineError::Internal(format!(
                "preprocess task panicked: {e}"
            )));
        }
    };

    let recognized = match config.recognition_timeout_secs {
        Some(secs) => {
            match tokio::time::timeout(
                Duration::from_secs(secs),
                recognizer.recognize(index, &png),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => return PageOutcome::Skipped(PageError::Timeout { page: index, secs }),
            }
        }
        None => recognizer.recognize(index, &png).await,
    };

    match recognized {
        Ok(result) => {
            let text = normalize::clean_text(&result.raw_text);
            if text.is_empty() {
                PageOutcome::Skipped(PageError::EmptyText { page: index })
            } else {
                PageOutcome::Text {
                    index,
                    text,
                    confidence: result.confidence_percent,
                }
            }
        }
        Err(RecognizeError::Init { detail }) => {
            PageOutcome::Fatal(PipelineError::RecognitionInit { detail })
        }
        Err(RecognizeError::NoText) => PageOutcome::Skipped(PageError::NoText { page: index }),
        Err(RecognizeError::Engine { detail }) => {
            PageOutcome::Skipped(PageError::RecognitionFailed {
                page: index,
                detail,
            })
        }
    }
}
