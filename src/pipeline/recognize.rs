//! Recognition: a long-lived Tesseract worker behind a typed interface.
//!
//! ## Why a dedicated worker thread?
//!
//! A Tesseract instance is expensive to initialise (language data load) and
//! is not safe to share across threads, so it must live somewhere for the
//! whole lifetime of the pipeline. Owning a single worker thread gives the
//! instance a home: jobs arrive over a channel, replies go back over oneshot
//! channels, and the engine is created lazily on the first page and torn down
//! exactly once when the [`TesseractEngine`] is dropped. Callers that abandon
//! a run simply drop their reply receiver; the worker finishes the job,
//! discards the result, and is clean for the next run.
//!
//! ## Failure model
//!
//! * Initialisation failure (missing language data, bad install) is **sticky**:
//!   every subsequent job is refused with the same [`RecognizeError::Init`]
//!   until the pipeline owner replaces the engine
//!   ([`crate::Pipeline::reset_recognizer`]). Retrying initialisation on every
//!   page would hide a broken install behind per-page noise.
//! * A page that recognises to nothing under the whitelist is a per-page
//!   [`RecognizeError::NoText`]; the run continues without it.

use async_trait::async_trait;
use std::sync::mpsc;
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Raw text recognised from one page.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecognitionResult {
    /// 0-based index of the page in the source document.
    pub page_index: usize,
    /// Recognised text before normalisation.
    pub raw_text: String,
    /// Engine mean confidence, clamped to 0–100.
    pub confidence_percent: u8,
}

/// Errors from the recognition stage.
#[derive(Debug, Clone, Error)]
pub enum RecognizeError {
    /// The engine could not be initialised; fatal and sticky.
    #[error("engine initialisation failed: {detail}")]
    Init { detail: String },

    /// The engine failed on this specific page; recoverable.
    #[error("{detail}")]
    Engine { detail: String },

    /// Recognition succeeded but produced no text; recoverable.
    #[error("no text recognised")]
    NoText,
}

/// A recognition backend: bitmap in, text and confidence out.
///
/// The pipeline ships [`TesseractEngine`], but the trait is the seam for
/// tests and for embedders that need a pooled or remote engine. One
/// invocation per page per run; implementations must tolerate concurrent
/// callers (the default engine serialises internally).
#[async_trait]
pub trait Recognize: Send + Sync {
    async fn recognize(
        &self,
        page_index: usize,
        png: &[u8],
    ) -> Result<RecognitionResult, RecognizeError>;
}

// ── Tesseract worker ─────────────────────────────────────────────────────

struct Job {
    page_index: usize,
    png: Vec<u8>,
    reply: oneshot::Sender<Result<RecognitionResult, RecognizeError>>,
}

/// The built-in engine: one Tesseract instance on one owned thread.
///
/// Construction is cheap — the thread starts immediately, Tesseract itself is
/// initialised when the first page arrives. Dropping the engine closes the
/// job channel, which ends the worker loop and joins the thread.
pub struct TesseractEngine {
    tx: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl TesseractEngine {
    /// Spawn the worker thread for the given language and character whitelist.
    pub fn new(language: impl Into<String>, whitelist: impl Into<String>) -> Self {
        let language = language.into();
        let whitelist = whitelist.into();
        let (tx, rx) = mpsc::channel::<Job>();

        let handle = std::thread::Builder::new()
            .name("ocr-worker".to_string())
            .spawn(move || worker_loop(rx, &language, &whitelist))
            .expect("failed to spawn ocr worker thread");

        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }
}

#[async_trait]
impl Recognize for TesseractEngine {
    async fn recognize(
        &self,
        page_index: usize,
        png: &[u8],
    ) -> Result<RecognitionResult, RecognizeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            page_index,
            png: png.to_vec(),
            reply: reply_tx,
        };

        self.tx
            .as_ref()
            .and_then(|tx| tx.send(job).ok())
            .ok_or_else(|| RecognizeError::Engine {
                detail: "recognition worker is gone".to_string(),
            })?;

        reply_rx.await.map_err(|_| RecognizeError::Engine {
            detail: "recognition worker dropped the job".to_string(),
        })?
    }
}

impl Drop for TesseractEngine {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("ocr worker thread panicked during shutdown");
            }
        }
    }
}

/// State of the Tesseract instance inside the worker.
enum EngineState {
    /// Not yet created; first job triggers initialisation.
    Uninit,
    Ready(tesseract::Tesseract),
    /// Initialisation failed; the detail is replayed to every later job.
    Failed(String),
}

fn worker_loop(rx: mpsc::Receiver<Job>, language: &str, whitelist: &str) {
    let mut state = EngineState::Uninit;

    while let Ok(job) = rx.recv() {
        let (next_state, result) = run_job(state, &job, language, whitelist);
        state = next_state;
        // The caller may have abandoned the run; a dead reply channel is fine.
        let _ = job.reply.send(result);
    }

    debug!("ocr worker shutting down");
}

fn run_job(
    state: EngineState,
    job: &Job,
    language: &str,
    whitelist: &str,
) -> (EngineState, Result<RecognitionResult, RecognizeError>) {
    let engine = match state {
        EngineState::Failed(detail) => {
            let err = RecognizeError::Init {
                detail: detail.clone(),
            };
            return (EngineState::Failed(detail), Err(err));
        }
        EngineState::Ready(engine) => engine,
        EngineState::Uninit => match init_engine(language, whitelist) {
            Ok(engine) => {
                info!("tesseract initialised (lang={language})");
                engine
            }
            Err(detail) => {
                warn!("tesseract initialisation failed: {detail}");
                let err = RecognizeError::Init {
                    detail: detail.clone(),
                };
                return (EngineState::Failed(detail), Err(err));
            }
        },
    };

    // set_image_from_mem consumes the instance on failure, so a failed page
    // also forces a lazy re-initialisation on the next job.
    let mut engine = match engine.set_image_from_mem(&job.png) {
        Ok(engine) => engine,
        Err(e) => {
            return (
                EngineState::Uninit,
                Err(RecognizeError::Engine {
                    detail: format!("could not load page bitmap: {e}"),
                }),
            );
        }
    };

    let text = match engine.get_text() {
        Ok(text) => text,
        Err(e) => {
            return (
                EngineState::Ready(engine),
                Err(RecognizeError::Engine {
                    detail: format!("recognition failed: {e}"),
                }),
            );
        }
    };

    let confidence_percent = engine.mean_text_conf().clamp(0, 100) as u8;
    debug!(
        "page {}: {} chars at {}% confidence",
        job.page_index,
        text.len(),
        confidence_percent
    );

    let result = if text.trim().is_empty() {
        Err(RecognizeError::NoText)
    } else {
        Ok(RecognitionResult {
            page_index: job.page_index,
            raw_text: text,
            confidence_percent,
        })
    };

    (EngineState::Ready(engine), result)
}

fn init_engine(language: &str, whitelist: &str) -> Result<tesseract::Tesseract, String> {
    tesseract::Tesseract::new(None, Some(language))
        .map_err(|e| e.to_string())?
        .set_variable("tessedit_char_whitelist", whitelist)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_without_use_joins_cleanly() {
        // Tesseract init is lazy, so spawning and dropping the engine must
        // work on machines with no tesseract install at all.
        let engine = TesseractEngine::new("eng", "abc");
        drop(engine);
    }

    #[tokio::test]
    async fn recognize_after_drop_channel_errors() {
        let mut engine = TesseractEngine::new("eng", "abc");
        // Simulate a torn-down worker.
        engine.tx.take();
        let err = engine.recognize(0, &[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, RecognizeError::Engine { .. }));
    }

    #[test]
    fn init_error_is_distinguishable() {
        let init = RecognizeError::Init {
            detail: "x".into(),
        };
        let page = RecognizeError::NoText;
        assert!(matches!(init, RecognizeError::Init { .. }));
        assert!(!matches!(page, RecognizeError::Init { .. }));
    }
}
