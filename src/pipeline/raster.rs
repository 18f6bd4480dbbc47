//! Rasterisation: decode a document into ordered page bitmaps.
//!
//! PDF input is rendered page by page via pdfium; raster images (PNG, JPEG,
//! …) are decoded whole as a single page 0. Results are memoized in the
//! [`PageCache`] keyed by the upload's [`Fingerprint`] — a pure optimisation,
//! invisible to callers: the returned sequence is identical whether it came
//! from the cache or a fresh decode.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread-pool
//! thread so Tokio workers do not stall during CPU-heavy rendering.
//!
//! ## Partial renders
//!
//! A page that fails to render is logged and omitted; the pages around it
//! keep their original indices so downstream errors and text can still be
//! correlated with the physical document. Zero successful pages is fatal.
//! A partially rendered document is never cached — only complete sequences
//! enter the cache, so a retry gets another chance at the bad pages.

use crate::cache::PageCache;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::source::DocumentSource;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One rendered page bitmap.
///
/// `index` is the 0-based position of the page in the source document and is
/// preserved even when earlier pages failed to render.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub index: usize,
    pub image: DynamicImage,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode a document into its ordered page sequence, consulting the cache.
///
/// # Returns
/// The full page sequence, ascending by `index`. Shared via `Arc` because
/// cache entries are read-only once inserted.
///
/// # Errors
/// * [`PipelineError::Decode`] — the bytes are not a parsable PDF/image
/// * [`PipelineError::NoPages`] — the document parsed but no page rendered
pub async fn render_document(
    source: &DocumentSource,
    config: &PipelineConfig,
    cache: &PageCache,
) -> Result<Arc<Vec<RenderedPage>>, PipelineError> {
    let fingerprint = source.fingerprint();

    if let Some(pages) = cache.get(&fingerprint) {
        debug!("cache hit for {fingerprint}: {} pages", pages.len());
        return Ok(pages);
    }

    let (pages, complete) = if source.is_pdf() {
        let bytes = source.bytes.clone();
        let name = source.name.clone();
        let scale = config.render_scale;
        let max_pixels = config.max_rendered_pixels;

        tokio::task::spawn_blocking(move || {
            render_pdf_blocking(&bytes, &name, scale, max_pixels)
        })
        .await
        .map_err(|e| PipelineError::Internal(format!("render task panicked: {e}")))??
    } else {
        (vec![decode_image(source)?], true)
    };

    if pages.is_empty() {
        return Err(PipelineError::NoPages {
            name: source.name.clone(),
        });
    }

    let pages = Arc::new(pages);
    if complete {
        cache.insert(fingerprint, Arc::clone(&pages));
    } else {
        debug!("partial render for '{}', not caching", source.name);
    }

    Ok(pages)
}

/// Blocking implementation of PDF page rendering.
///
/// Returns the rendered pages plus a flag indicating whether every page of
/// the document rendered successfully (the cache-eligibility condition).
fn render_pdf_blocking(
    bytes: &[u8],
    name: &str,
    scale: f32,
    max_pixels: u32,
) -> Result<(Vec<RenderedPage>, bool), PipelineError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| PipelineError::Decode {
            name: name.to_string(),
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {total_pages} pages");

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(scale)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);
    let mut complete = true;

    for idx in 0..total_pages {
        let rendered = pages
            .get(idx as u16)
            .and_then(|page| page.render_with_config(&render_config).map(|b| b.as_image()));

        match rendered {
            Ok(image) => {
                debug!("rendered page {idx} -> {}x{} px", image.width(), image.height());
                results.push(RenderedPage { index: idx, image });
            }
            Err(e) => {
                warn!("skipping page {idx}: {e:?}");
                complete = false;
            }
        }
    }

    Ok((results, complete))
}

/// Decode a raster image upload as a single page 0.
///
/// No resizing or re-encoding happens here; the preprocessor owns all pixel
/// transformation.
fn decode_image(source: &DocumentSource) -> Result<RenderedPage, PipelineError> {
    let image = image::load_from_memory(&source.bytes).map_err(|e| PipelineError::Decode {
        name: source.name.clone(),
        detail: e.to_string(),
    })?;

    debug!(
        "decoded image '{}' -> {}x{} px",
        source.name,
        image.width(),
        image.height()
    );

    Ok(RenderedPage { index: 0, image })
}
