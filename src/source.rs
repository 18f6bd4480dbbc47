//! Input descriptor: the uploaded document plus the identity used for caching.
//!
//! The pipeline never touches the filesystem or the network — the caller
//! (file picker, HTTP handler, test harness) hands over the raw bytes together
//! with the metadata the browser-style upload surface already has: file name,
//! size, modification timestamp, and a MIME hint.

use serde::{Deserialize, Serialize};

/// An uploaded document: raw bytes plus upload metadata.
///
/// Immutable once constructed. The pipeline distinguishes only two kinds of
/// input: PDF (rendered page by page) and raster image (treated as a single
/// page). Anything else fails at decode time.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    /// Original file name, e.g. `transcript.pdf`.
    pub name: String,
    /// Size in bytes as reported by the upload surface.
    pub byte_size: u64,
    /// Last-modified timestamp in milliseconds since the Unix epoch.
    pub last_modified_ms: i64,
    /// MIME type hint from the upload surface, e.g. `application/pdf`.
    pub mime_type: String,
    /// The raw file contents.
    pub bytes: Vec<u8>,
}

impl DocumentSource {
    /// Build a source from upload metadata and contents.
    ///
    /// `byte_size` is taken from `bytes.len()`; callers holding a size from
    /// file metadata that differs from the buffer they pass should treat that
    /// as a bug on their side.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        last_modified_ms: i64,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            byte_size: bytes.len() as u64,
            last_modified_ms,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Whether this document should go through the PDF renderer.
    ///
    /// Matches on the MIME hint first and falls back to the file extension,
    /// since upload surfaces frequently report `application/octet-stream`
    /// for perfectly good PDFs.
    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case("application/pdf")
            || self.name.to_ascii_lowercase().ends_with(".pdf")
    }

    /// The cache identity of this upload.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            name: self.name.clone(),
            byte_size: self.byte_size,
            last_modified_ms: self.last_modified_ms,
        }
    }
}

/// Weak identity of an upload: `(name, size, mtime)`.
///
/// Used as the page-cache key so repeat runs over the same upload skip
/// rasterisation. Deliberately *not* a content hash: two files with identical
/// name, size, and timestamp but different bytes alias to the same entry.
/// For a local interactive tool this is an accepted trade-off, not a bug —
/// hashing every multi-megabyte upload would cost more than the collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub name: String,
    pub byte_size: u64,
    pub last_modified_ms: i64,
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.byte_size, self.last_modified_ms)
    }
}
