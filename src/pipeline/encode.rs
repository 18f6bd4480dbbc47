//! Image encoding: binarized page → PNG bytes for the recognition engine.
//!
//! The engine ingests encoded image bytes (leptonica does the decode on its
//! side). PNG is chosen over JPEG because it is lossless — compression
//! artifacts around glyph edges are exactly what the binarization stage just
//! worked to remove, and an already-binarized page compresses extremely well
//! under PNG anyway.

use image::GrayImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a binarized page as PNG bytes.
pub fn encode_page(page: &GrayImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    page.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("encoded page -> {} bytes PNG", buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn encode_small_page() {
        let page = GrayImage::from_pixel(10, 10, Luma([255]));
        let bytes = encode_page(&page).expect("encode should succeed");
        assert!(!bytes.is_empty());
        // PNG magic
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
        // Round-trips through the decoder
        let decoded = image::load_from_memory(&bytes).expect("valid PNG");
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }
}
