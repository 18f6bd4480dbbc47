//! Preprocessing: grayscale + threshold binarization.
//!
//! Scanned transcripts arrive with background tint, JPEG noise, and uneven
//! lighting. Reducing every pixel to pure black or pure white before
//! recognition removes most of that noise and measurably improves Tesseract
//! output on printed text.
//!
//! This stage is a total function: any input produces an output of identical
//! dimensions, even a degenerate all-black or all-white page. Whether such a
//! page is *readable* is the recognition stage's problem.

use image::{DynamicImage, GrayImage, Luma};

/// Binarize a page: luminance above `threshold` becomes white, the rest black.
///
/// Luminance uses the BT.601 weights (`0.299 R + 0.587 G + 0.114 B`), which
/// track perceived brightness of printed text better than a plain channel
/// average. The output is a fresh 8-bit grayscale buffer; the input bitmap is
/// never touched, so cached pages stay pristine across runs.
pub fn binarize(image: &DynamicImage, threshold: u8) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut out = GrayImage::new(rgb.width(), rgb.height());

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        let value = if luma > f32::from(threshold) { 255 } else { 0 };
        out.put_pixel(x, y, Luma([value]));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([r, g, b])))
    }

    #[test]
    fn dimensions_are_preserved() {
        let out = binarize(&solid(128, 128, 128), 180);
        assert_eq!((out.width(), out.height()), (4, 3));
    }

    #[test]
    fn white_stays_white_black_stays_black() {
        assert_eq!(binarize(&solid(255, 255, 255), 180).get_pixel(0, 0).0, [255]);
        assert_eq!(binarize(&solid(0, 0, 0), 180).get_pixel(0, 0).0, [0]);
    }

    #[test]
    fn threshold_splits_gray() {
        // Gray 200 has luminance 200: above 180, below 220.
        let gray = solid(200, 200, 200);
        assert_eq!(binarize(&gray, 180).get_pixel(0, 0).0, [255]);
        assert_eq!(binarize(&gray, 220).get_pixel(0, 0).0, [0]);
    }

    #[test]
    fn luminance_is_weighted_not_averaged() {
        // Pure red: L = 0.299 * 255 ≈ 76 → black at threshold 180 even though
        // the channel average would be 85 against a naive interpretation.
        assert_eq!(binarize(&solid(255, 0, 0), 180).get_pixel(0, 0).0, [0]);
        // Pure green: L ≈ 150 → still black at 180, white at 100.
        assert_eq!(binarize(&solid(0, 255, 0), 180).get_pixel(0, 0).0, [0]);
        assert_eq!(binarize(&solid(0, 255, 0), 100).get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn output_is_strictly_two_level() {
        let mut img = RgbImage::new(16, 1);
        for (x, _, p) in img.enumerate_pixels_mut() {
            let v = (x * 16) as u8;
            *p = Rgb([v, v, v]);
        }
        let out = binarize(&DynamicImage::ImageRgb8(img), 180);
        assert!(out.pixels().all(|p| p.0 == [0] || p.0 == [255]));
    }
}
