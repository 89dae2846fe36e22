//! Fixed page-image filter chain applied before detection.

use image::{GrayImage, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::gaussian_blur_f32;

/// Blur strength matching a 5x5 Gaussian kernel with sigma 1.
const BLUR_SIGMA: f32 = 1.0;

/// Grayscale, equalize the histogram, then apply a light Gaussian blur.
///
/// Scanned gazette pages have wildly varying exposure; equalization
/// stabilizes contrast for the detector and the blur suppresses scan grain
/// before OCR crops are taken from the same image.
#[must_use]
pub fn preprocess_page(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let equalized = equalize_histogram(&gray);
    gaussian_blur_f32(&equalized, BLUR_SIGMA)
}
