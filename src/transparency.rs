//! Alpha clearing for near-white background pixels.
//!
//! Both functions copy the source into a fresh buffer before touching alpha,
//! so every decision is made against the original pixel values.

use image::{Rgba, RgbaImage};

use crate::mask::Mask;

/// Whether all three color channels are at or above `threshold`.
#[must_use]
pub fn is_near_white(px: &Rgba<u8>, threshold: u8) -> bool {
    px[0] >= threshold && px[1] >= threshold && px[2] >= threshold
}

/// Clear alpha on near-white pixels that lie outside `subject`.
///
/// Pixels inside the subject, and pixels that are not near-white, are copied
/// unchanged including their original alpha.
///
/// # Panics
///
/// Panics if `subject` and `image` differ in size.
#[must_use]
pub fn apply_selective(image: &RgbaImage, subject: &Mask, white_threshold: u8) -> RgbaImage {
    assert_eq!(
        (image.width(), image.height()),
        (subject.width(), subject.height()),
        "subject mask must match image dimensions"
    );

    let mut output = image.clone();
    for (px, &keep) in output.pixels_mut().zip(subject.as_slice()) {
        if !keep && is_near_white(px, white_threshold) {
            px[3] = 0;
        }
    }
    output
}

/// Clear alpha on every near-white pixel, with no subject protection.
#[must_use]
pub fn apply_naive(image: &RgbaImage, white_threshold: u8) -> RgbaImage {
    let mut output = image.clone();
    for px in output.pixels_mut() {
        if is_near_white(px, white_threshold) {
            px[3] = 0;
        }
    }
    output
}
