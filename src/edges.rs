//! Luminance conversion and edge extraction.
//!
//! The edge operator is the 3x3 "find edges" Laplacian:
//!
//! ```text
//! -1 -1 -1
//! -1  8 -1
//! -1 -1 -1
//! ```
//!
//! Negative responses are clipped to 0 and positive ones to 255, so only the
//! brighter side of a transition lights up. Neighbours outside the image
//! replicate the nearest border pixel (clamp-extend), which keeps a uniform
//! image at zero response all the way to its border.

use image::{GrayImage, Luma, RgbaImage};

use crate::mask::Mask;

/// Weight of the centre tap; the eight neighbours each weigh -1.
const CENTRE_WEIGHT: i32 = 8;

/// Convert an RGBA image to 8-bit luminance, ignoring alpha.
///
/// Uses the ITU-R 601-2 luma transform `0.299*R + 0.587*G + 0.114*B` in
/// 16-bit fixed point, rounded to nearest.
#[must_use]
pub fn luminance(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let lum = (u32::from(px[0]) * 19_595
            + u32::from(px[1]) * 38_470
            + u32::from(px[2]) * 7_471
            + 0x8000)
            >> 16;
        #[allow(clippy::cast_possible_truncation)]
        let lum = lum.min(255) as u8;
        Luma([lum])
    })
}

/// Apply the 3x3 find-edges kernel with clamp-extended borders.
#[must_use]
pub fn find_edges(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let sample = |x: i64, y: i64| -> i32 {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let cx = x.clamp(0, i64::from(width) - 1) as u32;
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let cy = y.clamp(0, i64::from(height) - 1) as u32;
        i32::from(gray.get_pixel(cx, cy)[0])
    };

    GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (i64::from(x), i64::from(y));
        let mut response = CENTRE_WEIGHT * sample(x, y);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    response -= sample(x + dx, y + dy);
                }
            }
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let response = response.clamp(0, 255) as u8;
        Luma([response])
    })
}

/// Threshold an edge map: a cell is an edge when its value is strictly above `threshold`.
#[must_use]
pub fn edge_mask(edges: &GrayImage, threshold: u8) -> Mask {
    Mask::from_fn(edges.width(), edges.height(), |x, y| {
        edges.get_pixel(x, y)[0] > threshold
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn luminance_matches_known_values() {
        let mut img = RgbaImage::new(4, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(3, 0, Rgba([0, 255, 0, 0]));

        let gray = luminance(&img);
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(1, 0)[0], 0);
        assert_eq!(gray.get_pixel(2, 0)[0], 76);
        // Alpha does not influence luminance.
        assert_eq!(gray.get_pixel(3, 0)[0], 150);
    }

    #[test]
    fn find_edges_is_zero_for_flat_image() {
        let gray = GrayImage::from_pixel(8, 8, Luma([255]));
        let edges = find_edges(&gray);
        assert!(
            edges.pixels().all(|p| p[0] == 0),
            "Flat image must have no edges, border included"
        );
    }

    #[test]
    fn find_edges_lights_bright_side_of_step() {
        // Left half black, right half white.
        let gray = GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
        let edges = find_edges(&gray);

        // First white column sees three black neighbours: 8*255 - 5*255 = 765 -> 255.
        assert_eq!(edges.get_pixel(4, 4)[0], 255);
        // Last black column has a negative response, clipped to 0.
        assert_eq!(edges.get_pixel(3, 4)[0], 0);
        // Far from the step nothing responds.
        assert_eq!(edges.get_pixel(0, 4)[0], 0);
        assert_eq!(edges.get_pixel(7, 4)[0], 0);
    }

    #[test]
    fn find_edges_handles_single_pixel() {
        let gray = GrayImage::from_pixel(1, 1, Luma([200]));
        assert_eq!(find_edges(&gray).get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn edge_mask_threshold_is_exclusive() {
        let edges = GrayImage::from_fn(3, 1, |x, _| Luma([[19, 20, 21][x as usize]]));
        let mask = edge_mask(&edges, 20);
        assert_eq!(mask.as_slice(), &[false, false, true]);
    }
}
