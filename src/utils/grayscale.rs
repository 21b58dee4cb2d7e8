//! Convert RGB image to grayscale for detector input
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8

use image::RgbImage;
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: i32 = 76;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;

#[inline]
fn luminance(px: &[u8]) -> u8 {
    let r = px[0] as i32;
    let g = px[1] as i32;
    let b = px[2] as i32;
    ((COEF_R * r + COEF_G * g + COEF_B * b) >> 8).min(255) as u8
}

/// Convert an RGB image to a flat luma buffer (one byte per pixel)
pub fn rgb_to_luma(image: &RgbImage) -> Vec<u8> {
    image.chunks_exact(3).map(luminance).collect()
}

/// Convert RGB to luma, processing rows in parallel
pub fn rgb_to_luma_parallel(image: &RgbImage) -> Vec<u8> {
    let width = image.width() as usize;
    let mut gray = vec![0u8; width * image.height() as usize];
    if width == 0 {
        return gray;
    }

    let src: &[u8] = image;
    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src_row = &src[y * width * 3..(y + 1) * width * 3];
        for (dst, px) in row.iter_mut().zip(src_row.chunks_exact(3)) {
            *dst = luminance(px);
        }
    });

    gray
}
