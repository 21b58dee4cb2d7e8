//! Preview guidance overlay
//!
//! A centred square shows where to hold the barcode, with the capture hint
//! above it. Colors change every frame. The overlay goes on a preview copy;
//! the captured frame itself stays clean.

use image::RgbImage;

use crate::models::Point;
use crate::utils::draw::{draw_rect, draw_text, random_color};

/// Side of the guidance square in pixels
pub const GUIDE_SIZE: u32 = 300;
/// Capture hint drawn above the square
pub const GUIDE_TEXT: &str = "PRESS ANY KEY TO TAKE A PHOTO";

const GUIDE_THICKNESS: u32 = 2;
const TEXT_SCALE: u32 = 2;
const TEXT_OFFSET: f32 = 20.0;

/// Top-left corner of the guidance square for a frame of this size
pub fn guide_origin(width: u32, height: u32) -> (i32, i32) {
    (
        (width as i32 - GUIDE_SIZE as i32) / 2,
        (height as i32 - GUIDE_SIZE as i32) / 2,
    )
}

/// Draw the guidance overlay onto `preview`
pub fn draw_guidance(preview: &mut RgbImage) {
    let (x, y) = guide_origin(preview.width(), preview.height());
    draw_rect(preview, x, y, GUIDE_SIZE, GUIDE_SIZE, random_color(), GUIDE_THICKNESS);
    let anchor = Point::new(x as f32 - TEXT_OFFSET, y as f32 - TEXT_OFFSET);
    draw_text(preview, GUIDE_TEXT, anchor, random_color(), TEXT_SCALE);
}

/// Copy of `frame` with the guidance overlay
pub fn preview_of(frame: &RgbImage) -> RgbImage {
    let mut preview = frame.clone();
    draw_guidance(&mut preview);
    preview
}
