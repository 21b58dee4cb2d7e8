//! Annotation primitives for barcode overlays
//!
//! Lines, discs and rectangles go through `imageproc`; text uses the bitmap
//! font in [`super::glyphs`]. All drawing clips to the image bounds.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::glyphs::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::models::{Point, Quad};

/// Named overlay colors (RGB)
pub mod colors {
    use image::Rgb;

    /// Outline of decodable regions
    pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    /// Outline of non-decodable regions and invalid labels
    pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
    /// Label of valid barcodes
    pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
}

/// Random color for cosmetic markers
pub fn random_color() -> Rgb<u8> {
    Rgb([rand::random(), rand::random(), rand::random()])
}

/// Draw a segment `thickness` pixels wide
pub fn draw_thick_line(img: &mut RgbImage, from: Point, to: Point, color: Rgb<u8>, thickness: u32) {
    let t = thickness.max(1) as f32;
    let start = -(t - 1.0) / 2.0;
    for oy in 0..thickness.max(1) {
        for ox in 0..thickness.max(1) {
            let dx = start + ox as f32;
            let dy = start + oy as f32;
            draw_line_segment_mut(
                img,
                (from.x + dx, from.y + dy),
                (to.x + dx, to.y + dy),
                color,
            );
        }
    }
}

/// Draw the closed outline of a region
pub fn draw_quad_outline(img: &mut RgbImage, quad: &Quad, color: Rgb<u8>, thickness: u32) {
    for i in 0..quad.len() {
        let a = quad[i];
        let b = quad[(i + 1) % quad.len()];
        draw_thick_line(img, a, b, color, thickness);
    }
}

/// Draw a filled disc
pub fn draw_marker(img: &mut RgbImage, center: Point, radius: i32, color: Rgb<u8>) {
    draw_filled_circle_mut(img, center.to_pixel(), radius, color);
}

/// Draw an axis-aligned rectangle outline
pub fn draw_rect(
    img: &mut RgbImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgb<u8>,
    thickness: u32,
) {
    for inset in 0..thickness.max(1) {
        let w = width.saturating_sub(2 * inset);
        let h = height.saturating_sub(2 * inset);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(w, h);
        draw_hollow_rect_mut(img, rect, color);
    }
}

/// Draw `text` with its bottom-left corner at `origin`
pub fn draw_text(img: &mut RgbImage, text: &str, origin: Point, color: Rgb<u8>, scale: u32) {
    let scale = scale.max(1) as i32;
    let (ox, oy) = origin.to_pixel();
    let top = oy - GLYPH_HEIGHT as i32 * scale;
    let (width, height) = (img.width() as i32, img.height() as i32);

    for (i, c) in text.chars().enumerate() {
        let left = ox + i as i32 * ADVANCE as i32 * scale;
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyphs::is_set(c, col, row) {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = left + col as i32 * scale + sx;
                        let py = top + row as i32 * scale + sy;
                        if px >= 0 && py >= 0 && px < width && py < height {
                            img.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_quad_outline_leaves_interior() {
        let mut img = RgbImage::new(40, 40);
        let quad = [
            Point::new(5.0, 5.0),
            Point::new(30.0, 5.0),
            Point::new(30.0, 30.0),
            Point::new(5.0, 30.0),
        ];
        draw_quad_outline(&mut img, &quad, colors::BLUE, 2);
        assert_eq!(*img.get_pixel(5, 5), colors::BLUE);
        assert_eq!(*img.get_pixel(17, 30), colors::BLUE);
        assert_eq!(*img.get_pixel(17, 17), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_text_clips_to_bounds() {
        let mut img = RgbImage::new(20, 10);
        draw_text(&mut img, "4006381333931", Point::new(-5.0, 12.0), colors::YELLOW, 2);
        assert!(count(&img, colors::YELLOW) > 0);

        let mut img = RgbImage::new(20, 10);
        draw_text(&mut img, "88", Point::new(100.0, 100.0), colors::YELLOW, 1);
        assert_eq!(count(&img, colors::YELLOW), 0);
    }

    #[test]
    fn test_rect_and_marker() {
        let mut img = RgbImage::new(30, 30);
        draw_rect(&mut img, 2, 2, 20, 20, colors::RED, 2);
        assert_eq!(*img.get_pixel(2, 10), colors::RED);
        assert_eq!(*img.get_pixel(3, 10), colors::RED);
        assert_eq!(*img.get_pixel(10, 10), Rgb([0, 0, 0]));

        draw_marker(&mut img, Point::new(10.0, 10.0), 2, colors::YELLOW);
        assert_eq!(*img.get_pixel(10, 10), colors::YELLOW);
    }
}
