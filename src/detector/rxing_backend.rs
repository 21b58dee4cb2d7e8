//! Detection backend built on `rxing`
//!
//! rxing reports 1D symbols as a scan segment (two points) rather than a
//! quad, so those are widened into a box around the segment. Corner order
//! follows bottom-left, top-left, top-right, bottom-right.

use image::RgbImage;
use rxing::{Exceptions, RXingResult};

use super::BarcodeDetector;
use crate::error::DetectError;
use crate::models::{DetectionResult, Point, Quad};
use crate::utils::grayscale::rgb_to_luma_parallel;

/// Minimum half-height of the box drawn around a 1D scan segment
const MIN_HALF_HEIGHT: f32 = 8.0;
/// Half-height of that box relative to the segment length
const HALF_HEIGHT_RATIO: f32 = 0.15;

/// Multi-symbol detector backed by rxing
#[derive(Debug, Clone, Default)]
pub struct RxingDetector;

impl RxingDetector {
    /// Create a detector for all symbologies rxing supports
    pub fn new() -> Self {
        Self
    }
}

impl BarcodeDetector for RxingDetector {
    fn detect(&self, image: &RgbImage) -> Result<DetectionResult, DetectError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidImage("empty image".to_string()));
        }

        let luma = rgb_to_luma_parallel(image);
        let results = match rxing::helpers::detect_multiple_in_luma(luma, width, height) {
            Ok(results) => results,
            Err(Exceptions::NotFoundException(..)) => Vec::new(),
            Err(err) => return Err(DetectError::Backend(err.to_string())),
        };

        let mut corners = Vec::with_capacity(results.len() * 4);
        let mut payloads = Vec::with_capacity(results.len());
        let mut types = Vec::with_capacity(results.len());
        for result in &results {
            if let Some(quad) = region_of(result) {
                corners.extend_from_slice(&quad);
                payloads.push(result.getText().to_string());
                types.push(format!("{:?}", result.getBarcodeFormat()));
            }
        }
        let detection = DetectionResult::from_corners(&corners, payloads, types)
            .ok_or_else(|| DetectError::Backend("corner count not a multiple of 4".to_string()))?;

        log::debug!(
            "rxing: {} symbol(s) in {}x{} image",
            detection.region_count(),
            width,
            height
        );
        Ok(detection)
    }
}

fn region_of(result: &RXingResult) -> Option<Quad> {
    let points: Vec<Point> = result
        .getPoints()
        .iter()
        .map(|p| Point::new(p.x, p.y))
        .collect();

    match points.len() {
        0 => None,
        1 => Some(segment_box(points[0], points[0])),
        2 | 3 => Some(segment_box(points[0], points[1])),
        _ => Some([points[0], points[1], points[2], points[3]]),
    }
}

/// Box around the segment `left`-`right`, in bottom-left, top-left,
/// top-right, bottom-right order
fn segment_box(left: Point, right: Point) -> Quad {
    let dx = right.x - left.x;
    let dy = right.y - left.y;
    let len = left.distance(&right);
    let half = (len * HALF_HEIGHT_RATIO).max(MIN_HALF_HEIGHT);

    // Unit normal pointing "down" in image coordinates
    let (nx, ny) = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 1.0) };
    let (ox, oy) = (nx * half, ny * half);

    [
        left.translate(ox, oy),
        left.translate(-ox, -oy),
        right.translate(-ox, -oy),
        right.translate(ox, oy),
    ]
}
