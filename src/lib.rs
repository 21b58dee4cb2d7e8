//! ean_reader - EAN-13 barcode acquisition with product records
//!
//! Reads EAN-13 barcodes from still frames: localize the symbol, validate its
//! check digit, and retry on progressively sharpened copies of the frame when
//! the read fails. Successful reads key a flat-file product record store.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Frame sources (still images, console trigger, optional camera)
pub mod capture;
/// Environment-driven settings
pub mod config;
/// Payload decoding (digit extraction, EAN-13 checksum)
pub mod decoder;
/// Barcode localization over a pluggable detection backend
pub mod detector;
/// Error types
pub mod error;
/// Core data structures (DetectionResult, BarcodeReadOutcome, ProductInfo, etc.)
pub mod models;
/// Bounded retry loop with progressive sharpening
pub mod pipeline;
/// Interactive operator session
pub mod session;
/// Flat-file product record store
pub mod store;
/// Utility functions (grayscale, sharpening, drawing)
pub mod utils;

pub use decoder::{extract_digits, is_valid_ean13};
pub use detector::{BarcodeDetector, Localizer, RxingDetector};
pub use error::{AppError, CaptureError, DetectError, StoreError};
pub use models::{BarcodeReadOutcome, DetectionResult, Point, ProductInfo, SharpenStrength};
pub use pipeline::{Acquisition, AcquisitionReport, AcquisitionState, NoProgress, ProgressSink};
pub use store::ProductStore;
pub use utils::sharpen::sharpen;

use image::RgbImage;

/// Localize barcodes in `image` once, annotating it in place
///
/// Uses the default rxing backend with no prefix trimming.
pub fn scan(image: &mut RgbImage) -> (DetectionResult, BarcodeReadOutcome) {
    Localizer::new(RxingDetector::new()).localize(image)
}

/// Run a full read cycle on `image` with default settings
///
/// # Returns
/// The report of the finished cycle; [`AcquisitionReport::barcode`] holds
/// the validated number on success
pub fn read_barcode(image: &RgbImage) -> AcquisitionReport {
    Acquisition::new(
        Localizer::new(RxingDetector::new()),
        config::DEFAULT_MAX_ATTEMPTS,
    )
    .run(image, &mut NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_blank() {
        let mut image = RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255]));
        let untouched = image.clone();
        let (detection, outcome) = scan(&mut image);
        assert!(detection.is_empty());
        assert!(!outcome.is_valid);
        assert_eq!(image, untouched);
    }

    #[test]
    fn test_read_blank_exhausts_budget() {
        let image = RgbImage::from_pixel(32, 32, image::Rgb([200, 200, 200]));
        let report = read_barcode(&image);
        assert_eq!(report.state, AcquisitionState::DoneExhausted);
        assert_eq!(report.attempts, 10);
        assert_eq!(report.barcode(), None);
    }
}
