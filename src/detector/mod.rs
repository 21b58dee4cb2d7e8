//! Barcode localization
//!
//! Symbol detection itself is delegated to a [`BarcodeDetector`] backend.
//! The [`Localizer`] wraps a backend, annotates what it found and turns the
//! decoded payloads into a checksum-validated [`BarcodeReadOutcome`].
//!
//! [`BarcodeReadOutcome`]: crate::models::BarcodeReadOutcome

pub mod localizer;
pub mod rxing_backend;

pub use localizer::{Localizer, RegionVerdict};
pub use rxing_backend::RxingDetector;

use image::RgbImage;

use crate::error::DetectError;
use crate::models::DetectionResult;

/// Capability to locate (and where possible decode) barcodes in an image
pub trait BarcodeDetector {
    /// Locate candidate regions in `image`.
    ///
    /// An image without barcodes is `Ok` with an empty result, not an error.
    fn detect(&self, image: &RgbImage) -> Result<DetectionResult, DetectError>;
}

impl<D: BarcodeDetector + ?Sized> BarcodeDetector for &D {
    fn detect(&self, image: &RgbImage) -> Result<DetectionResult, DetectError> {
        (**self).detect(image)
    }
}

impl<D: BarcodeDetector + ?Sized> BarcodeDetector for Box<D> {
    fn detect(&self, image: &RgbImage) -> Result<DetectionResult, DetectError> {
        (**self).detect(image)
    }
}
