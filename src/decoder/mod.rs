//! Barcode payload decoding
//!
//! Everything that happens to a payload after the detector hands it over:
//! - Digit extraction (symbology tag and non-digit removal)
//! - EAN-13 checksum validation

/// Digit extraction from decoded payloads
pub mod digits;
/// EAN-13 check digit computation and validation
pub mod ean13;

pub use digits::{extract_digits, strip_prefix_digits};
pub use ean13::{ean13_check_digit, is_valid_ean13};
