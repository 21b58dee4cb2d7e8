//! Localization outcome and sharpening strength

/// Result of one localization pass
///
/// `is_valid == false` with an empty number means nothing decodable was
/// found; with a non-empty number it means a payload was decoded but failed
/// the EAN-13 checksum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarcodeReadOutcome {
    /// Extracted barcode digits (may be empty)
    pub barcode_number: String,
    /// Whether `barcode_number` passed EAN-13 validation
    pub is_valid: bool,
}

impl BarcodeReadOutcome {
    /// Nothing decodable found
    pub fn none() -> Self {
        Self::default()
    }

    /// Outcome for a decoded number
    pub fn new(barcode_number: String, is_valid: bool) -> Self {
        Self {
            barcode_number,
            is_valid,
        }
    }

    /// True when a payload was decoded but rejected by the checksum
    pub fn is_checksum_failure(&self) -> bool {
        !self.is_valid && !self.barcode_number.is_empty()
    }
}

/// Sharpening strength selected by the acquisition loop (0-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SharpenStrength(u8);

impl SharpenStrength {
    /// Upper bound of the strength control
    pub const MAX: u8 = 10;

    /// No sharpening
    pub const ZERO: Self = Self(0);

    /// Create a strength, clamped to `0..=MAX`
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// Raw strength value
    pub fn value(self) -> u8 {
        self.0
    }

    /// Unsharp-mask coefficient for this strength (`strength / 2`)
    pub fn coefficient(self) -> f32 {
        self.0 as f32 / 2.0
    }

    /// Next strength step, or `None` at the upper bound
    pub fn next(self) -> Option<Self> {
        (self.0 < Self::MAX).then(|| Self(self.0 + 1))
    }
}
