//! Region classification and annotation
//!
//! Decoded payloads are reduced to digits and checked as EAN-13; every
//! located region is outlined on the image, decodable ones in blue.

use image::RgbImage;

use super::BarcodeDetector;
use crate::decoder::digits::{extract_digits, strip_prefix_digits, tagged_payload};
use crate::decoder::ean13::is_valid_ean13;
use crate::models::{BarcodeReadOutcome, DetectionResult, Point, Quad};
use crate::utils::draw::{self, colors};

/// Outline thickness in pixels
const OUTLINE_THICKNESS: u32 = 2;
/// Corner marker radius in pixels
const MARKER_RADIUS: i32 = 2;
/// Label font scale (font pixels to image pixels)
const LABEL_SCALE: u32 = 3;
/// Prefix of the label drawn on regions failing the checksum
pub const INVALID_LABEL: &str = "EAN13 IS INVALID";

/// Classification of one located region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionVerdict {
    /// Located but not decoded
    Undecoded,
    /// Decoded and the number passed the EAN-13 checksum
    Valid(String),
    /// Decoded but the extracted number failed the checksum
    Invalid(String),
}

impl RegionVerdict {
    /// Outcome contributed by this region, if any
    fn outcome(&self) -> Option<BarcodeReadOutcome> {
        match self {
            RegionVerdict::Undecoded => None,
            RegionVerdict::Valid(n) => Some(BarcodeReadOutcome::new(n.clone(), true)),
            RegionVerdict::Invalid(n) => Some(BarcodeReadOutcome::new(n.clone(), false)),
        }
    }
}

/// Runs a detection backend and validates what it decodes
///
/// Every decodable region overwrites the outcome in detection order, so with
/// several barcodes in one frame the last decodable region decides, even if
/// an earlier one was valid.
// TODO: decide whether the first valid region should win once multi-barcode
// frames show up in practice; callers currently see only the last one.
#[derive(Debug, Clone)]
pub struct Localizer<D> {
    detector: D,
    prefix_digits: usize,
}

impl<D: BarcodeDetector> Localizer<D> {
    /// Wrap a detection backend
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            prefix_digits: 0,
        }
    }

    /// Number of leading extracted digits to drop before validation.
    ///
    /// Needed only for backends whose payloads carry digits ahead of the
    /// barcode number.
    pub fn with_prefix_digits(mut self, prefix_digits: usize) -> Self {
        self.prefix_digits = prefix_digits;
        self
    }

    /// The wrapped backend
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Configured prefix trim
    pub fn prefix_digits(&self) -> usize {
        self.prefix_digits
    }

    /// Detect barcodes in `image`, annotate them in place and report the
    /// outcome.
    ///
    /// Detector failures are reported as "no barcode".
    pub fn localize(&self, image: &mut RgbImage) -> (DetectionResult, BarcodeReadOutcome) {
        let detection = match self.detector.detect(image) {
            Ok(detection) => detection,
            Err(err) => {
                log::warn!("barcode detection failed: {}", err);
                DetectionResult::new()
            }
        };

        if detection.is_empty() {
            log::info!("no barcode");
            return (detection, BarcodeReadOutcome::none());
        }

        let (verdicts, outcome) = self.classify(&detection);
        for (quad, verdict) in detection.regions().iter().zip(&verdicts) {
            annotate(image, quad, verdict);
        }

        log::debug!(
            "{} region(s), outcome number={:?} valid={}",
            detection.region_count(),
            outcome.barcode_number,
            outcome.is_valid
        );
        (detection, outcome)
    }

    /// Classify every region of `detection` without touching any image
    pub fn classify(&self, detection: &DetectionResult) -> (Vec<RegionVerdict>, BarcodeReadOutcome) {
        let mut outcome = BarcodeReadOutcome::none();
        let verdicts: Vec<RegionVerdict> = (0..detection.region_count())
            .map(|idx| {
                let verdict = self.verdict(detection, idx);
                if let Some(o) = verdict.outcome() {
                    outcome = o;
                }
                verdict
            })
            .collect();
        (verdicts, outcome)
    }

    fn verdict(&self, detection: &DetectionResult, idx: usize) -> RegionVerdict {
        let Some((payload, kind)) = detection.decoded(idx) else {
            return RegionVerdict::Undecoded;
        };
        let digits = extract_digits(&tagged_payload(kind, payload));
        let number = strip_prefix_digits(&digits, self.prefix_digits).to_string();
        if is_valid_ean13(&number) {
            RegionVerdict::Valid(number)
        } else {
            RegionVerdict::Invalid(number)
        }
    }
}

fn annotate(image: &mut RgbImage, quad: &Quad, verdict: &RegionVerdict) {
    let outline = match verdict {
        RegionVerdict::Undecoded => colors::RED,
        _ => colors::BLUE,
    };
    draw::draw_quad_outline(image, quad, outline, OUTLINE_THICKNESS);
    for corner in quad {
        draw::draw_marker(image, *corner, MARKER_RADIUS, draw::random_color());
    }

    // Labels hang off the second corner (top-left for the rxing backend)
    let anchor: Point = quad[1];
    match verdict {
        RegionVerdict::Undecoded => {}
        RegionVerdict::Valid(number) => {
            draw::draw_text(image, number, anchor, colors::YELLOW, LABEL_SCALE);
        }
        RegionVerdict::Invalid(number) => {
            let label = format!("{}{}", INVALID_LABEL, number);
            draw::draw_text(image, &label, anchor, colors::RED, LABEL_SCALE);
        }
    }
}
