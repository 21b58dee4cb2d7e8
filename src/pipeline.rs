//! Acquisition loop
//!
//! One read cycle localizes the captured frame as-is, then keeps re-running
//! the localizer on progressively sharper versions of the frame until a
//! valid EAN-13 is found or the attempt budget runs out:
//!
//! ```text
//! Initial -> Localizing -> DoneValid
//!                |  ^
//!                v  |
//!               Retry  ----> DoneExhausted (budget spent)
//! ```
//!
//! Every retry sharpens a fresh copy of the raw frame; strengths never
//! compound.

use image::RgbImage;

use crate::config::ReaderConfig;
use crate::detector::{BarcodeDetector, Localizer};
use crate::models::{BarcodeReadOutcome, SharpenStrength};
use crate::utils::sharpen::sharpen_into;

/// State of a read cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// Frame captured, nothing localized yet
    Initial,
    /// Next step runs the localizer on the processed image
    Localizing,
    /// Last attempt failed and budget remains; next step sharpens
    Retry,
    /// A valid barcode was read
    DoneValid,
    /// Attempt budget spent without a valid barcode
    DoneExhausted,
}

impl AcquisitionState {
    /// Whether the cycle has finished
    pub fn is_terminal(self) -> bool {
        matches!(self, AcquisitionState::DoneValid | AcquisitionState::DoneExhausted)
    }
}

/// Receives feedback while the loop retries
pub trait ProgressSink {
    /// Called before attempt `attempt` (1-based) runs at `strength`
    fn retrying(&mut self, attempt: usize, strength: SharpenStrength);
}

/// Sink that ignores progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn retrying(&mut self, _attempt: usize, _strength: SharpenStrength) {}
}

/// Result of a finished read cycle
#[derive(Debug, Clone)]
pub struct AcquisitionReport {
    /// Terminal state
    pub state: AcquisitionState,
    /// Outcome of the last localization
    pub outcome: BarcodeReadOutcome,
    /// Localizations performed
    pub attempts: usize,
    /// Strength used for the last localization
    pub strength: SharpenStrength,
    /// Last processed image with annotations
    pub processed: RgbImage,
}

impl AcquisitionReport {
    /// The validated barcode number, if the cycle succeeded
    pub fn barcode(&self) -> Option<&str> {
        (self.state == AcquisitionState::DoneValid).then_some(self.outcome.barcode_number.as_str())
    }
}

/// Drives read cycles with a localizer and an attempt budget
#[derive(Debug, Clone)]
pub struct Acquisition<D> {
    localizer: Localizer<D>,
    max_attempts: usize,
}

impl<D: BarcodeDetector> Acquisition<D> {
    /// Create a controller allowing `max_attempts` localizations per cycle
    /// (clamped to 1-10)
    pub fn new(localizer: Localizer<D>, max_attempts: usize) -> Self {
        Self {
            localizer,
            max_attempts: max_attempts.clamp(1, SharpenStrength::MAX as usize),
        }
    }

    /// Create a controller from session settings
    pub fn from_config(detector: D, config: &ReaderConfig) -> Self {
        let localizer = Localizer::new(detector).with_prefix_digits(config.prefix_digits);
        Self::new(localizer, config.max_attempts)
    }

    /// The wrapped localizer
    pub fn localizer(&self) -> &Localizer<D> {
        &self.localizer
    }

    /// Localizations allowed per cycle
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Begin a read cycle on `raw`
    pub fn start<'r>(&self, raw: &'r RgbImage) -> ReadCycle<'r> {
        ReadCycle {
            raw,
            processed: RgbImage::new(0, 0),
            strength: SharpenStrength::ZERO,
            attempts: 0,
            state: AcquisitionState::Initial,
            outcome: BarcodeReadOutcome::none(),
        }
    }

    /// Run a full read cycle on `raw`
    pub fn run(&self, raw: &RgbImage, progress: &mut dyn ProgressSink) -> AcquisitionReport {
        let mut cycle = self.start(raw);
        while !cycle.state().is_terminal() {
            cycle.step(self, progress);
        }
        cycle.finish()
    }
}

/// One in-progress read cycle
///
/// Borrows the raw frame and owns the processed image for the cycle's
/// lifetime.
#[derive(Debug)]
pub struct ReadCycle<'r> {
    raw: &'r RgbImage,
    processed: RgbImage,
    strength: SharpenStrength,
    attempts: usize,
    state: AcquisitionState,
    outcome: BarcodeReadOutcome,
}

impl ReadCycle<'_> {
    /// Current state
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Localizations performed so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Strength of the current processed image
    pub fn strength(&self) -> SharpenStrength {
        self.strength
    }

    /// Current processed image
    pub fn processed(&self) -> &RgbImage {
        &self.processed
    }

    /// Advance by one transition and return the new state
    pub fn step<D: BarcodeDetector>(
        &mut self,
        acquisition: &Acquisition<D>,
        progress: &mut dyn ProgressSink,
    ) -> AcquisitionState {
        self.state = match self.state {
            AcquisitionState::Initial => {
                self.processed = self.raw.clone();
                self.strength = SharpenStrength::ZERO;
                AcquisitionState::Localizing
            }
            AcquisitionState::Localizing => {
                let (_, outcome) = acquisition.localizer.localize(&mut self.processed);
                self.attempts += 1;
                log::debug!(
                    "attempt {}/{} at strength {}: valid={}",
                    self.attempts,
                    acquisition.max_attempts,
                    self.strength.value(),
                    outcome.is_valid
                );
                let valid = outcome.is_valid;
                self.outcome = outcome;
                if valid {
                    AcquisitionState::DoneValid
                } else if self.attempts < acquisition.max_attempts {
                    AcquisitionState::Retry
                } else {
                    AcquisitionState::DoneExhausted
                }
            }
            AcquisitionState::Retry => match self.strength.next() {
                Some(next) => {
                    self.strength = next;
                    progress.retrying(self.attempts + 1, next);
                    sharpen_into(self.raw, next.coefficient(), &mut self.processed);
                    AcquisitionState::Localizing
                }
                None => AcquisitionState::DoneExhausted,
            },
            done => done,
        };
        self.state
    }

    /// Consume the cycle into its report
    pub fn finish(self) -> AcquisitionReport {
        match self.state {
            AcquisitionState::DoneValid => {
                log::info!(
                    "barcode {} read after {} attempt(s)",
                    self.outcome.barcode_number,
                    self.attempts
                );
            }
            AcquisitionState::DoneExhausted => {
                log::info!("no valid barcode after {} attempt(s)", self.attempts);
            }
            _ => {}
        }
        AcquisitionReport {
            state: self.state,
            outcome: self.outcome,
            attempts: self.attempts,
            strength: self.strength,
            processed: self.processed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use crate::models::{DetectionResult, Point};
    use std::cell::Cell;

    /// Decodes a valid barcode on the `succeed_on`-th call (0-based)
    struct SucceedOnCall {
        calls: Cell<usize>,
        succeed_on: Option<usize>,
    }

    impl SucceedOnCall {
        fn new(succeed_on: Option<usize>) -> Self {
            Self {
                calls: Cell::new(0),
                succeed_on,
            }
        }
    }

    impl BarcodeDetector for SucceedOnCall {
        fn detect(&self, _image: &RgbImage) -> Result<DetectionResult, DetectError> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            let mut detection = DetectionResult::new();
            if Some(call) == self.succeed_on {
                let quad = [
                    Point::new(2.0, 8.0),
                    Point::new(2.0, 2.0),
                    Point::new(12.0, 2.0),
                    Point::new(12.0, 8.0),
                ];
                detection.push_decoded(quad, "4006381333931", "EAN_13");
            }
            Ok(detection)
        }
    }

    fn frame() -> RgbImage {
        RgbImage::from_pixel(16, 16, image::Rgb([128, 128, 128]))
    }

    #[test]
    fn test_step_sequence() {
        let acquisition = Acquisition::new(Localizer::new(SucceedOnCall::new(Some(1))), 10);
        let raw = frame();
        let mut cycle = acquisition.start(&raw);
        let mut progress = NoProgress;

        assert_eq!(cycle.state(), AcquisitionState::Initial);
        assert_eq!(cycle.step(&acquisition, &mut progress), AcquisitionState::Localizing);
        assert_eq!(cycle.step(&acquisition, &mut progress), AcquisitionState::Retry);
        assert_eq!(cycle.step(&acquisition, &mut progress), AcquisitionState::Localizing);
        assert_eq!(cycle.strength(), SharpenStrength::new(1));
        assert_eq!(cycle.step(&acquisition, &mut progress), AcquisitionState::DoneValid);
        // Terminal states stay put
        assert_eq!(cycle.step(&acquisition, &mut progress), AcquisitionState::DoneValid);
        assert_eq!(cycle.attempts(), 2);
    }

    #[test]
    fn test_immediate_success() {
        let acquisition = Acquisition::new(Localizer::new(SucceedOnCall::new(Some(0))), 10);
        let report = acquisition.run(&frame(), &mut NoProgress);
        assert_eq!(report.state, AcquisitionState::DoneValid);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.strength, SharpenStrength::ZERO);
        assert_eq!(report.barcode(), Some("4006381333931"));
    }

    #[test]
    fn test_budget_is_clamped() {
        let acquisition = Acquisition::new(Localizer::new(SucceedOnCall::new(None)), 99);
        assert_eq!(acquisition.max_attempts(), 10);

        let acquisition = Acquisition::new(Localizer::new(SucceedOnCall::new(None)), 3);
        let report = acquisition.run(&frame(), &mut NoProgress);
        assert_eq!(report.state, AcquisitionState::DoneExhausted);
        assert_eq!(report.attempts, 3);
        assert_eq!(report.barcode(), None);
    }
}
