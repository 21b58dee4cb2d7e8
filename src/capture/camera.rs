//! Video device capture using nokhwa
//!
//! The device is opened per capture and released afterwards. Before waiting
//! for the trigger one snapshot with the guidance overlay is written to the
//! preview path for framing; it is not refreshed while waiting.

use std::path::PathBuf;

use image::RgbImage;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

use super::{CAPTURED_IMAGE, FrameSource, Trigger, guidance};
use crate::error::CaptureError;

/// Frames dropped after opening so exposure can settle
const WARMUP_FRAMES: usize = 5;

/// Captures stills from a video device
#[derive(Debug, Clone)]
pub struct CameraSource {
    device: u32,
    preview_path: Option<PathBuf>,
    save_path: PathBuf,
}

impl CameraSource {
    /// Source for device `device` (0 is the default camera)
    pub fn new(device: u32) -> Self {
        Self {
            device,
            preview_path: None,
            save_path: PathBuf::from(CAPTURED_IMAGE),
        }
    }

    /// Write one guided snapshot to `path` before waiting for the trigger
    pub fn with_preview(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_path = Some(path.into());
        self
    }

    fn open(&self) -> Result<Camera, CaptureError> {
        let unavailable = |reason: String| CaptureError::DeviceUnavailable {
            device: self.device,
            reason,
        };
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(CameraIndex::Index(self.device), requested)
            .map_err(|e| unavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| unavailable(e.to_string()))?;
        log::info!(
            "camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );
        Ok(camera)
    }

    fn grab(camera: &mut Camera) -> Result<RgbImage, CaptureError> {
        let frame = camera
            .frame()
            .map_err(|e| CaptureError::Frame(e.to_string()))?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Frame(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CaptureError::Frame("frame buffer size mismatch".to_string()))
    }
}

impl FrameSource for CameraSource {
    fn capture(&mut self, trigger: &mut dyn Trigger) -> Result<RgbImage, CaptureError> {
        let mut camera = self.open()?;

        for _ in 0..WARMUP_FRAMES {
            if let Err(err) = Self::grab(&mut camera) {
                log::warn!("dropping warm-up frame: {}", err);
            }
        }

        if let Some(path) = &self.preview_path {
            let preview = guidance::preview_of(&Self::grab(&mut camera)?);
            if let Err(err) = preview.save(path) {
                log::warn!("cannot write preview {}: {}", path.display(), err);
            }
        }

        trigger.wait(guidance::GUIDE_TEXT)?;

        let frame = Self::grab(&mut camera)?;
        if let Err(err) = camera.stop_stream() {
            log::warn!("failed to stop camera stream: {}", err);
        }

        frame
            .save(&self.save_path)
            .map_err(|source| CaptureError::Save {
                path: self.save_path.clone(),
                source,
            })?;
        Ok(frame)
    }
}
