//! Frame sources
//!
//! A [`FrameSource`] blocks until its [`Trigger`] fires and then hands back
//! one still frame. [`StillImage`] replays an image from disk;
//! [`camera::CameraSource`] (feature `camera`) reads a video device.

#[cfg(feature = "camera")]
pub mod camera;
pub mod guidance;

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::CaptureError;

/// File name the captured frame is saved under
pub const CAPTURED_IMAGE: &str = "captured_image.jpg";
/// Prompt shown before replaying a still image
pub const CAPTURE_PROMPT: &str = "Press Enter to capture a photo";

/// Waits for the operator to request a capture
pub trait Trigger {
    /// Show `prompt` and block until the operator confirms
    fn wait(&mut self, prompt: &str) -> std::io::Result<()>;
}

/// Trigger that fires immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Trigger for Immediate {
    fn wait(&mut self, _prompt: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Source of still frames for the acquisition loop
pub trait FrameSource {
    /// Block until `trigger` fires, then return the captured frame
    fn capture(&mut self, trigger: &mut dyn Trigger) -> Result<RgbImage, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture(&mut self, trigger: &mut dyn Trigger) -> Result<RgbImage, CaptureError> {
        (**self).capture(trigger)
    }
}

/// Load an image from disk as 8-bit RGB
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage, CaptureError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| CaptureError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Replays a still image from disk on every capture
///
/// The file is re-read each time so a frame written by another program
/// between cycles is picked up.
#[derive(Debug, Clone)]
pub struct StillImage {
    path: PathBuf,
}

impl StillImage {
    /// Source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Image path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for StillImage {
    fn capture(&mut self, trigger: &mut dyn Trigger) -> Result<RgbImage, CaptureError> {
        trigger.wait(CAPTURE_PROMPT)?;
        let frame = load_rgb(&self.path)?;
        log::info!(
            "loaded {} ({}x{})",
            self.path.display(),
            frame.width(),
            frame.height()
        );
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ean_reader_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_still_image_roundtrip() {
        let path = temp_path("still.png");
        let img = RgbImage::from_pixel(8, 4, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let mut source = StillImage::new(&path);
        let frame = source.capture(&mut Immediate).unwrap();
        assert_eq!(frame, img);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_image() {
        let mut source = StillImage::new(temp_path("missing.png"));
        assert!(matches!(
            source.capture(&mut Immediate),
            Err(CaptureError::Image { .. })
        ));
    }

    /// Records the prompts it was asked to wait on
    #[derive(Default)]
    struct Prompts(Vec<String>);

    impl Trigger for Prompts {
        fn wait(&mut self, prompt: &str) -> std::io::Result<()> {
            self.0.push(prompt.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_still_image_waits_for_trigger() {
        let path = temp_path("triggered.png");
        RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let mut prompts = Prompts::default();
        let mut source = StillImage::new(&path);
        assert!(source.capture(&mut prompts).is_ok());
        assert!(source.capture(&mut prompts).is_ok());
        assert_eq!(prompts.0, vec![CAPTURE_PROMPT, CAPTURE_PROMPT]);
        std::fs::remove_file(&path).ok();
    }
}
