//! Error types
//!
//! Missing or invalid barcodes are not errors: they are ordinary outcomes of
//! the acquisition loop. The types here cover the I/O edges: a detection
//! backend that cannot run, a frame source that cannot deliver, and the
//! record file.

use std::path::PathBuf;

/// Failure inside a detection backend
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The backend rejected the input image
    #[error("detector rejected image: {0}")]
    InvalidImage(String),

    /// The backend failed while scanning
    #[error("detector failed: {0}")]
    Backend(String),
}

/// Failure acquiring a frame
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No usable video device
    #[error("cannot open camera {device}: {reason}")]
    DeviceUnavailable {
        /// Device index
        device: u32,
        /// Backend message
        reason: String,
    },

    /// The device opened but no frame could be read
    #[error("failed to read frame: {0}")]
    Frame(String),

    /// A still image could not be loaded
    #[error("cannot open image {path}: {source}")]
    Image {
        /// Image path
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// The captured frame could not be written to disk
    #[error("cannot save frame to {path}: {source}")]
    Save {
        /// Target path
        path: PathBuf,
        /// Encoder error
        #[source]
        source: image::ImageError,
    },

    /// Reading the operator trigger failed
    #[error("trigger input failed: {0}")]
    Trigger(#[from] std::io::Error),
}

/// Failure reading or writing the record file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record file could not be opened, read or written
    #[error("record file {path}: {source}")]
    Io {
        /// Record file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A field contains the delimiter or a line break and cannot be stored
    #[error("field {field} contains a comma or line break")]
    InvalidField {
        /// Field name
        field: &'static str,
    },
}

/// Top-level application error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Frame acquisition failed
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Record store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Operator console I/O failed
    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),

    /// Writing an output image failed
    #[error("cannot write image {path}: {source}")]
    Output {
        /// Target path
        path: PathBuf,
        /// Encoder error
        #[source]
        source: image::ImageError,
    },
}
