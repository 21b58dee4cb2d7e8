//! Utility functions for image processing
//!
//! This module provides helpers for the acquisition loop:
//! - Grayscale conversion (RGB to luminance)
//! - Unsharp-mask sharpening
//! - Annotation drawing (outlines, markers, bitmap text)

pub mod draw;
pub mod glyphs;
pub mod grayscale;
pub mod sharpen;
