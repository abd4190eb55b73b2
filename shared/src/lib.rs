//! Shared components for the SNR calibration tools.
//!
//! This crate holds the image-processing primitives the pipeline crates build
//! on: double-precision frames, FITS I/O, source detection, aperture
//! photometry and master-dark construction.

pub mod dark_frame;
pub mod image_proc;
