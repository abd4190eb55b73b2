//! Point-source detection.
//!
//! Detection is a capability contract: given a background-subtracted frame, a
//! PSF full-width-half-max and an absolute threshold, a [`SourceDetector`]
//! returns the centroids of the point sources it accepts. The pipeline only
//! depends on the trait, so any conforming star finder can be substituted.
//!
//! # Module Organization
//!
//! - **config**: Builds `DAOStarFinderConfig` values from detection parameters
//! - **dao**: [`DaoDetector`], the DAOFIND-style detector backed by starfield

pub mod config;
pub mod dao;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{dao_config, DaoShapeFilter};
pub use dao::DaoDetector;

/// Sub-pixel position of a detected point source.
///
/// `x` is the column coordinate and `y` the row coordinate, with pixel centers
/// at integer values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Centroid {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Errors from running a source detector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// FWHM or threshold outside the range the detector accepts.
    #[error("invalid detection parameters: {0}")]
    InvalidParameters(String),

    /// The underlying star finder rejected its configuration.
    #[error("star finder creation failed: {0}")]
    Finder(String),
}

/// Point-source detection capability.
pub trait SourceDetector {
    /// Detect point sources in `image`.
    ///
    /// * `fwhm` - Full-width-half-max of the expected PSF in pixels
    /// * `threshold` - Absolute detection threshold in image units
    ///
    /// An empty vector means the detector ran and found nothing.
    fn detect(
        &self,
        image: &ArrayView2<f64>,
        fwhm: f64,
        threshold: f64,
    ) -> Result<Vec<Centroid>, DetectionError>;
}

impl<D: SourceDetector + ?Sized> SourceDetector for &D {
    fn detect(
        &self,
        image: &ArrayView2<f64>,
        fwhm: f64,
        threshold: f64,
    ) -> Result<Vec<Centroid>, DetectionError> {
        (**self).detect(image, fwhm, threshold)
    }
}
