//! DAOStarFinder configuration for calibration-frame source detection.
//!
//! The pipeline only supplies a FWHM and an absolute threshold. Everything
//! else the DAO algorithm needs (kernel truncation, shape filters, border
//! handling) lives in [`DaoShapeFilter`], whose defaults follow the classic
//! DAOFIND defaults: circular kernel truncated at 1.5σ, sharpness in
//! `[0.2, 1.0]`, roundness in `[-1.0, 1.0]`, sources at the border kept.

use starfield::image::starfinders::DAOStarFinderConfig;
use std::ops::RangeInclusive;

/// Shape and housekeeping parameters for DAOStarFinder.
#[derive(Debug, Clone, PartialEq)]
pub struct DaoShapeFilter {
    /// Kernel truncation radius in units of the Gaussian sigma.
    pub sigma_radius: f64,
    /// Accepted sharpness range.
    pub sharpness: RangeInclusive<f64>,
    /// Accepted roundness range.
    pub roundness: RangeInclusive<f64>,
    /// Drop sources whose kernel footprint touches the image edge.
    pub exclude_border: bool,
    /// Keep only the N brightest sources.
    pub brightest: Option<usize>,
    /// Reject sources whose peak exceeds this value.
    pub peakmax: Option<f64>,
    /// Minimum centroid separation in pixels.
    pub min_separation: f64,
}

impl Default for DaoShapeFilter {
    fn default() -> Self {
        Self {
            sigma_radius: 1.5,
            sharpness: 0.2..=1.0,
            roundness: -1.0..=1.0,
            exclude_border: false,
            brightest: None,
            peakmax: None,
            min_separation: 0.0,
        }
    }
}

/// Build a DAOStarFinder configuration for a circular PSF.
///
/// # Arguments
/// * `fwhm` - PSF full-width-half-max in pixels
/// * `threshold` - Absolute detection threshold (already scaled by background sigma)
/// * `shape` - Shape filters and kernel settings
pub fn dao_config(fwhm: f64, threshold: f64, shape: &DaoShapeFilter) -> DAOStarFinderConfig {
    DAOStarFinderConfig {
        threshold,
        fwhm,
        ratio: 1.0,
        theta: 0.0,
        sigma_radius: shape.sigma_radius,
        sharpness: shape.sharpness.clone(),
        roundness: shape.roundness.clone(),
        exclude_border: shape.exclude_border,
        brightest: shape.brightest,
        peakmax: shape.peakmax,
        min_separation: shape.min_separation,
    }
}
