//! DAOFIND-style detection backed by starfield's `DAOStarFinder`.
//!
//! Based on Stetson's DAOPHOT algorithm: the image is convolved with a lowered,
//! truncated Gaussian kernel of the requested FWHM, local maxima above the
//! threshold become candidates, and candidates are filtered by sharpness and
//! roundness before their centroids are refined.

use ndarray::ArrayView2;
use starfield::image::starfinders::{DAOStarFinder, StellarSource};

use super::config::{dao_config, DaoShapeFilter};
use super::{Centroid, DetectionError, SourceDetector};

/// [`SourceDetector`] using the DAO star finder.
#[derive(Debug, Clone, Default)]
pub struct DaoDetector {
    shape: DaoShapeFilter,
}

impl DaoDetector {
    pub fn new(shape: DaoShapeFilter) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> &DaoShapeFilter {
        &self.shape
    }
}

impl SourceDetector for DaoDetector {
    fn detect(
        &self,
        image: &ArrayView2<f64>,
        fwhm: f64,
        threshold: f64,
    ) -> Result<Vec<Centroid>, DetectionError> {
        if !fwhm.is_finite() || fwhm <= 0.0 {
            return Err(DetectionError::InvalidParameters(format!(
                "fwhm must be positive and finite, got {fwhm}"
            )));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(DetectionError::InvalidParameters(format!(
                "threshold must be non-negative and finite, got {threshold}"
            )));
        }

        let start_time = std::time::Instant::now();
        let (height, width) = image.dim();

        let config = dao_config(fwhm, threshold, &self.shape);
        let star_finder =
            DAOStarFinder::new(config).map_err(|e| DetectionError::Finder(e.to_string()))?;

        let centroids: Vec<Centroid> = star_finder
            .find_stars(&image.to_owned(), None)
            .iter()
            .map(|star| Centroid::from(star.get_centroid()))
            .collect();

        let duration = start_time.elapsed();
        log::debug!(
            "DAO detection: {}x{} pixels, fwhm={:.2}, threshold={:.3}, duration={:.3}ms, sources={}",
            width,
            height,
            fwhm,
            threshold,
            duration.as_secs_f64() * 1000.0,
            centroids.len()
        );

        Ok(centroids)
    }
}
