//! Circular aperture photometry for point sources.
//!
//! Sums the flux inside a circle of fixed radius around each centroid. Pixel
//! `(row, col)` covers the square `[col - 0.5, col + 0.5] x [row - 0.5, row + 0.5]`,
//! so its center sits at integer coordinates like the centroids produced by
//! the detectors.
//!
//! Partial pixels on the aperture edge are weighted by the fraction of an
//! `n x n` grid of sub-samples that falls inside the circle. With `n = 1` this
//! reduces to the "center" method: a pixel counts fully if its center is
//! inside the aperture. Parts of the aperture outside the image contribute no
//! flux, but the reported area is always the geometric `π r²`.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::detection::Centroid;

/// Flux measured in one aperture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApertureMeasurement {
    /// Aperture center.
    pub centroid: Centroid,
    /// Summed flux inside the aperture.
    pub aperture_sum: f64,
    /// Aperture area in pixels (π r²).
    pub area: f64,
}

impl ApertureMeasurement {
    /// Mean count per pixel: `aperture_sum / area`.
    ///
    /// Only independent of the aperture radius when the source flux is uniform
    /// across the aperture. For a peaked PSF a larger radius dilutes the value.
    pub fn mean_per_pixel(&self) -> f64 {
        self.aperture_sum / self.area
    }
}

/// Aperture photometry capability.
pub trait AperturePhotometer {
    /// Measure one circular aperture of `radius` pixels per centroid, in order.
    fn measure(
        &self,
        image: &ArrayView2<f64>,
        centroids: &[Centroid],
        radius: f64,
    ) -> Vec<ApertureMeasurement>;
}

impl<P: AperturePhotometer + ?Sized> AperturePhotometer for &P {
    fn measure(
        &self,
        image: &ArrayView2<f64>,
        centroids: &[Centroid],
        radius: f64,
    ) -> Vec<ApertureMeasurement> {
        (**self).measure(image, centroids, radius)
    }
}

/// Circular aperture photometer with sub-pixel edge sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularAperturePhotometer {
    subpixels: usize,
}

impl CircularAperturePhotometer {
    /// Create a photometer sampling each pixel on a `subpixels x subpixels` grid.
    ///
    /// # Panics
    /// If `subpixels` is zero.
    pub fn new(subpixels: usize) -> Self {
        assert!(subpixels > 0, "subpixels must be at least 1");
        Self { subpixels }
    }

    pub fn subpixels(&self) -> usize {
        self.subpixels
    }
}

impl Default for CircularAperturePhotometer {
    fn default() -> Self {
        Self::new(5)
    }
}

impl AperturePhotometer for CircularAperturePhotometer {
    fn measure(
        &self,
        image: &ArrayView2<f64>,
        centroids: &[Centroid],
        radius: f64,
    ) -> Vec<ApertureMeasurement> {
        assert!(radius > 0.0, "aperture radius must be positive");

        let area = PI * radius * radius;
        centroids
            .iter()
            .map(|&centroid| ApertureMeasurement {
                centroid,
                aperture_sum: circular_aperture_sum(
                    image,
                    centroid.x,
                    centroid.y,
                    radius,
                    self.subpixels,
                ),
                area,
            })
            .collect()
    }
}

/// Fraction of pixel `(x, y)` inside the circle, from an `n x n` sub-sample grid.
fn pixel_coverage(x: f64, y: f64, x_center: f64, y_center: f64, radius: f64, n: usize) -> f64 {
    let step = 1.0 / n as f64;
    let r2 = radius * radius;

    let mut inside = 0usize;
    for sy in 0..n {
        let dy = y - 0.5 + (sy as f64 + 0.5) * step - y_center;
        for sx in 0..n {
            let dx = x - 0.5 + (sx as f64 + 0.5) * step - x_center;
            if dx * dx + dy * dy <= r2 {
                inside += 1;
            }
        }
    }

    inside as f64 / (n * n) as f64
}

/// Sum the flux inside a circular aperture.
///
/// # Arguments
///
/// * `image` - The image array as f64 pixel values
/// * `x_center` - X coordinate (column) of the aperture center, can be subpixel
/// * `y_center` - Y coordinate (row) of the aperture center, can be subpixel
/// * `radius` - Aperture radius in pixels
/// * `subpixels` - Sub-sample grid size per pixel axis (1 = center method)
pub fn circular_aperture_sum(
    image: &ArrayView2<f64>,
    x_center: f64,
    y_center: f64,
    radius: f64,
    subpixels: usize,
) -> f64 {
    let (height, width) = image.dim();
    let reach = radius + 0.5;

    let x_min = (x_center - reach).floor().max(0.0) as usize;
    let y_min = (y_center - reach).floor().max(0.0) as usize;
    let x_max = ((x_center + reach).ceil() + 1.0).clamp(0.0, width as f64) as usize;
    let y_max = ((y_center + reach).ceil() + 1.0).clamp(0.0, height as f64) as usize;

    let mut sum = 0.0;
    for y in y_min..y_max {
        for x in x_min..x_max {
            let coverage =
                pixel_coverage(x as f64, y as f64, x_center, y_center, radius, subpixels);
            if coverage > 0.0 {
                sum += coverage * image[[y, x]];
            }
        }
    }

    sum
}
