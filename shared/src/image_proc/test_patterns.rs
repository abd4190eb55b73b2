//! Synthetic frames for validating calibration and photometry code.
//!
//! Provides flat fields, Gaussian point sources and seeded Gaussian noise so
//! tests across the workspace can build reproducible dark and light frames.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::image_proc::frame::{Frame, FrameError};

/// Add a circular Gaussian spot to an image in place.
///
/// # Arguments
/// * `image` - Image to modify
/// * `x_center` - Column of the spot center
/// * `y_center` - Row of the spot center
/// * `sigma` - Gaussian sigma in pixels (FWHM = 2.3548 × sigma)
/// * `amplitude` - Peak value added at the spot center
pub fn add_gaussian_source(
    image: &mut Array2<f64>,
    x_center: f64,
    y_center: f64,
    sigma: f64,
    amplitude: f64,
) {
    let two_sigma_sq = 2.0 * sigma * sigma;
    for ((y, x), value) in image.indexed_iter_mut() {
        let dx = x as f64 - x_center;
        let dy = y as f64 - y_center;
        *value += amplitude * (-(dx * dx + dy * dy) / two_sigma_sq).exp();
    }
}

/// Generate a 2D array of normally distributed values.
///
/// Deterministic for a given seed, so noisy test fixtures stay reproducible.
///
/// # Arguments
/// * `size` - Tuple of (height, width) for the output array dimensions
/// * `mean` - Mean value of the normal distribution
/// * `std_dev` - Standard deviation of the normal distribution
/// * `seed` - Random seed for deterministic output
pub fn simple_normal_array(
    size: (usize, usize),
    mean: f64,
    std_dev: f64,
    seed: u64,
) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal_dist = Normal::new(mean, std_dev)
        .expect("Normal distribution parameters must be valid (std_dev >= 0)");
    Array2::from_shape_fn(size, |_| normal_dist.sample(&mut rng))
}

/// A light frame: flat background, optional read noise, one Gaussian star.
///
/// # Arguments
/// * `size` - (height, width)
/// * `background` - Flat level under the star
/// * `star` - `(x, y, sigma, amplitude)` of the Gaussian source
/// * `noise` - `(std_dev, seed)` of additive Gaussian noise, if any
pub fn star_field_frame(
    size: (usize, usize),
    background: f64,
    star: (f64, f64, f64, f64),
    noise: Option<(f64, u64)>,
) -> Result<Frame, FrameError> {
    let mut image = match noise {
        Some((std_dev, seed)) => simple_normal_array(size, background, std_dev, seed),
        None => Array2::from_elem(size, background),
    };
    let (x, y, sigma, amplitude) = star;
    add_gaussian_source(&mut image, x, y, sigma, amplitude);
    Frame::new(image)
}
