//! Signal-to-noise ratio of a measured source.
//!
//! The noise model combines shot noise of the source with the dark and read
//! noise variances:
//!
//! ```text
//! SNR = S / sqrt(S + σ²_dark + σ²_read)
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SnrError {
    #[error("noise model total must be positive, got {total}")]
    InvalidNoiseModel { total: f64 },
}

/// Compute the SNR from its three terms.
///
/// Returns `Ok(None)` if any term is unavailable. Fails with
/// [`SnrError::InvalidNoiseModel`] when `signal + dark_variance + read_variance`
/// is not strictly positive.
pub fn calc_snr(
    signal: Option<f64>,
    dark_variance: Option<f64>,
    read_variance: Option<f64>,
) -> Result<Option<f64>, SnrError> {
    let (Some(signal), Some(dark_variance), Some(read_variance)) =
        (signal, dark_variance, read_variance)
    else {
        return Ok(None);
    };

    let total = signal + dark_variance + read_variance;
    if total.is_nan() || total <= 0.0 {
        return Err(SnrError::InvalidNoiseModel { total });
    }

    Ok(Some(signal / total.sqrt()))
}
