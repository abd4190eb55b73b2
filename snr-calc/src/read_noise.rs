//! Read-noise variance for the SNR noise model.

use serde::{Deserialize, Serialize};
use shared::image_proc::io::{FrameStore, FrameStoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Default read-noise standard deviation in ADU when no calibration frame is given.
pub const DEFAULT_READ_NOISE_SIGMA: f64 = 50.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadNoiseError {
    #[error("failed to load read-noise frame: {0}")]
    Load(#[from] FrameStoreError),
}

/// Source of the read-noise variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReadNoise {
    /// Known read-noise standard deviation. Variance is `sigma²`.
    Fixed { sigma: f64 },
    /// Calibration frame whose pixel variance is the read-noise variance.
    Measured { path: PathBuf },
}

impl Default for ReadNoise {
    fn default() -> Self {
        ReadNoise::Fixed {
            sigma: DEFAULT_READ_NOISE_SIGMA,
        }
    }
}

impl ReadNoise {
    /// Read-noise variance.
    ///
    /// For a measured frame this is the population variance of its pixels.
    pub fn variance<S: FrameStore>(&self, store: &S) -> Result<f64, ReadNoiseError> {
        match self {
            ReadNoise::Fixed { sigma } => Ok(sigma * sigma),
            ReadNoise::Measured { path } => {
                let frame = store.load(path)?;
                let variance = frame.variance();
                tracing::debug!(
                    "Read-noise frame {}: {}x{}, variance {:.3}",
                    path.display(),
                    frame.width(),
                    frame.height(),
                    variance
                );
                Ok(variance)
            }
        }
    }
}
