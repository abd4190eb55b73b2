//! Star-field signal-to-noise estimation from sensor calibration frames.
//!
//! A run takes a folder of FITS frames, averages the dark frames into a master
//! dark, measures the source signal in the dark-calibrated light frame, and
//! combines it with dark and read noise:
//!
//! ```text
//! folder ─► discovery ─► darks ─► master dark ─┬─► signal ─┐
//!                                              └─► dark σ² ─┼─► snr
//!                                    read_noise ─► read σ² ─┘
//! ```

pub mod config;
pub mod darks;
pub mod discovery;
pub mod pipeline;
pub mod read_noise;
pub mod signal;
pub mod snr;

pub use config::{ConfigError, SnrConfig};
pub use pipeline::{run_pipeline, PipelineError, PipelineOutput, SnrReport};
pub use read_noise::ReadNoise;
pub use snr::{calc_snr, SnrError};
