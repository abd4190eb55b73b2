//! Image processing for sensor calibration frames.
//!
//! # Module Organization
//!
//! ## Data
//! - **frame**: [`Frame`], the double-precision 2D pixel grid
//! - **io**: FITS reading and writing behind the [`FrameStore`] trait
//!
//! ## Measurement
//! - **detection**: Point-source detection (DAO star finder)
//! - **aperture_photometry**: Circular aperture flux sums
//!
//! ## Testing
//! - **test_patterns**: Synthetic star fields and seeded noise

pub mod aperture_photometry;
pub mod detection;
pub mod frame;
pub mod io;
pub mod test_patterns;

pub use aperture_photometry::{
    circular_aperture_sum, ApertureMeasurement, AperturePhotometer, CircularAperturePhotometer,
};
pub use detection::{Centroid, DaoDetector, DetectionError, SourceDetector};
pub use frame::{Frame, FrameError};
pub use io::{FitsFrameStore, FrameStore, FrameStoreError};
