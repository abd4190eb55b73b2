//! FITS frame I/O.
//!
//! Reads and writes single-image FITS files whose primary HDU holds a 2D
//! numeric array. Any BITPIX is accepted on read; cfitsio converts the pixels
//! to `f64`. Row 0 of the resulting [`Frame`] is the first row stored in the
//! file (FITS `y = 1`), so pixel coordinates match what astropy reports for the
//! same file.

use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use std::path::Path;
use thiserror::Error;

use super::{FrameStore, FrameStoreError};
use crate::image_proc::frame::{Frame, FrameError};

/// Errors that can occur during FITS file operations
#[derive(Error, Debug)]
pub enum FitsError {
    #[error("FITS I/O error: {0}")]
    FitsIo(#[from] fitsio::errors::Error),
    #[error("Invalid data type in HDU: {0}")]
    InvalidDataType(String),
    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),
}

/// Read the primary HDU of a FITS file as a double-precision frame.
///
/// The file handle is dropped before returning. Fails with
/// [`FitsError::InvalidDataType`] when the primary HDU is not a 2D image.
pub fn read_fits_frame<P: AsRef<Path>>(path: P) -> Result<Frame, FitsError> {
    let mut fptr = FitsFile::open(path.as_ref())?;
    let hdu = fptr.primary_hdu()?;

    let naxis = hdu.read_key::<i64>(&mut fptr, "NAXIS")?;
    if naxis != 2 {
        return Err(FitsError::InvalidDataType(format!(
            "expected a 2D primary image, found NAXIS = {naxis}"
        )));
    }

    let naxis1 = hdu.read_key::<i64>(&mut fptr, "NAXIS1")? as usize;
    let naxis2 = hdu.read_key::<i64>(&mut fptr, "NAXIS2")? as usize;

    let pixels = hdu.read_image::<Vec<f64>>(&mut fptr)?;

    // NAXIS1 is the fastest-varying axis, so the flat data is already row-major
    // with NAXIS2 rows of NAXIS1 columns.
    Ok(Frame::from_shape_vec(naxis2, naxis1, pixels)?)
}

/// Write a frame as the primary HDU of a new double-precision FITS file.
///
/// Overwrites any existing file at `path`.
pub fn write_fits_frame<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<(), FitsError> {
    let (height, width) = frame.dim();

    // fitsio takes dimensions slowest axis first: (NAXIS2, NAXIS1)
    let image_description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[height, width],
    };

    let mut fptr = FitsFile::create(path.as_ref())
        .with_custom_primary(&image_description)
        .overwrite()
        .open()?;
    let hdu = fptr.primary_hdu()?;

    let flat_data: Vec<f64> = frame.data().iter().copied().collect();
    hdu.write_image(&mut fptr, &flat_data)?;

    Ok(())
}

/// [`FrameStore`] backed by FITS files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitsFrameStore;

impl FrameStore for FitsFrameStore {
    fn load(&self, path: &Path) -> Result<Frame, FrameStoreError> {
        if !path.exists() {
            return Err(FrameStoreError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let frame = read_fits_frame(path).map_err(|e| FrameStoreError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::debug!(
            "Loaded {}x{} frame from {}",
            frame.width(),
            frame.height(),
            path.display()
        );
        Ok(frame)
    }
}
