//! Frame loading for calibration pipelines.
//!
//! Pipelines never open files directly. They go through a [`FrameStore`], which
//! turns a path into a [`Frame`] or a typed [`FrameStoreError`]. The production
//! store reads FITS primary HDUs ([`FitsFrameStore`]); tests use the in-memory
//! [`mock::MemoryFrameStore`].
//!
//! Every load is scoped: the underlying file handle is released before `load`
//! returns, whether the read succeeded or not.

pub mod fits;
pub mod mock;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::image_proc::frame::Frame;

pub use fits::{read_fits_frame, write_fits_frame, FitsError, FitsFrameStore};
pub use mock::MemoryFrameStore;

/// Errors from loading a frame through a [`FrameStore`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameStoreError {
    /// No file exists at the requested path.
    #[error("frame file not found: {}", path.display())]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file exists but could not be decoded into a 2D frame.
    #[error("failed to read frame from {}: {reason}", path.display())]
    ReadError {
        /// Requested path.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },
}

impl FrameStoreError {
    pub fn path(&self) -> &Path {
        match self {
            FrameStoreError::NotFound { path } | FrameStoreError::ReadError { path, .. } => path,
        }
    }
}

/// Source of 2D frames addressed by path.
pub trait FrameStore {
    /// Load the frame stored at `path`.
    fn load(&self, path: &Path) -> Result<Frame, FrameStoreError>;
}

impl<S: FrameStore + ?Sized> FrameStore for &S {
    fn load(&self, path: &Path) -> Result<Frame, FrameStoreError> {
        (**self).load(path)
    }
}
