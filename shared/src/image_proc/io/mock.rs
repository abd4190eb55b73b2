//! In-memory frame store for exercising pipelines without FITS files.

use super::{FrameStore, FrameStoreError};
use crate::image_proc::frame::Frame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// In-memory [`FrameStore`] for tests and dry runs.
///
/// Paths that were never inserted load as [`FrameStoreError::NotFound`].
/// Paths registered with [`MemoryFrameStore::insert_unreadable`] load as
/// [`FrameStoreError::ReadError`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFrameStore {
    frames: HashMap<PathBuf, Result<Frame, String>>,
}

impl MemoryFrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, frame: Frame) {
        self.frames.insert(path.into(), Ok(frame));
    }

    /// Register a path that exists but fails to decode.
    pub fn insert_unreadable<P: Into<PathBuf>>(&mut self, path: P, reason: &str) {
        self.frames.insert(path.into(), Err(reason.to_string()));
    }

    pub fn with_frame<P: Into<PathBuf>>(mut self, path: P, frame: Frame) -> Self {
        self.insert(path, frame);
        self
    }
}

impl FrameStore for MemoryFrameStore {
    fn load(&self, path: &Path) -> Result<Frame, FrameStoreError> {
        match self.frames.get(path) {
            Some(Ok(frame)) => Ok(frame.clone()),
            Some(Err(reason)) => Err(FrameStoreError::ReadError {
                path: path.to_path_buf(),
                reason: reason.clone(),
            }),
            None => Err(FrameStoreError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }
}
