//! Master dark construction from zero-light exposures.
//!
//! Dark frames are averaged pixel by pixel into a master dark that is later
//! subtracted from light frames. The running sum is kept in `f64` so stacks of
//! many 16-bit frames neither overflow nor lose precision.
//!
//! The spatial variance of the master dark serves as the dark-noise term of
//! the SNR noise model. It mixes fixed-pattern non-uniformity with temporal
//! noise, which is acceptable for the relative comparisons this is used for.

use ndarray::Array2;
use thiserror::Error;

use crate::image_proc::frame::Frame;

/// Errors from building a master dark.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DarkError {
    #[error("no dark frames found")]
    NoDarkFrames,

    #[error("dark frame dimensions mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Per-pixel arithmetic mean of a set of dark frames.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterDark {
    frame: Frame,
    num_frames: usize,
}

impl MasterDark {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of dark frames averaged into this master.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }
}

/// Incremental accumulator for dark frames.
///
/// The first frame added fixes the stack dimensions. Frames are summed as they
/// arrive, so only one running sum is held in memory regardless of stack depth.
#[derive(Debug, Default)]
pub struct DarkStack {
    sum: Option<Array2<f64>>,
    num_frames: usize,
}

impl DarkStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dark frame to the running sum.
    ///
    /// Rejects frames whose dimensions differ from the first frame. A rejected
    /// frame leaves the stack unchanged.
    pub fn add_frame(&mut self, frame: &Frame) -> Result<(), DarkError> {
        match &mut self.sum {
            Some(sum) => {
                if sum.dim() != frame.dim() {
                    return Err(DarkError::DimensionMismatch {
                        expected: sum.dim(),
                        actual: frame.dim(),
                    });
                }
                *sum += frame.data();
            }
            None => self.sum = Some(frame.data().clone()),
        }
        self.num_frames += 1;
        Ok(())
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Dimensions fixed by the first frame, if any frame was added.
    pub fn dim(&self) -> Option<(usize, usize)> {
        self.sum.as_ref().map(|s| s.dim())
    }

    /// Divide the running sum by the frame count.
    pub fn finalize(self) -> Result<MasterDark, DarkError> {
        let sum = self.sum.ok_or(DarkError::NoDarkFrames)?;
        let n = self.num_frames as f64;
        let frame = Frame::new(sum.mapv(|v| v / n)).map_err(|_| DarkError::NoDarkFrames)?;

        log::debug!(
            "Master dark built from {} frames ({}x{})",
            self.num_frames,
            frame.width(),
            frame.height()
        );

        Ok(MasterDark {
            frame,
            num_frames: self.num_frames,
        })
    }
}

/// Average a batch of dark frames into a master dark.
///
/// Fails with [`DarkError::NoDarkFrames`] on empty input and with
/// [`DarkError::DimensionMismatch`] if any frame differs in shape from the
/// first one.
pub fn build_master_dark(frames: &[Frame]) -> Result<MasterDark, DarkError> {
    let mut stack = DarkStack::new();
    for frame in frames {
        stack.add_frame(frame)?;
    }
    stack.finalize()
}

/// Dark-noise variance: population variance (ddof = 0) of the master dark pixels.
pub fn dark_noise_statistic(master: &MasterDark) -> f64 {
    master.frame.variance().max(0.0)
}
