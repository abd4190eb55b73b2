//! Double-precision detector frames.
//!
//! A [`Frame`] is a non-empty row-major 2D grid of `f64` pixel intensities with
//! fixed `(height, width)` dimensions. Raw sensor data of any numeric type is
//! widened to `f64` when a frame is built, so repeated summation (dark
//! stacking, background statistics) never accumulates in integer or
//! single-precision arithmetic.
//!
//! Frames combined element-wise must have identical dimensions. There is no
//! broadcasting: a mismatch is reported as [`FrameError::DimensionMismatch`].

use ndarray::{Array2, ArrayView2};
use thiserror::Error;

/// Errors produced when building or combining frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Two frames with different dimensions were combined.
    #[error("frame dimensions mismatch: expected {expected:?} (height, width), got {actual:?}")]
    DimensionMismatch {
        /// Dimensions of the reference frame.
        expected: (usize, usize),
        /// Dimensions of the offending frame.
        actual: (usize, usize),
    },

    /// The pixel grid has zero rows or zero columns.
    #[error("frame contains no pixels")]
    Empty,

    /// Flat pixel data could not be shaped into the requested grid.
    #[error("cannot shape {len} pixels into a {height}x{width} frame")]
    Shape {
        /// Number of pixels supplied.
        len: usize,
        /// Requested height.
        height: usize,
        /// Requested width.
        width: usize,
    },
}

/// A 2D detector frame in double precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Array2<f64>,
}

impl Frame {
    /// Wrap an existing array. Fails if the array has no pixels.
    pub fn new(data: Array2<f64>) -> Result<Self, FrameError> {
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        Ok(Self { data })
    }

    /// Build a frame from row-major pixel data.
    pub fn from_shape_vec(
        height: usize,
        width: usize,
        pixels: Vec<f64>,
    ) -> Result<Self, FrameError> {
        let len = pixels.len();
        let data = Array2::from_shape_vec((height, width), pixels).map_err(|_| {
            FrameError::Shape {
                len,
                height,
                width,
            }
        })?;
        Self::new(data)
    }

    /// Build a frame where every pixel has the same value.
    pub fn filled(height: usize, width: usize, value: f64) -> Result<Self, FrameError> {
        Self::new(Array2::from_elem((height, width), value))
    }

    /// Dimensions as `(height, width)`.
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: empty frames cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// Fail with [`FrameError::DimensionMismatch`] unless `other` has the same shape.
    pub fn ensure_same_dim(&self, other: &Frame) -> Result<(), FrameError> {
        if self.dim() != other.dim() {
            return Err(FrameError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }

    /// Element-wise `self - other`.
    pub fn subtract(&self, other: &Frame) -> Result<Frame, FrameError> {
        self.ensure_same_dim(other)?;
        Ok(Frame {
            data: &self.data - &other.data,
        })
    }

    /// Subtract a constant from every pixel.
    pub fn offset(&self, value: f64) -> Frame {
        Frame {
            data: self.data.mapv(|v| v - value),
        }
    }

    /// Arithmetic mean of all pixels.
    pub fn mean(&self) -> f64 {
        self.data.sum() / self.data.len() as f64
    }

    /// Population variance (ddof = 0) of all pixels.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.data.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / self.data.len() as f64
    }

    /// Population standard deviation (ddof = 0) of all pixels.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl TryFrom<Array2<f64>> for Frame {
    type Error = FrameError;

    fn try_from(data: Array2<f64>) -> Result<Self, Self::Error> {
        Frame::new(data)
    }
}
