//! Source signal from the dark-calibrated light frame.
//!
//! The light frame is dark-subtracted, then point sources are detected on the
//! mean-subtracted copy with a threshold scaled by the frame's standard
//! deviation. Aperture photometry runs on the dark-calibrated frame itself, not
//! the mean-subtracted copy, so the measured signal still contains the
//! residual sky background.
//!
//! The signal is the mean per-pixel count (aperture sum / aperture area)
//! averaged over all detected sources. For a peaked PSF this depends on the
//! aperture radius.

use serde::Serialize;
use shared::dark_frame::MasterDark;
use shared::image_proc::aperture_photometry::{ApertureMeasurement, AperturePhotometer};
use shared::image_proc::detection::{DetectionError, SourceDetector};
use shared::image_proc::frame::{Frame, FrameError};
use shared::image_proc::io::{FrameStore, FrameStoreError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::{DetectionConfig, FileConfig, PhotometryConfig, SnrConfig};
use crate::discovery::light_frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("no light frame found")]
    NoLightFrame,

    #[error("no stars found")]
    NoSources,

    #[error("failed to load light frame: {0}")]
    Load(#[from] FrameStoreError),

    #[error("dark calibration failed: {0}")]
    Frame(#[from] FrameError),

    #[error("source detection failed: {0}")]
    Detection(#[from] DetectionError),
}

/// Signal measured in one light frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEstimate {
    /// Mean per-pixel count across all source apertures.
    pub signal: f64,
    /// Light frame the signal was measured in.
    pub light_frame: Option<PathBuf>,
    /// One measurement per detected source.
    pub measurements: Vec<ApertureMeasurement>,
}

/// Measures source signal with pluggable detection and photometry.
pub struct SignalEstimator<'a, D, P> {
    detector: D,
    photometer: P,
    detection: &'a DetectionConfig,
    photometry: &'a PhotometryConfig,
}

impl<'a, D: SourceDetector, P: AperturePhotometer> SignalEstimator<'a, D, P> {
    pub fn new(
        detector: D,
        photometer: P,
        detection: &'a DetectionConfig,
        photometry: &'a PhotometryConfig,
    ) -> Self {
        Self {
            detector,
            photometer,
            detection,
            photometry,
        }
    }

    /// Select the light frame among `files`, load it and measure its signal.
    pub fn estimate<S: FrameStore>(
        &self,
        files: &[PathBuf],
        file_config: &FileConfig,
        master_dark: &MasterDark,
        store: &S,
    ) -> Result<SignalEstimate, SignalError> {
        let path: &Path = light_frame(files, file_config).ok_or(SignalError::NoLightFrame)?;
        debug!("Light frame: {}", path.display());

        let light = store.load(path)?;
        let mut estimate = self.estimate_frame(&light, master_dark)?;
        estimate.light_frame = Some(path.to_path_buf());
        Ok(estimate)
    }

    /// Measure the signal of an already loaded light frame.
    pub fn estimate_frame(
        &self,
        light: &Frame,
        master_dark: &MasterDark,
    ) -> Result<SignalEstimate, SignalError> {
        let calibrated = light.subtract(master_dark.frame())?;

        let mean = calibrated.mean();
        let std = calibrated.std_dev();
        debug!("Calibrated frame: mean={:.3}, std={:.3}", mean, std);

        // A flat frame has no structure to detect.
        if std.is_nan() || std <= 0.0 {
            return Err(SignalError::NoSources);
        }

        let threshold = self.detection.threshold_sigma * std;
        let background_subtracted = calibrated.offset(mean);
        let centroids = self.detector.detect(
            &background_subtracted.view(),
            self.detection.fwhm,
            threshold,
        )?;

        if centroids.is_empty() {
            return Err(SignalError::NoSources);
        }
        debug!(
            "Detected {} sources (fwhm={:.1}, threshold={:.3})",
            centroids.len(),
            self.detection.fwhm,
            threshold
        );

        let measurements = self.photometer.measure(
            &calibrated.view(),
            &centroids,
            self.photometry.aperture_radius,
        );

        let signal = measurements
            .iter()
            .map(ApertureMeasurement::mean_per_pixel)
            .sum::<f64>()
            / measurements.len() as f64;

        Ok(SignalEstimate {
            signal,
            light_frame: None,
            measurements,
        })
    }
}

/// Measure the signal of the light frame among `files` with the configured
/// detection and photometry parameters.
pub fn estimate_signal<S, D, P>(
    files: &[PathBuf],
    master_dark: &MasterDark,
    store: &S,
    detector: D,
    photometer: P,
    config: &SnrConfig,
) -> Result<SignalEstimate, SignalError>
where
    S: FrameStore,
    D: SourceDetector,
    P: AperturePhotometer,
{
    SignalEstimator::new(detector, photometer, &config.detection, &config.photometry)
        .estimate(files, &config.files, master_dark, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::ArrayView2;
    use shared::dark_frame::build_master_dark;
    use shared::image_proc::aperture_photometry::CircularAperturePhotometer;
    use shared::image_proc::detection::Centroid;
    use shared::image_proc::io::MemoryFrameStore;
    use std::cell::RefCell;
    use std::f64::consts::PI;

    /// Returns fixed centroids and records the arguments it was called with.
    struct RecordingDetector {
        centroids: Vec<Centroid>,
        calls: RefCell<Vec<(f64, f64, f64)>>,
    }

    impl RecordingDetector {
        fn new(centroids: Vec<Centroid>) -> Self {
            Self {
                centroids,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SourceDetector for RecordingDetector {
        fn detect(
            &self,
            image: &ArrayView2<f64>,
            fwhm: f64,
            threshold: f64,
        ) -> Result<Vec<Centroid>, DetectionError> {
            let mean = image.sum() / image.len() as f64;
            self.calls.borrow_mut().push((fwhm, threshold, mean));
            Ok(self.centroids.clone())
        }
    }

    fn master(value: f64) -> MasterDark {
        build_master_dark(&[Frame::filled(20, 20, value).unwrap()]).unwrap()
    }

    /// Light frame with a 7x7 block of 110 on a background of 10.
    fn block_light() -> Frame {
        let mut data = ndarray::Array2::from_elem((20, 20), 10.0);
        data.slice_mut(ndarray::s![7..14, 7..14]).fill(110.0);
        Frame::new(data).unwrap()
    }

    #[test]
    fn test_detection_on_mean_subtracted_photometry_on_calibrated() {
        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig {
            aperture_radius: 2.0,
            subpixels: 5,
        };
        let detector = RecordingDetector::new(vec![Centroid::new(10.0, 10.0)]);
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let estimate = estimator.estimate_frame(&block_light(), &master(10.0)).unwrap();

        // Aperture of radius 2 lies inside the block: calibrated value 100 everywhere
        assert_relative_eq!(estimate.signal, 100.0, max_relative = 0.02);
        assert_eq!(estimate.measurements.len(), 1);
        assert_relative_eq!(estimate.measurements[0].area, PI * 4.0, epsilon = 1e-12);

        let calls = detector.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (fwhm, threshold, mean_seen) = calls[0];
        assert_eq!(fwhm, 20.0);
        // Detector input has zero mean
        assert!(mean_seen.abs() < 1e-9);

        let calibrated = block_light().subtract(master(10.0).frame()).unwrap();
        assert_relative_eq!(threshold, 5.0 * calibrated.std_dev(), epsilon = 1e-9);
    }

    #[test]
    fn test_signal_is_mean_over_sources() {
        let mut data = ndarray::Array2::zeros((30, 30));
        data.slice_mut(ndarray::s![2..9, 2..9]).fill(40.0);
        data.slice_mut(ndarray::s![20..27, 20..27]).fill(80.0);
        let light = Frame::new(data).unwrap();
        let dark = build_master_dark(&[Frame::filled(30, 30, 0.0).unwrap()]).unwrap();

        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig {
            aperture_radius: 2.0,
            subpixels: 5,
        };
        let detector = RecordingDetector::new(vec![
            Centroid::new(5.0, 5.0),
            Centroid::new(23.0, 23.0),
        ]);
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let estimate = estimator.estimate_frame(&light, &dark).unwrap();
        assert_relative_eq!(estimate.signal, 60.0, max_relative = 0.02);
    }

    #[test]
    fn test_no_sources() {
        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig::default();
        let detector = RecordingDetector::new(Vec::new());
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let result = estimator.estimate_frame(&block_light(), &master(10.0));
        assert_eq!(result.unwrap_err(), SignalError::NoSources);
    }

    #[test]
    fn test_flat_frame_skips_detection() {
        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig::default();
        let detector = RecordingDetector::new(vec![Centroid::new(1.0, 1.0)]);
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let flat = Frame::filled(20, 20, 42.0).unwrap();
        let result = estimator.estimate_frame(&flat, &master(10.0));

        assert_eq!(result.unwrap_err(), SignalError::NoSources);
        assert!(detector.calls.borrow().is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig::default();
        let detector = RecordingDetector::new(vec![Centroid::new(1.0, 1.0)]);
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let light = Frame::filled(10, 10, 1.0).unwrap();
        let result = estimator.estimate_frame(&light, &master(0.0));
        assert!(matches!(
            result,
            Err(SignalError::Frame(FrameError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_light_frame_selection_and_loading() {
        let store = MemoryFrameStore::new()
            .with_frame("/data/test_uncal_0_a.fits", block_light())
            .with_frame(
                "/data/test_uncal_0_b.fits",
                Frame::filled(20, 20, 1.0).unwrap(),
            );
        let files = vec![
            PathBuf::from("/data/dark_1.fits"),
            PathBuf::from("/data/test_uncal_0_a.fits"),
            PathBuf::from("/data/test_uncal_0_b.fits"),
        ];

        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig {
            aperture_radius: 2.0,
            subpixels: 5,
        };
        let detector = RecordingDetector::new(vec![Centroid::new(10.0, 10.0)]);
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let estimate = estimator
            .estimate(&files, &FileConfig::default(), &master(10.0), &store)
            .unwrap();
        assert_eq!(
            estimate.light_frame,
            Some(PathBuf::from("/data/test_uncal_0_a.fits"))
        );
        assert_relative_eq!(estimate.signal, 100.0, max_relative = 0.02);
    }

    #[test]
    fn test_missing_light_frame() {
        let store = MemoryFrameStore::new();
        let detection = DetectionConfig::default();
        let photometry = PhotometryConfig::default();
        let detector = RecordingDetector::new(Vec::new());
        let estimator = SignalEstimator::new(
            &detector,
            CircularAperturePhotometer::default(),
            &detection,
            &photometry,
        );

        let files = vec![PathBuf::from("/data/dark_1.fits")];
        let result = estimator.estimate(&files, &FileConfig::default(), &master(0.0), &store);
        assert_eq!(result.unwrap_err(), SignalError::NoLightFrame);

        let files = vec![PathBuf::from("/data/test_uncal_0.fits")];
        let result = estimator.estimate(&files, &FileConfig::default(), &master(0.0), &store);
        assert!(matches!(
            result,
            Err(SignalError::Load(FrameStoreError::NotFound { .. }))
        ));
    }
}
