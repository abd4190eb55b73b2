//! End-to-end SNR estimation over a folder of frames.
//!
//! Stage failures never abort the run. Each one is logged with its cause and
//! turns the corresponding noise-model term into "unavailable", which in turn
//! makes the SNR unavailable.

use serde::Serialize;
use shared::dark_frame::{dark_noise_statistic, MasterDark};
use shared::image_proc::aperture_photometry::AperturePhotometer;
use shared::image_proc::detection::SourceDetector;
use shared::image_proc::io::FrameStore;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, SnrConfig};
use crate::darks::load_master_dark;
use crate::discovery::{dark_files, discover_fits_files, normalize_folder};
use crate::signal::estimate_signal;
use crate::snr::calc_snr;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to list folder {}: {source}", path.display())]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Summary of one run. Terms that could not be computed are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnrReport {
    pub folder: PathBuf,
    pub fits_files: usize,
    pub dark_frames: usize,
    /// Master dark dimensions as (height, width).
    pub master_dark_dim: Option<(usize, usize)>,
    pub light_frame: Option<PathBuf>,
    pub sources: usize,
    pub signal: Option<f64>,
    pub dark_variance: Option<f64>,
    pub read_variance: Option<f64>,
    pub snr: Option<f64>,
}

/// Report plus the master dark, which callers may want to save.
#[derive(Debug)]
pub struct PipelineOutput {
    pub report: SnrReport,
    pub master_dark: Option<MasterDark>,
}

/// Run the full pipeline on `folder`.
///
/// Only an invalid configuration or an unreadable folder is an error.
/// Everything else is reflected in the returned report.
pub fn run_pipeline<S, D, P>(
    folder: &str,
    config: &SnrConfig,
    store: &S,
    detector: D,
    photometer: P,
) -> Result<PipelineOutput, PipelineError>
where
    S: FrameStore,
    D: SourceDetector,
    P: AperturePhotometer,
{
    config.validate()?;

    let folder = PathBuf::from(normalize_folder(folder));
    let files = discover_fits_files(&folder, &config.files.extension).map_err(|source| {
        PipelineError::Folder {
            path: folder.clone(),
            source,
        }
    })?;
    debug!("Found {} FITS files in {}", files.len(), folder.display());

    let mut report = SnrReport {
        folder: folder.clone(),
        fits_files: files.len(),
        ..SnrReport::default()
    };

    let darks: Vec<&Path> = dark_files(&files, &config.files);
    let master_dark = match load_master_dark(&darks, store) {
        Ok(master) => Some(master),
        Err(e) => {
            warn!("Master dark unavailable: {e}");
            None
        }
    };

    if let Some(master) = &master_dark {
        report.dark_frames = master.num_frames();
        report.master_dark_dim = Some(master.frame().dim());
        report.dark_variance = Some(dark_noise_statistic(master));

        match estimate_signal(&files, master, store, detector, photometer, config) {
            Ok(estimate) => {
                debug!(
                    "Signal {:.4} from {} sources",
                    estimate.signal,
                    estimate.measurements.len()
                );
                report.sources = estimate.measurements.len();
                report.light_frame = estimate.light_frame;
                report.signal = Some(estimate.signal);
            }
            Err(e) => warn!("Signal unavailable: {e}"),
        }
    } else {
        warn!("Signal unavailable: light frame cannot be calibrated without a master dark");
    }

    report.read_variance = match config.read_noise.variance(store) {
        Ok(variance) => Some(variance),
        Err(e) => {
            warn!("Read noise unavailable: {e}");
            None
        }
    };

    report.snr = match calc_snr(report.signal, report.dark_variance, report.read_variance) {
        Ok(snr) => snr,
        Err(e) => {
            warn!("SNR unavailable: {e}");
            None
        }
    };

    Ok(PipelineOutput {
        report,
        master_dark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_noise::ReadNoise;
    use ndarray::ArrayView2;
    use shared::image_proc::aperture_photometry::CircularAperturePhotometer;
    use shared::image_proc::detection::{Centroid, DetectionError};
    use shared::image_proc::frame::Frame;
    use shared::image_proc::io::MemoryFrameStore;
    use tempfile::TempDir;

    struct FixedDetector(Vec<Centroid>);

    impl SourceDetector for FixedDetector {
        fn detect(
            &self,
            _image: &ArrayView2<f64>,
            _fwhm: f64,
            _threshold: f64,
        ) -> Result<Vec<Centroid>, DetectionError> {
            Ok(self.0.clone())
        }
    }

    /// Empty placeholder files on disk plus matching in-memory frames.
    fn setup(names: &[&str]) -> (TempDir, MemoryFrameStore) {
        let dir = TempDir::new().unwrap();
        let mut store = MemoryFrameStore::new();
        for name in names {
            let path = dir.path().join(name);
            std::fs::write(&path, b"").unwrap();
            let frame = if name.contains("dark") {
                Frame::filled(20, 20, 10.0).unwrap()
            } else {
                let mut data = ndarray::Array2::from_elem((20, 20), 10.0);
                data.slice_mut(ndarray::s![7..14, 7..14]).fill(410.0);
                Frame::new(data).unwrap()
            };
            store.insert(path, frame);
        }
        (dir, store)
    }

    fn folder(dir: &TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    #[test]
    fn test_full_run_produces_snr() {
        let (dir, store) = setup(&["dark_1.fits", "dark_2.fits", "test_uncal_0.fits"]);
        let mut config = SnrConfig::default();
        config.photometry.aperture_radius = 2.0;

        let output = run_pipeline(
            &folder(&dir),
            &config,
            &store,
            FixedDetector(vec![Centroid::new(10.0, 10.0)]),
            CircularAperturePhotometer::default(),
        )
        .unwrap();
        let report = output.report;

        assert_eq!(report.fits_files, 3);
        assert_eq!(report.dark_frames, 2);
        assert_eq!(report.master_dark_dim, Some((20, 20)));
        assert_eq!(report.sources, 1);
        assert_eq!(report.dark_variance, Some(0.0));
        assert_eq!(report.read_variance, Some(2500.0));

        let signal = report.signal.unwrap();
        assert!((signal - 400.0).abs() < 8.0);
        let snr = report.snr.unwrap();
        assert!((snr - signal / (signal + 2500.0).sqrt()).abs() < 1e-12);
        assert!(output.master_dark.is_some());
    }

    #[test]
    fn test_no_darks_means_no_snr() {
        let (dir, store) = setup(&["test_uncal_0.fits"]);

        let output = run_pipeline(
            &folder(&dir),
            &SnrConfig::default(),
            &store,
            FixedDetector(vec![Centroid::new(10.0, 10.0)]),
            CircularAperturePhotometer::default(),
        )
        .unwrap();

        assert_eq!(output.report.dark_frames, 0);
        assert_eq!(output.report.signal, None);
        assert_eq!(output.report.snr, None);
        assert!(output.master_dark.is_none());
    }

    #[test]
    fn test_no_light_frame_means_no_snr() {
        let (dir, store) = setup(&["dark_1.fits"]);

        let output = run_pipeline(
            &folder(&dir),
            &SnrConfig::default(),
            &store,
            FixedDetector(vec![Centroid::new(10.0, 10.0)]),
            CircularAperturePhotometer::default(),
        )
        .unwrap();

        assert_eq!(output.report.dark_frames, 1);
        assert_eq!(output.report.dark_variance, Some(0.0));
        assert_eq!(output.report.signal, None);
        assert_eq!(output.report.snr, None);
    }

    #[test]
    fn test_missing_read_noise_frame_means_no_snr() {
        let (dir, store) = setup(&["dark_1.fits", "test_uncal_0.fits"]);
        let mut config = SnrConfig::default();
        config.read_noise = ReadNoise::Measured {
            path: dir.path().join("absent.fits"),
        };

        let output = run_pipeline(
            &folder(&dir),
            &config,
            &store,
            FixedDetector(vec![Centroid::new(10.0, 10.0)]),
            CircularAperturePhotometer::default(),
        )
        .unwrap();

        assert!(output.report.signal.is_some());
        assert_eq!(output.report.read_variance, None);
        assert_eq!(output.report.snr, None);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let (dir, store) = setup(&["dark_1.fits", "test_uncal_0.fits"]);
        let mut config = SnrConfig::default();
        config.photometry.aperture_radius = 0.0;

        let result = run_pipeline(
            &folder(&dir),
            &config,
            &store,
            FixedDetector(vec![Centroid::new(10.0, 10.0)]),
            CircularAperturePhotometer::default(),
        );
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_unreadable_folder_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let result = run_pipeline(
            &missing.to_string_lossy(),
            &SnrConfig::default(),
            &MemoryFrameStore::new(),
            FixedDetector(Vec::new()),
            CircularAperturePhotometer::default(),
        );
        assert!(matches!(result, Err(PipelineError::Folder { .. })));
    }
}
