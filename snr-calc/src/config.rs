//! Pipeline configuration.
//!
//! Every tunable of the SNR pipeline lives here with its default. A JSON file
//! may override any subset of fields; missing fields keep their defaults.
//!
//! ```json
//! {
//!   "detection": { "fwhm": 12.0 },
//!   "read_noise": { "mode": "measured", "path": "/data/bias.fits" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::read_noise::ReadNoise;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How files in the input folder are recognized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Required file-name suffix of every candidate frame.
    pub extension: String,
    /// Substring marking a dark frame.
    pub dark_marker: String,
    /// Substring marking the light frame.
    pub light_marker: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            extension: ".fits".to_string(),
            dark_marker: "dark".to_string(),
            light_marker: "test_uncal_0".to_string(),
        }
    }
}

/// Point-source detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Expected PSF full-width-half-max in pixels.
    pub fwhm: f64,
    /// Detection threshold in units of the calibrated frame's standard deviation.
    pub threshold_sigma: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            fwhm: 20.0,
            threshold_sigma: 5.0,
        }
    }
}

/// Aperture photometry parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotometryConfig {
    /// Aperture radius in pixels.
    pub aperture_radius: f64,
    /// Sub-sample grid size per pixel axis for aperture edge pixels.
    pub subpixels: usize,
}

impl Default for PhotometryConfig {
    fn default() -> Self {
        Self {
            aperture_radius: 5.0,
            subpixels: 5,
        }
    }
}

/// Full SNR pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnrConfig {
    pub files: FileConfig,
    pub detection: DetectionConfig,
    pub photometry: PhotometryConfig,
    pub read_noise: ReadNoise,
}

impl SnrConfig {
    /// Load a configuration from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };

        positive("detection.fwhm", self.detection.fwhm)?;
        positive("detection.threshold_sigma", self.detection.threshold_sigma)?;
        positive("photometry.aperture_radius", self.photometry.aperture_radius)?;

        if self.photometry.subpixels == 0 {
            return Err(ConfigError::Invalid(
                "photometry.subpixels must be at least 1".to_string(),
            ));
        }
        if self.files.dark_marker.is_empty() || self.files.light_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "file markers must not be empty".to_string(),
            ));
        }
        if let ReadNoise::Fixed { sigma } = self.read_noise {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "read_noise.sigma must be non-negative, got {sigma}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SnrConfig::default();
        assert_eq!(config.files.extension, ".fits");
        assert_eq!(config.files.dark_marker, "dark");
        assert_eq!(config.files.light_marker, "test_uncal_0");
        assert_eq!(config.detection.fwhm, 20.0);
        assert_eq!(config.detection.threshold_sigma, 5.0);
        assert_eq!(config.photometry.aperture_radius, 5.0);
        assert_eq!(config.read_noise, ReadNoise::Fixed { sigma: 50.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SnrConfig =
            serde_json::from_str(r#"{"detection": {"fwhm": 8.5}}"#).unwrap();

        assert_eq!(config.detection.fwhm, 8.5);
        assert_eq!(config.detection.threshold_sigma, 5.0);
        assert_eq!(config.photometry, PhotometryConfig::default());
        assert_eq!(config.files, FileConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snr.json");
        std::fs::write(
            &path,
            r#"{"read_noise": {"mode": "measured", "path": "bias.fits"},
                "files": {"light_marker": "light_"}}"#,
        )
        .unwrap();

        let config = SnrConfig::load_from_file(&path).unwrap();
        assert_eq!(
            config.read_noise,
            ReadNoise::Measured {
                path: PathBuf::from("bias.fits")
            }
        );
        assert_eq!(config.files.light_marker, "light_");
        assert_eq!(config.files.dark_marker, "dark");
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();

        let missing = SnrConfig::load_from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            SnrConfig::load_from_file(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SnrConfig::default();
        config.detection.fwhm = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SnrConfig::default();
        config.photometry.subpixels = 0;
        assert!(config.validate().is_err());

        let mut config = SnrConfig::default();
        config.files.light_marker.clear();
        assert!(config.validate().is_err());

        let mut config = SnrConfig::default();
        config.read_noise = ReadNoise::Fixed { sigma: -1.0 };
        assert!(config.validate().is_err());
    }
}
