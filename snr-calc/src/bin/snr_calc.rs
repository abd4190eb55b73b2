//! Estimate the SNR of a star field from a folder of FITS frames.
//!
//! Prints a single result line, `SNR: <value>` or `error.`. Only warnings and
//! errors are logged by default. Set `RUST_LOG=debug` to follow each stage.

use anyhow::{Context, Result};
use clap::Parser;
use shared::image_proc::aperture_photometry::CircularAperturePhotometer;
use shared::image_proc::detection::DaoDetector;
use shared::image_proc::io::{write_fits_frame, FitsFrameStore};
use snr_calc::pipeline::PipelineOutput;
use snr_calc::{run_pipeline, ReadNoise, SnrConfig};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Star-field SNR estimation from dark and light FITS frames"
)]
struct Args {
    #[arg(help = "Folder containing the dark and light FITS frames")]
    folder: String,

    #[arg(long, help = "JSON configuration file", value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(
        long,
        env = "SNR_READ_NOISE_FRAME",
        help = "Calibration frame whose pixel variance is the read noise",
        value_name = "PATH"
    )]
    read_noise_frame: Option<PathBuf>,

    #[arg(
        long,
        help = "Read-noise standard deviation in ADU (ignored if a read-noise frame is given)",
        value_name = "ADU"
    )]
    read_noise_sigma: Option<f64>,

    #[arg(long, help = "Write the run summary as JSON", value_name = "PATH")]
    report: Option<PathBuf>,

    #[arg(long, help = "Write the master dark as FITS", value_name = "PATH")]
    save_master_dark: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}

fn load_config(args: &Args) -> Result<SnrConfig> {
    let mut config = match &args.config {
        Some(path) => SnrConfig::load_from_file(path)?,
        None => SnrConfig::default(),
    };

    if let Some(path) = &args.read_noise_frame {
        config.read_noise = ReadNoise::Measured { path: path.clone() };
    } else if let Some(sigma) = args.read_noise_sigma {
        config.read_noise = ReadNoise::Fixed { sigma };
    }

    config.validate()?;
    Ok(config)
}

fn save_outputs(output: &PipelineOutput, args: &Args) {
    if let Some(path) = &args.report {
        if let Err(e) = write_report(output, path) {
            warn!("{e:#}");
        }
    }

    if let Some(path) = &args.save_master_dark {
        match &output.master_dark {
            Some(master) => match write_fits_frame(master.frame(), path) {
                Ok(()) => debug!("Saved master dark to {}", path.display()),
                Err(e) => warn!("Failed to save master dark to {}: {e}", path.display()),
            },
            None => warn!("No master dark to save"),
        }
    }
}

fn write_report(output: &PipelineOutput, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&output.report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    debug!("Saved report to {}", path.display());
    Ok(())
}

fn run(args: &Args) -> Result<Option<f64>> {
    let config = load_config(args)?;

    let output = run_pipeline(
        &args.folder,
        &config,
        &FitsFrameStore,
        DaoDetector::default(),
        CircularAperturePhotometer::new(config.photometry.subpixels),
    )?;

    save_outputs(&output, args);
    Ok(output.report.snr)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();

    match run(&args) {
        Ok(Some(snr)) => {
            println!("SNR: {snr}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("error.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            println!("error.");
            ExitCode::from(1)
        }
    }
}
