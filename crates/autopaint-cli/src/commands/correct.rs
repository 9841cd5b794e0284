use std::path::PathBuf;

use anyhow::Result;
use autopaint_cli::correct_files;
use autopaint_core::config::load_pipeline_config;
use autopaint_core::correction::CorrectionThresholds;

/// Correct a single candidate image against its reference.
pub fn cmd_correct(
    reference: PathBuf,
    candidate: PathBuf,
    out: PathBuf,
    thresholds: Option<CorrectionThresholds>,
    no_mask: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let thresholds = match thresholds {
        Some(t) => t,
        None => {
            let handle = load_pipeline_config(config.as_deref());
            handle.log_usage();
            handle.config.defaults.thresholds
        }
    };

    let report = correct_files(&reference, &candidate, &out, &thresholds, !no_mask)?;
    let drift = &report.drift;

    println!("Corrected {} -> {}", candidate.display(), out.display());
    if let Some(masked) = report.masked_pixels {
        println!("  Background pixels: {}", masked);
    }
    println!(
        "  Clamped: hue {}, saturation {}, value {} of {} pixels ({:.1}%)",
        drift.hue_clamped,
        drift.saturation_clamped,
        drift.value_clamped,
        drift.pixels,
        drift.clamped_fraction() * 100.0
    );
    Ok(())
}
