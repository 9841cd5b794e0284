use std::path::PathBuf;

use anyhow::{Context, Result};
use autopaint_core::args::RunArgs;
use autopaint_core::config::load_pipeline_config;
use autopaint_core::correction::CorrectionThresholds;
use autopaint_core::paint::{paint_all, CommandRenderer};

/// The external painting process: render, mask and correct every baked map
/// in `workdir`.
pub fn cmd_paint(
    workdir: PathBuf,
    thresholds: Option<CorrectionThresholds>,
    config: Option<PathBuf>,
    keyword_args: Vec<String>,
) -> Result<()> {
    let handle = load_pipeline_config(config.as_deref());
    handle.log_usage();

    let args = RunArgs::parse(&keyword_args).context("Invalid painting arguments")?;
    let thresholds = thresholds.unwrap_or(handle.config.defaults.thresholds);
    let mut renderer = CommandRenderer::new(handle.config.painter.render_command.clone());

    log::info!(
        "Painting in {} (resolution {}, samples {}, seed {})",
        workdir.display(),
        args.render_resolution,
        args.samples,
        args.seed
    );
    let outcomes = paint_all(&workdir, &args, &thresholds, &mut renderer)?;

    for outcome in &outcomes {
        println!(
            "{}: {} ({:.1}% of pixels clamped)",
            outcome.kind,
            outcome.final_path.display(),
            outcome.drift.clamped_fraction() * 100.0
        );
    }
    Ok(())
}
