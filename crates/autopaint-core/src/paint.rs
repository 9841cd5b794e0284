//! Painting process
//!
//! The half of the pipeline that runs outside the host. For every baked map
//! in the working directory it renders a painted version, masks the painted
//! image with the baked reference's background, clamps its drift back toward
//! the reference and writes the seed-suffixed final image the orchestrator
//! picks up.

use std::path::{Path, PathBuf};

use crate::args::RunArgs;
use crate::correction::{correct_image, measure_drift, CorrectionThresholds, DriftSummary};
use crate::decoders::decode_image;
use crate::error::PipelineError;
use crate::exporters::export_png8;
use crate::mask::{apply_mask, extract_mask};
use crate::models::{MapKind, Run};
use crate::process::{run_captured, CommandTemplate, Placeholders};

/// One render the painter asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub kind: MapKind,
    pub working_dir: PathBuf,
    /// Baked map substituted into the painting scene
    pub input: PathBuf,
    /// Where the painted render must be written
    pub output: PathBuf,
    pub args: RunArgs,
}

/// Produces painted renders from baked maps
pub trait Renderer {
    fn render(&mut self, job: &RenderJob) -> Result<(), PipelineError>;
}

impl<F> Renderer for F
where
    F: FnMut(&RenderJob) -> Result<(), PipelineError>,
{
    fn render(&mut self, job: &RenderJob) -> Result<(), PipelineError> {
        self(job)
    }
}

/// Renderer that runs a configured command per job.
///
/// Placeholders: `{workdir}`, `{input}`, `{output}`, `{resolution}`,
/// `{samples}`, `{seed}`, `{map}`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    template: CommandTemplate,
}

impl CommandRenderer {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }

    fn placeholders(job: &RenderJob) -> Placeholders {
        let mut values = Placeholders::new();
        values.insert("workdir", job.working_dir.display().to_string());
        values.insert("input", job.input.display().to_string());
        values.insert("output", job.output.display().to_string());
        values.insert("resolution", job.args.render_resolution.to_string());
        values.insert("samples", job.args.samples.to_string());
        values.insert("seed", job.args.seed.to_string());
        values.insert("map", job.kind.to_string());
        values
    }
}

impl Renderer for CommandRenderer {
    fn render(&mut self, job: &RenderJob) -> Result<(), PipelineError> {
        let (program, args) = self.template.expand(&Self::placeholders(job));
        run_captured(&program, &args, &job.working_dir)?.into_result()?;
        Ok(())
    }
}

/// Result of painting one map
#[derive(Debug, Clone, PartialEq)]
pub struct PaintOutcome {
    pub kind: MapKind,
    pub final_path: PathBuf,
    /// Painted pixels forced back to the background
    pub masked_pixels: usize,
    pub drift: DriftSummary,
}

/// Render, mask and correct one map of `run`.
pub fn paint_map<R: Renderer + ?Sized>(
    run: &Run,
    kind: MapKind,
    args: &RunArgs,
    thresholds: &CorrectionThresholds,
    renderer: &mut R,
) -> Result<PaintOutcome, PipelineError> {
    let input = run.baked_path(kind);
    if !input.is_file() {
        return Err(PipelineError::ArtifactMissing(input));
    }

    let painted = run.painted_path(kind);
    if painted.exists() {
        std::fs::remove_file(&painted).map_err(|e| PipelineError::io(&painted, e))?;
    }

    log::info!("Rendering painted {} map to {}", kind, painted.display());
    renderer.render(&RenderJob {
        kind,
        working_dir: run.working_dir().to_path_buf(),
        input: input.clone(),
        output: painted.clone(),
        args: *args,
    })?;
    if !painted.is_file() {
        return Err(PipelineError::ArtifactMissing(painted));
    }

    let reference = decode_image(&input)?;
    let mut candidate = decode_image(&painted)?;

    let mask = extract_mask(&reference);
    let masked_pixels = apply_mask(&mask, &mut candidate)?;
    log::debug!(
        "{} of {} background pixels forced in painted {} map",
        masked_pixels,
        mask.masked_count(),
        kind
    );
    if let Some(masked_path) = run.masked_path(kind) {
        export_png8(&candidate, &masked_path)?;
        log::info!("Saved masked image to {}", masked_path.display());
    }

    let drift = measure_drift(&reference, &candidate, thresholds)?;
    log::debug!(
        "{} drift: {} hue, {} saturation, {} value clamps over {} pixels",
        kind,
        drift.hue_clamped,
        drift.saturation_clamped,
        drift.value_clamped,
        drift.pixels
    );

    let mut corrected = correct_image(&reference, &candidate, thresholds)?;
    apply_mask(&mask, &mut corrected)?;

    let final_path = run.final_path(kind);
    export_png8(&corrected, &final_path)?;
    log::info!("Saved corrected {} map to {}", kind, final_path.display());

    Ok(PaintOutcome {
        kind,
        final_path,
        masked_pixels,
        drift,
    })
}

/// Paint every map baked into `working_dir`.
///
/// At least one baked map must be present; the normal map is reported
/// missing otherwise.
pub fn paint_all<R: Renderer + ?Sized>(
    working_dir: &Path,
    args: &RunArgs,
    thresholds: &CorrectionThresholds,
    renderer: &mut R,
) -> Result<Vec<PaintOutcome>, PipelineError> {
    let run = Run::with_seed(working_dir, args.seed);
    let kinds: Vec<MapKind> = MapKind::ALL
        .into_iter()
        .filter(|kind| run.baked_path(*kind).is_file())
        .collect();

    if kinds.is_empty() {
        return Err(PipelineError::ArtifactMissing(run.baked_path(MapKind::Normal)));
    }

    kinds
        .into_iter()
        .map(|kind| paint_map(&run, kind, args, thresholds, &mut *renderer))
        .collect()
}
