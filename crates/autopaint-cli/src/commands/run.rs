use std::path::PathBuf;

use anyhow::{Context, Result};
use autopaint_cli::{painter_dispatcher, CommandBakeBackend, RunOverrides};
use autopaint_core::config::load_pipeline_config;
use autopaint_core::host::{MemoryHost, SceneDocument};
use autopaint_core::orchestrator::Orchestrator;

/// Bake, dispatch the painting process and reattach the results.
///
/// The scene document is written back even when the run fails part-way, so
/// maps reattached before the failure are kept.
pub fn cmd_run(scene: PathBuf, overrides: RunOverrides, config: Option<PathBuf>) -> Result<()> {
    let handle = load_pipeline_config(config.as_deref());
    handle.log_usage();

    let threshold_override = overrides.thresholds;
    let (request, _) = overrides
        .resolve(&handle.config.defaults)
        .map_err(anyhow::Error::msg)?;

    let document = SceneDocument::load(&scene)
        .with_context(|| format!("Failed to load scene {}", scene.display()))?;
    let backend = CommandBakeBackend::new(handle.config.host.bake_command.clone(), &scene);
    let mut host = MemoryHost::new(document, backend);
    let mut dispatcher = painter_dispatcher(
        &handle.config.painter,
        handle.source.as_deref(),
        threshold_override.as_ref(),
    )?;

    let result = Orchestrator::new(&mut host, &mut dispatcher).run(&request);

    host.scene()
        .save()
        .with_context(|| format!("Failed to save scene {}", scene.display()))?;

    match result {
        Ok(report) => {
            println!("Run {} on {}:", report.run.seed, report.object);
            for map in &report.attached {
                println!(
                    "  {} -> {} ({})",
                    map.kind,
                    map.image.path.display(),
                    map.material
                );
            }
            Ok(())
        }
        Err(failure) => {
            for kind in &failure.completed {
                println!("  {} map was reattached before the failure", kind);
            }
            Err(failure.into())
        }
    }
}
