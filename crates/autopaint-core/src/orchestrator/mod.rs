//! Pipeline orchestrator
//!
//! Drives one run through its stages:
//!
//! ```text
//! Idle -> Baking -> Dispatched -> AwaitingExternalProcess
//!      -> (Reconciling -> Reattaching) per map -> Done
//! ```
//!
//! Any stage may end the run in `Failed`. Nothing is retried and nothing is
//! rolled back: maps reattached before a failure stay attached and are
//! listed in the [`RunFailure`].


use std::fmt;
use std::path::{Path, PathBuf};

use crate::args::RunArgs;
use crate::bake::bake_map;
use crate::config::PipelineDefaults;
use crate::error::{PipelineError, RunFailure};
use crate::host::{ImageHandle, ObjectKind, SceneHost, SceneObject};
use crate::models::{MapKind, Run, SEED_MAX};
use crate::process::{run_captured, CommandTemplate, Placeholders, ProcessOutput};
use crate::rewrite::{attach, Attachment};

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Baking,
    Dispatched,
    AwaitingExternalProcess,
    Reconciling,
    Reattaching,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Baking => "baking",
            RunState::Dispatched => "dispatch",
            RunState::AwaitingExternalProcess => "external process",
            RunState::Reconciling => "reconciling",
            RunState::Reattaching => "reattaching",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Hands a run to the external painting process
pub trait Dispatcher {
    /// Check the working directory before anything is baked
    fn preflight(&self, _working_dir: &Path) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Run the painting process to completion
    fn dispatch(&mut self, working_dir: &Path, args: &RunArgs)
        -> Result<ProcessOutput, PipelineError>;
}

impl<F> Dispatcher for F
where
    F: FnMut(&Path, &RunArgs) -> Result<ProcessOutput, PipelineError>,
{
    fn dispatch(
        &mut self,
        working_dir: &Path,
        args: &RunArgs,
    ) -> Result<ProcessOutput, PipelineError> {
        self(working_dir, args)
    }
}

/// Dispatcher that spawns a configured command with the run's keyword
/// arguments appended. `{workdir}` in the template expands to the working
/// directory, which is also the child's current directory.
#[derive(Debug, Clone)]
pub struct SubprocessDispatcher {
    template: CommandTemplate,
    required_files: Vec<String>,
}

impl SubprocessDispatcher {
    pub fn new(template: CommandTemplate, required_files: Vec<String>) -> Self {
        Self {
            template,
            required_files,
        }
    }

    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }
}

impl Dispatcher for SubprocessDispatcher {
    fn preflight(&self, working_dir: &Path) -> Result<(), PipelineError> {
        for name in &self.required_files {
            let path = working_dir.join(name);
            if !path.is_file() {
                return Err(PipelineError::ArtifactMissing(path));
            }
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        working_dir: &Path,
        args: &RunArgs,
    ) -> Result<ProcessOutput, PipelineError> {
        let mut values = Placeholders::new();
        values.insert("workdir", working_dir.display().to_string());
        let (program, mut command_args) = self.template.expand(&values);
        command_args.extend(args.to_args());
        run_captured(&program, &command_args, working_dir)
    }
}

/// What the caller wants from one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    /// Defaults to the host scene's directory
    pub working_dir: Option<PathBuf>,
    pub resolution: u32,
    pub samples: u32,
    /// Maps to produce, in order
    pub maps: Vec<MapKind>,
    /// Drawn at random when absent
    pub seed: Option<u32>,
}

impl PipelineRequest {
    pub fn from_defaults(defaults: &PipelineDefaults) -> Self {
        Self {
            working_dir: None,
            resolution: defaults.render_resolution,
            samples: defaults.samples,
            maps: defaults.maps.clone(),
            seed: None,
        }
    }
}

impl Default for PipelineRequest {
    fn default() -> Self {
        Self::from_defaults(&PipelineDefaults::default())
    }
}

/// A map that made it back onto the material
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedMap {
    pub kind: MapKind,
    pub image: ImageHandle,
    pub material: String,
    pub attachment: Attachment,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run: Run,
    pub object: String,
    pub attached: Vec<AttachedMap>,
    pub process: ProcessOutput,
}

/// Sequences one run against a host and a dispatcher.
pub struct Orchestrator<'a> {
    host: &'a mut dyn SceneHost,
    dispatcher: &'a mut dyn Dispatcher,
    state: RunState,
    history: Vec<RunState>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(host: &'a mut dyn SceneHost, dispatcher: &'a mut dyn Dispatcher) -> Self {
        Self {
            host,
            dispatcher,
            state: RunState::Idle,
            history: vec![RunState::Idle],
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    /// Execute the whole pipeline once.
    ///
    /// An orchestrator runs a single time; a second call fails in `Idle`
    /// without touching the host.
    pub fn run(&mut self, request: &PipelineRequest) -> Result<RunReport, RunFailure> {
        let mut completed = Vec::new();

        if self.state != RunState::Idle {
            return Err(RunFailure {
                stage: self.state,
                source: PipelineError::InvalidArguments(
                    "orchestrator has already run".to_string(),
                ),
                completed,
            });
        }

        match self.execute(request, &mut completed) {
            Ok(report) => {
                self.transition(RunState::Done);
                log::info!(
                    "Run {} finished: {} map(s) reattached",
                    report.run.seed,
                    report.attached.len()
                );
                Ok(report)
            }
            Err(source) => {
                let stage = self.state;
                self.transition(RunState::Failed);
                log::error!("Run failed during {}: {}", stage, source);
                Err(RunFailure {
                    stage,
                    source,
                    completed,
                })
            }
        }
    }

    fn execute(
        &mut self,
        request: &PipelineRequest,
        completed: &mut Vec<MapKind>,
    ) -> Result<RunReport, PipelineError> {
        let object = self.selected_mesh()?;

        self.transition(RunState::Baking);
        if request.maps.is_empty() {
            return Err(PipelineError::BakeFailed("no maps requested".to_string()));
        }
        let working_dir = self.working_dir(request)?;
        if !working_dir.is_dir() {
            return Err(PipelineError::BakeFailed(format!(
                "working directory {} does not exist",
                working_dir.display()
            )));
        }
        self.dispatcher
            .preflight(&working_dir)
            .map_err(|e| PipelineError::BakeFailed(format!("painter preflight: {}", e)))?;
        self.bake_maps(&object, request, &working_dir)?;

        self.transition(RunState::Dispatched);
        let run = match request.seed {
            Some(seed) if seed > SEED_MAX => {
                return Err(PipelineError::InvalidArguments(format!(
                    "seed {} is outside 0..={}",
                    seed, SEED_MAX
                )))
            }
            Some(seed) => Run::with_seed(&working_dir, seed),
            None => Run::generate(&working_dir),
        };
        let args = RunArgs {
            render_resolution: request.resolution,
            samples: request.samples,
            seed: run.seed,
        };
        log::info!("Dispatching run {} in {}", run.seed, working_dir.display());

        self.transition(RunState::AwaitingExternalProcess);
        let process = self.dispatcher.dispatch(&working_dir, &args)?.into_result()?;

        let mut attached = Vec::with_capacity(request.maps.len());
        for &kind in &request.maps {
            self.transition(RunState::Reconciling);
            let image = self.reconcile(&run, kind)?;

            self.transition(RunState::Reattaching);
            let (material, attachment) = self.reattach(&object, &image, kind)?;

            completed.push(kind);
            attached.push(AttachedMap {
                kind,
                image,
                material,
                attachment,
            });
        }

        Ok(RunReport {
            run,
            object: object.name,
            attached,
            process,
        })
    }

    fn selected_mesh(&self) -> Result<SceneObject, PipelineError> {
        self.host
            .active_object()
            .filter(|object| object.kind == ObjectKind::Mesh)
            .ok_or(PipelineError::NoSelection)
    }

    fn working_dir(&self, request: &PipelineRequest) -> Result<PathBuf, PipelineError> {
        request
            .working_dir
            .clone()
            .or_else(|| self.host.scene_dir())
            .ok_or_else(|| {
                PipelineError::BakeFailed(
                    "scene has not been saved and no working directory was given".to_string(),
                )
            })
    }

    fn bake_maps(
        &mut self,
        object: &SceneObject,
        request: &PipelineRequest,
        working_dir: &Path,
    ) -> Result<(), PipelineError> {
        // The painter paints every baked map it finds, so drop unrequested ones
        for kind in MapKind::ALL {
            let target = working_dir.join(kind.baked_file_name());
            if !request.maps.contains(&kind) && target.exists() {
                std::fs::remove_file(&target).map_err(|e| PipelineError::io(&target, e))?;
            }
        }

        for &kind in &request.maps {
            let target = working_dir.join(kind.baked_file_name());
            bake_map(&mut *self.host, &object.name, kind, request.resolution, &target)?;
        }
        Ok(())
    }

    fn reconcile(&mut self, run: &Run, kind: MapKind) -> Result<ImageHandle, PipelineError> {
        let path = run.final_path(kind);
        if !path.is_file() {
            return Err(PipelineError::ArtifactMissing(path));
        }
        self.host.load_image(&path)
    }

    fn reattach(
        &mut self,
        object: &SceneObject,
        image: &ImageHandle,
        kind: MapKind,
    ) -> Result<(String, Attachment), PipelineError> {
        let material = self
            .host
            .active_material(&object.name)
            .ok_or_else(|| PipelineError::NoMaterial(object.name.clone()))?;
        let graph = self
            .host
            .material_graph(&material)
            .ok_or_else(|| PipelineError::NoMaterial(object.name.clone()))?;
        let attachment = attach(graph, image, kind.material_channel())?;
        Ok((material, attachment))
    }
}
