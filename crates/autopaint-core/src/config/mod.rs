//! Pipeline configuration management.
//!
//! Configuration lives in `autopaint.yml`. Loading never fails: unreadable or
//! malformed candidates are skipped with a warning and the built-in defaults
//! are used when nothing loads.

mod defaults;

pub use defaults::{PipelineDefaults, DEFAULT_RENDER_RESOLUTION, DEFAULT_SAMPLES};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::process::CommandTemplate;

/// File name searched for in each candidate directory
pub const CONFIG_FILENAME: &str = "autopaint.yml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AUTOPAINT_CONFIG";

/// Handle that stores the loaded configuration, its source path, and warnings.
pub struct PipelineConfigHandle {
    pub config: AutopaintConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl PipelineConfigHandle {
    fn with_config(config: AutopaintConfig, source: Option<PathBuf>, warnings: Vec<String>) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }

    /// Report where the configuration came from and any warnings
    pub fn log_usage(&self) {
        match &self.source {
            Some(source) => log::info!("Loaded config from {}", source.display()),
            None => log::debug!("Using built-in defaults"),
        }
        for warning in &self.warnings {
            log::warn!("Config warning: {}", warning);
        }
    }
}

/// Settings for the external painting process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    /// Command the orchestrator dispatches; the keyword arguments are
    /// appended. `None` means this program's own `paint` subcommand.
    pub command: Option<CommandTemplate>,
    /// Files that must exist in the working directory before dispatch
    pub required_files: Vec<String>,
    /// Command that renders one painted image from a baked input
    pub render_command: CommandTemplate,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            command: None,
            required_files: vec!["painter.blend".to_string()],
            render_command: CommandTemplate::new(
                "blender",
                [
                    "-b",
                    "{workdir}/painter.blend",
                    "-P",
                    "{workdir}/render_painting.py",
                    "--",
                    "input",
                    "{input}",
                    "output",
                    "{output}",
                    "render_resolution",
                    "{resolution}",
                    "samples",
                    "{samples}",
                    "seed",
                    "{seed}",
                    "map",
                    "{map}",
                ],
            ),
        }
    }
}

/// Settings for the command-backed host bake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub bake_command: CommandTemplate,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bake_command: CommandTemplate::new(
                "blender",
                [
                    "-b",
                    "{scene}",
                    "-P",
                    "{workdir}/bake_map.py",
                    "--",
                    "object",
                    "{object}",
                    "map",
                    "{map}",
                    "resolution",
                    "{resolution}",
                    "output",
                    "{output}",
                ],
            ),
        }
    }
}

/// Complete configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AutopaintConfig {
    pub defaults: PipelineDefaults,
    pub painter: PainterConfig,
    pub host: HostConfig,
}

impl AutopaintConfig {
    fn sanitize(mut self, warnings: &mut Vec<String>) -> Self {
        self.defaults.sanitize(warnings);
        self
    }

    /// YAML text of this configuration, suitable for `autopaint.yml`
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Load configuration from disk, optionally forcing a specific path.
pub fn load_pipeline_config(custom_path: Option<&Path>) -> PipelineConfigHandle {
    load_from_candidates(get_config_candidates(custom_path))
}

fn load_from_candidates(candidates: Vec<PathBuf>) -> PipelineConfigHandle {
    let mut warnings = Vec::new();

    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match serde_yaml::from_str::<AutopaintConfig>(&contents) {
                Ok(config) => {
                    let sanitized = config.sanitize(&mut warnings);
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return PipelineConfigHandle::with_config(sanitized, Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No config found; using built-in defaults.".to_string());
    PipelineConfigHandle::with_config(AutopaintConfig::default(), None, warnings)
}

/// Get list of config file candidates to try
fn get_config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("config").join(CONFIG_FILENAME));
        candidates.push(cwd.join(CONFIG_FILENAME));
    }

    if let Some(home_dir) = dirs::home_dir() {
        candidates.push(home_dir.join("autopaint").join(CONFIG_FILENAME));
    }

    candidates
}
