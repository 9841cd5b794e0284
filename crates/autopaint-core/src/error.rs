//! Error taxonomy shared by every pipeline stage.
//!
//! None of these are retried. A stage returns the first violation it finds,
//! and the orchestrator wraps it in a [`RunFailure`] naming the stage.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::MapKind;
use crate::orchestrator::RunState;

/// Failure of a single pipeline operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no active mesh object selected")]
    NoSelection,

    #[error("bake failed: {0}")]
    BakeFailed(String),

    #[error("external process failed with exit code {code}: {stderr}")]
    ExternalProcessFailed { code: i32, stderr: String },

    #[error("expected artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("material '{0}' has no principled shader node")]
    NoPrincipledShader(String),

    #[error("object '{0}' has no active material")]
    NoMaterial(String),

    #[error("object '{0}' not found in scene")]
    ObjectNotFound(String),

    #[error("node {node} has no socket named '{socket}'")]
    UnknownSocket { node: u32, socket: String },

    #[error("material '{material}' has no node {node}")]
    UnknownNode { material: String, node: u32 },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error on {}: {reason}", .path.display())]
    Image { path: PathBuf, reason: String },

    #[error("invalid document {}: {reason}", .path.display())]
    Document { path: PathBuf, reason: String },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Image {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Terminal failure of a whole run.
///
/// `completed` lists the maps that were reattached before the failing step;
/// that work is kept.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct RunFailure {
    pub stage: RunState,
    #[source]
    pub source: PipelineError,
    pub completed: Vec<MapKind>,
}
