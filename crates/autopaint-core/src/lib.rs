//! Autopaint Core Library
//!
//! Bake a map from a 3D host, paint it in an external process, clamp the
//! painted result back toward the baked reference in HSV, and reattach the
//! corrected texture to the mesh's material.

pub mod args;
pub mod bake;
pub mod color;
pub mod config;
pub mod correction;
pub mod decoders;
pub mod error;
pub mod exporters;
pub mod host;
pub mod mask;
pub mod models;
pub mod orchestrator;
pub mod paint;
pub mod process;
pub mod rewrite;

/// Pixel count above which per-pixel work is spread over rayon's pool
pub(crate) const PARALLEL_THRESHOLD: usize = 30_000;

// Re-export commonly used types
pub use args::RunArgs;
pub use color::Hsv;
pub use correction::{correct_image, CorrectionThresholds, DriftSummary};
pub use error::{PipelineError, RunFailure};
pub use host::{MemoryHost, SceneDocument, SceneHost, ShadingGraph};
pub use mask::{apply_mask, extract_mask, Mask};
pub use models::{MapKind, MaterialChannel, RgbImage, Run};
pub use orchestrator::{Orchestrator, PipelineRequest, RunReport, RunState};
