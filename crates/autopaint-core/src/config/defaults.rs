//! Default run parameters and their sanitization.

use serde::{Deserialize, Serialize};

use crate::correction::CorrectionThresholds;
use crate::models::MapKind;

pub const DEFAULT_RENDER_RESOLUTION: u32 = 2048;
pub const DEFAULT_SAMPLES: u32 = 64;

/// Values used when a caller does not override them per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    /// Edge length of the square bake and render, in pixels
    pub render_resolution: u32,
    /// Render samples for the painting process
    pub samples: u32,
    /// Maps to bake, paint and reattach, in order
    pub maps: Vec<MapKind>,
    pub thresholds: CorrectionThresholds,
}

impl PipelineDefaults {
    pub(crate) fn sanitize(&mut self, warnings: &mut Vec<String>) {
        if self.render_resolution == 0 {
            warnings.push(format!(
                "render_resolution must be positive; using {}",
                DEFAULT_RENDER_RESOLUTION
            ));
            self.render_resolution = DEFAULT_RENDER_RESOLUTION;
        }
        if self.samples == 0 {
            warnings.push(format!("samples must be positive; using {}", DEFAULT_SAMPLES));
            self.samples = DEFAULT_SAMPLES;
        }
        if self.maps.is_empty() {
            warnings.push("maps is empty; using normal and color".to_string());
            self.maps = MapKind::ALL.to_vec();
        }
        let mut seen = Vec::with_capacity(self.maps.len());
        self.maps.retain(|kind| {
            if seen.contains(kind) {
                false
            } else {
                seen.push(*kind);
                true
            }
        });
        warnings.extend(self.thresholds.sanitize());
    }
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            render_resolution: DEFAULT_RENDER_RESOLUTION,
            samples: DEFAULT_SAMPLES,
            maps: MapKind::ALL.to_vec(),
            thresholds: CorrectionThresholds::default(),
        }
    }
}
