//! Per-run parameters gathered from the command line.

use std::path::PathBuf;

use autopaint_core::config::PipelineDefaults;
use autopaint_core::correction::CorrectionThresholds;
use autopaint_core::models::MapKind;
use autopaint_core::orchestrator::PipelineRequest;

/// Command-line values that override the configured defaults.
/// `None` means "use the config file's value".
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub working_dir: Option<PathBuf>,
    pub resolution: Option<u32>,
    pub samples: Option<u32>,
    pub maps: Option<Vec<MapKind>>,
    pub thresholds: Option<CorrectionThresholds>,
    pub seed: Option<u32>,
}

impl RunOverrides {
    /// Merge onto `defaults`, producing the orchestrator request and the
    /// thresholds the painting process should use.
    pub fn resolve(
        self,
        defaults: &PipelineDefaults,
    ) -> Result<(PipelineRequest, CorrectionThresholds), String> {
        let mut request = PipelineRequest::from_defaults(defaults);

        if let Some(resolution) = self.resolution {
            if resolution == 0 {
                return Err("Resolution must be greater than zero".to_string());
            }
            request.resolution = resolution;
        }
        if let Some(samples) = self.samples {
            if samples == 0 {
                return Err("Samples must be greater than zero".to_string());
            }
            request.samples = samples;
        }
        if let Some(maps) = self.maps {
            request.maps = maps;
        }
        request.working_dir = self.working_dir;
        request.seed = self.seed;

        let thresholds = self.thresholds.unwrap_or(defaults.thresholds);
        Ok((request, thresholds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_use_defaults() {
        let defaults = PipelineDefaults::default();

        let (request, thresholds) = RunOverrides::default().resolve(&defaults).unwrap();

        assert_eq!(request, PipelineRequest::from_defaults(&defaults));
        assert_eq!(thresholds, defaults.thresholds);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = RunOverrides {
            working_dir: Some(PathBuf::from("/work")),
            resolution: Some(1024),
            samples: Some(8),
            maps: Some(vec![MapKind::Color]),
            thresholds: Some(CorrectionThresholds::new(0.1, 0.2, 0.3)),
            seed: Some(42),
        };

        let (request, thresholds) = overrides.resolve(&PipelineDefaults::default()).unwrap();

        assert_eq!(request.resolution, 1024);
        assert_eq!(request.samples, 8);
        assert_eq!(request.maps, vec![MapKind::Color]);
        assert_eq!(request.seed, Some(42));
        assert_eq!(request.working_dir, Some(PathBuf::from("/work")));
        assert_eq!(thresholds.value, 0.3);
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        let overrides = RunOverrides {
            resolution: Some(0),
            ..RunOverrides::default()
        };

        assert!(overrides.resolve(&PipelineDefaults::default()).is_err());
    }
}
