//! One pipeline execution and the artifact names derived from its seed.

use std::path::{Path, PathBuf};

use rand::Rng;

use super::MapKind;

/// Largest seed a run can draw (inclusive)
pub const SEED_MAX: u32 = 99_999;

/// A single pipeline execution.
///
/// The seed only disambiguates the seed-suffixed outputs. `normals.png`,
/// `colors.png`, `painted.png` and `masked.png` keep fixed names and are
/// overwritten by every run, so two runs must not share a working directory
/// at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub seed: u32,
    pub working_dir: PathBuf,
}

impl Run {
    /// Start a run with a seed drawn uniformly from `0..=SEED_MAX`.
    pub fn generate(working_dir: impl Into<PathBuf>) -> Self {
        let seed = rand::rng().random_range(0..=SEED_MAX);
        Self::with_seed(working_dir, seed)
    }

    pub fn with_seed(working_dir: impl Into<PathBuf>, seed: u32) -> Self {
        Self {
            seed,
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Baked reference (`normals.png` / `colors.png`)
    pub fn baked_path(&self, kind: MapKind) -> PathBuf {
        self.working_dir.join(kind.baked_file_name())
    }

    /// Raw output of the painting render
    pub fn painted_path(&self, kind: MapKind) -> PathBuf {
        match kind {
            MapKind::Normal => self.working_dir.join("painted.png"),
            MapKind::Color => self
                .working_dir
                .join(format!("pre_colors_{}.png", self.seed)),
        }
    }

    /// Masked intermediate, only persisted for the normal map
    pub fn masked_path(&self, kind: MapKind) -> Option<PathBuf> {
        match kind {
            MapKind::Normal => Some(self.working_dir.join("masked.png")),
            MapKind::Color => None,
        }
    }

    /// Corrected output the orchestrator reattaches
    pub fn final_path(&self, kind: MapKind) -> PathBuf {
        self.working_dir.join(final_file_name(kind, self.seed))
    }
}

/// `final_<seed>.png` or `final_colors_<seed>.png`
pub fn final_file_name(kind: MapKind, seed: u32) -> String {
    match kind {
        MapKind::Normal => format!("final_{}.png", seed),
        MapKind::Color => format!("final_colors_{}.png", seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names_follow_seed() {
        let run = Run::with_seed("/work", 42);

        assert_eq!(run.baked_path(MapKind::Normal), Path::new("/work/normals.png"));
        assert_eq!(run.baked_path(MapKind::Color), Path::new("/work/colors.png"));
        assert_eq!(run.painted_path(MapKind::Normal), Path::new("/work/painted.png"));
        assert_eq!(
            run.painted_path(MapKind::Color),
            Path::new("/work/pre_colors_42.png")
        );
        assert_eq!(
            run.masked_path(MapKind::Normal),
            Some(PathBuf::from("/work/masked.png"))
        );
        assert_eq!(run.masked_path(MapKind::Color), None);
        assert_eq!(run.final_path(MapKind::Normal), Path::new("/work/final_42.png"));
        assert_eq!(
            run.final_path(MapKind::Color),
            Path::new("/work/final_colors_42.png")
        );
    }

    #[test]
    fn test_generated_seed_in_range() {
        for _ in 0..100 {
            let run = Run::generate("/work");
            assert!(run.seed <= SEED_MAX);
        }
    }
}
