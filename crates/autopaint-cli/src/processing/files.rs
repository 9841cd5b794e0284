//! Standalone masking and correction of image files.

use std::path::Path;

use anyhow::{Context, Result};
use autopaint_core::correction::{correct_image, measure_drift, CorrectionThresholds, DriftSummary};
use autopaint_core::decoders::decode_image;
use autopaint_core::exporters::export_png8;
use autopaint_core::mask::{apply_mask, extract_mask};

/// What `correct_files` did
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectReport {
    /// Drift measured before correction (after masking, when enabled)
    pub drift: DriftSummary,
    /// Pixels forced to the background, `None` when masking was off
    pub masked_pixels: Option<usize>,
}

/// Correct `candidate` toward `reference` and write the result to `out`.
///
/// With `use_mask` the reference's background is applied to the candidate
/// before and after correction, as the painting process does.
pub fn correct_files(
    reference_path: &Path,
    candidate_path: &Path,
    out: &Path,
    thresholds: &CorrectionThresholds,
    use_mask: bool,
) -> Result<CorrectReport> {
    let reference = decode_image(reference_path)
        .with_context(|| format!("Failed to load reference {}", reference_path.display()))?;
    let mut candidate = decode_image(candidate_path)
        .with_context(|| format!("Failed to load candidate {}", candidate_path.display()))?;

    let mask = use_mask.then(|| extract_mask(&reference));
    let masked_pixels = match &mask {
        Some(mask) => Some(apply_mask(mask, &mut candidate)?),
        None => None,
    };

    let drift = measure_drift(&reference, &candidate, thresholds)?;
    let mut corrected = correct_image(&reference, &candidate, thresholds)?;
    if let Some(mask) = &mask {
        apply_mask(mask, &mut corrected)?;
    }

    export_png8(&corrected, out).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(CorrectReport {
        drift,
        masked_pixels,
    })
}

/// Apply the background of `reference` to `target`, writing `out`.
///
/// Returns the number of background pixels.
pub fn mask_files(reference_path: &Path, target_path: &Path, out: &Path) -> Result<usize> {
    let reference = decode_image(reference_path)
        .with_context(|| format!("Failed to load reference {}", reference_path.display()))?;
    let mut target = decode_image(target_path)
        .with_context(|| format!("Failed to load target {}", target_path.display()))?;

    let mask = extract_mask(&reference);
    let masked = apply_mask(&mask, &mut target)?;

    export_png8(&target, out).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(masked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopaint_core::models::RgbImage;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, image: &RgbImage) -> std::path::PathBuf {
        let path = dir.join(name);
        export_png8(image, &path).unwrap();
        path
    }

    #[test]
    fn test_correct_files_with_mask() {
        let dir = tempdir().unwrap();
        let mut reference = RgbImage::filled(2, 1, [200, 100, 100]);
        reference.set_pixel(0, 0, [0, 0, 0]);
        let reference = write(dir.path(), "ref.png", &reference);
        let candidate = write(dir.path(), "cand.png", &RgbImage::filled(2, 1, [100, 100, 200]));
        let out = dir.path().join("out.png");

        let report = correct_files(
            &reference,
            &candidate,
            &out,
            &CorrectionThresholds::new(0.1, 1.0, 1.0),
            true,
        )
        .unwrap();

        assert_eq!(report.masked_pixels, Some(1));
        let corrected = decode_image(&out).unwrap();
        assert_eq!(corrected.pixel(0, 0), [0, 0, 0]);
        assert_eq!(corrected.pixel(1, 0), [200, 100, 160]);
    }

    #[test]
    fn test_correct_files_without_mask_is_identity_for_equal_images() {
        let dir = tempdir().unwrap();
        let image = RgbImage::filled(3, 3, [12, 34, 56]);
        let reference = write(dir.path(), "ref.png", &image);
        let candidate = write(dir.path(), "cand.png", &image);
        let out = dir.path().join("out.png");

        let report = correct_files(
            &reference,
            &candidate,
            &out,
            &CorrectionThresholds::default(),
            false,
        )
        .unwrap();

        assert_eq!(report.masked_pixels, None);
        assert_eq!(report.drift.any_clamped, 0);
        assert_eq!(decode_image(&out).unwrap(), image);
    }

    #[test]
    fn test_mask_files_size_mismatch() {
        let dir = tempdir().unwrap();
        let reference = write(dir.path(), "ref.png", &RgbImage::filled(2, 2, [0, 0, 0]));
        let target = write(dir.path(), "target.png", &RgbImage::filled(3, 2, [9, 9, 9]));

        let result = mask_files(&reference, &target, &dir.path().join("out.png"));

        assert!(result.is_err());
        assert!(!dir.path().join("out.png").exists());
    }
}
