//! Map baker
//!
//! Asks the host to rasterize a map of the selected mesh into a square PNG,
//! then verifies the file really landed. A bake that "succeeds" without
//! producing a correctly sized image is reported as a failure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decoders::read_png_dimensions;
use crate::error::PipelineError;
use crate::host::{BakeRequest, NormalSpace, SceneHost};
use crate::models::MapKind;

/// Name given to the material created for objects with no slots
pub const DEFAULT_MATERIAL_NAME: &str = "Material";

/// Signal the host bakes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BakeType {
    Normal,
    Diffuse,
}

/// Bake configuration pushed to the host before every bake.
///
/// Replaces whatever the host had configured; sample count is not touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeSettings {
    pub bake_type: BakeType,
    pub normal_space: NormalSpace,
    pub use_selected_to_active: bool,
    pub use_cage: bool,
    pub cage_extrusion: f32,
    pub max_ray_distance: f32,
    pub use_clear: bool,
    /// Diffuse passes; only meaningful for `BakeType::Diffuse`
    pub use_pass_direct: bool,
    pub use_pass_indirect: bool,
    pub use_pass_color: bool,
}

impl BakeSettings {
    pub fn for_map(kind: MapKind) -> Self {
        let base = Self {
            bake_type: BakeType::Normal,
            normal_space: NormalSpace::Object,
            use_selected_to_active: false,
            use_cage: false,
            cage_extrusion: 0.0,
            max_ray_distance: 0.0,
            use_clear: true,
            use_pass_direct: false,
            use_pass_indirect: false,
            use_pass_color: false,
        };

        match kind {
            MapKind::Normal => base,
            // Albedo only: lighting contributions off
            MapKind::Color => Self {
                bake_type: BakeType::Diffuse,
                use_pass_color: true,
                ..base
            },
        }
    }
}

fn bake_failed(reason: impl Into<String>) -> PipelineError {
    PipelineError::BakeFailed(reason.into())
}

/// Bake `kind` of `object` at `resolution` x `resolution` into `output`.
///
/// Creates a material first when the object has no slots. Any stale file at
/// `output` is removed before baking.
pub fn bake_map<H: SceneHost + ?Sized>(
    host: &mut H,
    object: &str,
    kind: MapKind,
    resolution: u32,
    output: &Path,
) -> Result<PathBuf, PipelineError> {
    log::info!("Baking {} map of {} to {}", kind, object, output.display());

    if resolution == 0 {
        return Err(bake_failed("resolution must be greater than zero"));
    }

    let slots = host
        .material_slots(object)
        .map_err(|e| bake_failed(e.to_string()))?;
    if slots.is_empty() {
        log::info!("{} has no material, creating '{}'", object, DEFAULT_MATERIAL_NAME);
        host.add_material(object, DEFAULT_MATERIAL_NAME)
            .map_err(|e| bake_failed(e.to_string()))?;
    }
    let material = host
        .active_material(object)
        .ok_or_else(|| bake_failed(format!("{} has no active material", object)))?;

    if output.exists() {
        std::fs::remove_file(output).map_err(|e| PipelineError::io(output, e))?;
    }

    let settings = BakeSettings::for_map(kind);
    host.apply_bake_settings(&settings);

    let request = BakeRequest {
        kind,
        object: object.to_string(),
        material,
        settings,
        resolution,
        output: output.to_path_buf(),
    };
    host.bake_to_file(&request)
        .map_err(|reason| bake_failed(format!("{} map of {}: {}", kind, object, reason)))?;

    verify_bake_output(output, resolution)?;

    log::info!("{} map baked to {}", kind, output.display());
    Ok(output.to_path_buf())
}

fn verify_bake_output(output: &Path, resolution: u32) -> Result<(), PipelineError> {
    let metadata = std::fs::metadata(output)
        .map_err(|_| bake_failed(format!("host produced no image at {}", output.display())))?;
    if metadata.len() == 0 {
        return Err(bake_failed(format!(
            "host wrote an empty file at {}",
            output.display()
        )));
    }

    let dims = read_png_dimensions(output).map_err(|e| bake_failed(e.to_string()))?;
    if dims != (resolution, resolution) {
        return Err(bake_failed(format!(
            "expected a {}x{} image at {}, got {}x{}",
            resolution,
            resolution,
            output.display(),
            dims.0,
            dims.1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporters::export_png8;
    use crate::host::{BakeBackend, MemoryHost, ObjectKind, SceneDocument};
    use crate::models::RgbImage;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn solid_backend(rgb: [u8; 3]) -> impl BakeBackend {
        move |req: &BakeRequest| {
            let image = RgbImage::filled(req.resolution, req.resolution, rgb);
            export_png8(&image, &req.output).map_err(|e| e.to_string())
        }
    }

    fn scene_with_cube(materials: &[&str]) -> SceneDocument {
        let mut scene = SceneDocument::default();
        scene.add_object("Cube", ObjectKind::Mesh);
        for name in materials {
            scene.add_material("Cube", name).unwrap();
        }
        scene.active_object = Some("Cube".to_string());
        scene
    }

    #[test]
    fn test_color_settings_are_albedo_only() {
        let settings = BakeSettings::for_map(MapKind::Color);

        assert_eq!(settings.bake_type, BakeType::Diffuse);
        assert!(settings.use_pass_color);
        assert!(!settings.use_pass_direct);
        assert!(!settings.use_pass_indirect);
    }

    #[test]
    fn test_normal_settings_are_object_space() {
        let settings = BakeSettings::for_map(MapKind::Normal);

        assert_eq!(settings.bake_type, BakeType::Normal);
        assert_eq!(settings.normal_space, NormalSpace::Object);
        assert!(settings.use_clear);
        assert!(!settings.use_cage);
    }

    #[test]
    fn test_bake_creates_material_when_missing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("normals.png");
        let mut host = MemoryHost::new(scene_with_cube(&[]), solid_backend([128, 128, 255]));

        bake_map(&mut host, "Cube", MapKind::Normal, 8, &output).unwrap();

        assert_eq!(host.material_slots("Cube").unwrap(), vec!["Material"]);
        assert_eq!(
            host.scene().bake_settings,
            Some(BakeSettings::for_map(MapKind::Normal))
        );
        assert_eq!(read_png_dimensions(&output).unwrap(), (8, 8));
    }

    #[test]
    fn test_bake_passes_request_to_backend() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("colors.png");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_backend = Rc::clone(&seen);
        let backend = move |req: &BakeRequest| {
            seen_by_backend.borrow_mut().push(req.clone());
            export_png8(&RgbImage::filled(4, 4, [1, 2, 3]), &req.output).map_err(|e| e.to_string())
        };
        let mut host = MemoryHost::new(scene_with_cube(&["Paint"]), backend);

        bake_map(&mut host, "Cube", MapKind::Color, 4, &output).unwrap();

        let requests = seen.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, MapKind::Color);
        assert_eq!(requests[0].material, "Paint");
        assert_eq!(requests[0].settings.bake_type, BakeType::Diffuse);
        assert_eq!(requests[0].output, output);
    }

    #[test]
    fn test_backend_error_is_bake_failed() {
        let dir = tempdir().unwrap();
        let backend = |_: &BakeRequest| -> Result<(), String> { Err("no UV map".to_string()) };
        let mut host = MemoryHost::new(scene_with_cube(&["Material"]), backend);

        let result = bake_map(&mut host, "Cube", MapKind::Normal, 8, &dir.path().join("n.png"));

        match result {
            Err(PipelineError::BakeFailed(reason)) => assert!(reason.contains("no UV map")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_silent_backend_is_bake_failed_even_with_stale_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("normals.png");
        export_png8(&RgbImage::filled(8, 8, [9, 9, 9]), &output).unwrap();
        let backend = |_: &BakeRequest| -> Result<(), String> { Ok(()) };
        let mut host = MemoryHost::new(scene_with_cube(&["Material"]), backend);

        let result = bake_map(&mut host, "Cube", MapKind::Normal, 8, &output);

        assert!(matches!(result, Err(PipelineError::BakeFailed(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_wrong_size_is_bake_failed() {
        let dir = tempdir().unwrap();
        let mut host = MemoryHost::new(scene_with_cube(&["Material"]), solid_backend([5, 5, 5]));
        // Backend always writes resolution-sized images, so ask the verifier directly
        let output = dir.path().join("normals.png");
        bake_map(&mut host, "Cube", MapKind::Normal, 8, &output).unwrap();

        let result = verify_bake_output(&output, 16);

        assert!(matches!(result, Err(PipelineError::BakeFailed(_))));
    }

    #[test]
    fn test_unknown_object_is_bake_failed() {
        let dir = tempdir().unwrap();
        let mut host = MemoryHost::new(scene_with_cube(&[]), solid_backend([0, 0, 0]));

        let result = bake_map(&mut host, "Sphere", MapKind::Normal, 8, &dir.path().join("n.png"));

        assert!(matches!(result, Err(PipelineError::BakeFailed(_))));
    }

    #[test]
    fn test_zero_resolution_is_bake_failed() {
        let dir = tempdir().unwrap();
        let mut host = MemoryHost::new(scene_with_cube(&[]), solid_backend([0, 0, 0]));

        let result = bake_map(&mut host, "Cube", MapKind::Normal, 0, &dir.path().join("n.png"));

        assert!(matches!(result, Err(PipelineError::BakeFailed(_))));
    }
}
