//! Bake backend that shells out to a configured command.

use std::path::{Path, PathBuf};

use autopaint_core::host::{BakeBackend, BakeRequest};
use autopaint_core::process::{run_captured, CommandTemplate, Placeholders};

/// Runs `host.bake_command` once per bake.
///
/// Placeholders: `{scene}`, `{scene_dir}`, `{workdir}`, `{object}`,
/// `{material}`, `{map}`, `{resolution}`, `{output}`. `{workdir}` is the run's
/// working directory (the one holding `{output}`), as in the painter
/// templates. The command runs in the scene's directory.
pub struct CommandBakeBackend {
    template: CommandTemplate,
    scene: PathBuf,
}

impl CommandBakeBackend {
    pub fn new(template: CommandTemplate, scene: impl Into<PathBuf>) -> Self {
        Self {
            template,
            scene: scene.into(),
        }
    }

    fn scene_dir(&self) -> &Path {
        match self.scene.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn placeholders(&self, request: &BakeRequest) -> Placeholders {
        let mut values = Placeholders::new();
        values.insert("scene", self.scene.display().to_string());
        values.insert("scene_dir", self.scene_dir().display().to_string());
        let workdir = match request.output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => self.scene_dir(),
        };
        values.insert("workdir", workdir.display().to_string());
        values.insert("object", request.object.clone());
        values.insert("material", request.material.clone());
        values.insert("map", request.kind.to_string());
        values.insert("resolution", request.resolution.to_string());
        values.insert("output", request.output.display().to_string());
        values
    }
}

impl BakeBackend for CommandBakeBackend {
    fn bake(&mut self, request: &BakeRequest) -> Result<(), String> {
        let (program, args) = self.template.expand(&self.placeholders(request));
        let output = run_captured(&program, &args, self.scene_dir()).map_err(|e| e.to_string())?;
        output.into_result().map(|_| ()).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopaint_core::bake::BakeSettings;
    use autopaint_core::models::MapKind;

    fn request(output: PathBuf) -> BakeRequest {
        BakeRequest {
            kind: MapKind::Normal,
            object: "Cube".to_string(),
            material: "Material".to_string(),
            settings: BakeSettings::for_map(MapKind::Normal),
            resolution: 512,
            output,
        }
    }

    #[test]
    fn test_placeholders_describe_request() {
        let backend = CommandBakeBackend::new(
            CommandTemplate::new("bake", Vec::<String>::new()),
            "/scenes/robot.yml",
        );

        let values = backend.placeholders(&request(PathBuf::from("/scenes/normals.png")));

        assert_eq!(values["scene_dir"], "/scenes");
        assert_eq!(values["workdir"], "/scenes");
        assert_eq!(values["map"], "normal");
        assert_eq!(values["resolution"], "512");
        assert_eq!(values["object"], "Cube");
    }

    #[test]
    fn test_workdir_is_run_directory_not_scene_directory() {
        let backend = CommandBakeBackend::new(
            CommandTemplate::new("bake", Vec::<String>::new()),
            "/scenes/robot.yml",
        );

        let values = backend.placeholders(&request(PathBuf::from("/work/run/normals.png")));

        assert_eq!(values["workdir"], "/work/run");
        assert_eq!(values["scene_dir"], "/scenes");
        assert_eq!(values["scene"], "/scenes/robot.yml");
    }

    #[test]
    fn test_bare_scene_name_runs_in_current_dir() {
        let backend = CommandBakeBackend::new(
            CommandTemplate::new("bake", Vec::<String>::new()),
            "robot.yml",
        );

        assert_eq!(backend.scene_dir(), Path::new("."));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_command_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("scene.yml");
        let mut backend = CommandBakeBackend::new(
            CommandTemplate::new("sh", ["-c", "echo no UV map 1>&2; exit 2"]),
            &scene,
        );

        let err = backend.bake(&request(dir.path().join("normals.png"))).unwrap_err();

        assert!(err.contains("exit code 2"));
        assert!(err.contains("no UV map"));
    }
}
