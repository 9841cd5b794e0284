//! Configuration file creation and painter dispatch setup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autopaint_core::config::{AutopaintConfig, PainterConfig, CONFIG_FILENAME};
use autopaint_core::correction::CorrectionThresholds;
use autopaint_core::orchestrator::SubprocessDispatcher;
use autopaint_core::process::CommandTemplate;

/// Result of `write_default_config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub path: PathBuf,
    /// False when an existing file was left alone
    pub written: bool,
}

/// Write the built-in configuration to `dir/autopaint.yml`.
///
/// An existing file is kept unless `force` is set.
pub fn write_default_config(dir: &Path, force: bool) -> Result<InitOutcome> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() && !force {
        return Ok(InitOutcome {
            path,
            written: false,
        });
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let yaml = AutopaintConfig::default()
        .to_yaml()
        .context("Failed to serialise default config")?;
    std::fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(InitOutcome {
        path,
        written: true,
    })
}

/// Dispatcher for the configured painting command.
///
/// Without a configured command this program's own `paint` subcommand is
/// used, forwarding `config_path` and any threshold override so both halves
/// read the same settings.
pub fn painter_dispatcher(
    painter: &PainterConfig,
    config_path: Option<&Path>,
    thresholds: Option<&CorrectionThresholds>,
) -> Result<SubprocessDispatcher> {
    let template = match &painter.command {
        Some(command) => {
            if thresholds.is_some() {
                log::warn!("Threshold override is not forwarded to a custom painter command");
            }
            command.clone()
        }
        None => {
            let exe = std::env::current_exe().context("Failed to locate the autopaint executable")?;
            let mut args = vec![
                "paint".to_string(),
                "--workdir".to_string(),
                "{workdir}".to_string(),
            ];
            if let Some(path) = config_path {
                args.push("--config".to_string());
                args.push(path.display().to_string());
            }
            if let Some(t) = thresholds {
                args.push("--thresholds".to_string());
                args.push(format!("{},{},{}", t.hue, t.saturation, t.value));
            }
            CommandTemplate::new(exe.display().to_string(), args)
        }
    };
    Ok(SubprocessDispatcher::new(
        template,
        painter.required_files.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopaint_core::config::load_pipeline_config;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();

        let outcome = write_default_config(dir.path(), false).unwrap();
        let handle = load_pipeline_config(Some(&outcome.path));

        assert!(outcome.written);
        assert_eq!(handle.config, AutopaintConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "defaults:\n  samples: 3\n").unwrap();

        let kept = write_default_config(dir.path(), false).unwrap();
        assert!(!kept.written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "defaults:\n  samples: 3\n");

        let forced = write_default_config(dir.path(), true).unwrap();
        assert!(forced.written);
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "defaults:\n  samples: 3\n");
    }

    #[test]
    fn test_default_painter_forwards_config_and_thresholds() {
        let painter = PainterConfig::default();
        let thresholds = CorrectionThresholds::new(0.1, 0.2, 0.3);

        let dispatcher = painter_dispatcher(
            &painter,
            Some(Path::new("/etc/autopaint.yml")),
            Some(&thresholds),
        )
        .unwrap();
        let template = dispatcher.template();

        assert_eq!(
            template.args,
            vec![
                "paint",
                "--workdir",
                "{workdir}",
                "--config",
                "/etc/autopaint.yml",
                "--thresholds",
                "0.1,0.2,0.3"
            ]
        );
    }

    #[test]
    fn test_custom_painter_command_is_used_as_is() {
        let painter = PainterConfig {
            command: Some(CommandTemplate::new("python", ["paint.py"])),
            ..PainterConfig::default()
        };

        let dispatcher = painter_dispatcher(&painter, None, None).unwrap();

        assert_eq!(dispatcher.template().program, "python");
    }
}
