//! Synchronous external commands with `{placeholder}` templates.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A program and its arguments, with `{name}` placeholders expanded per call.
///
/// Deserialises from a YAML list whose first entry is the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl TryFrom<Vec<String>> for CommandTemplate {
    type Error = String;

    fn try_from(mut parts: Vec<String>) -> Result<Self, Self::Error> {
        if parts.is_empty() {
            return Err("command must name a program".to_string());
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }
}

impl From<CommandTemplate> for Vec<String> {
    fn from(template: CommandTemplate) -> Self {
        let mut parts = Vec::with_capacity(template.args.len() + 1);
        parts.push(template.program);
        parts.extend(template.args);
        parts
    }
}

/// Placeholder values for one expansion
pub type Placeholders = HashMap<&'static str, String>;

/// Single left-to-right pass; substituted values are never rescanned
fn expand(text: &str, values: &Placeholders) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| values.get(&after[..close]).map(|v| (close, v)));
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Substitute placeholders in the program and every argument.
    ///
    /// Unknown placeholders are left as written.
    pub fn expand(&self, values: &Placeholders) -> (String, Vec<String>) {
        (
            expand(&self.program, values),
            self.args.iter().map(|a| expand(a, values)).collect(),
        )
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; -1 when the process was terminated by a signal
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Turn a non-zero exit into `ExternalProcessFailed`
    pub fn into_result(self) -> Result<Self, PipelineError> {
        if self.success() {
            Ok(self)
        } else {
            Err(PipelineError::ExternalProcessFailed {
                code: self.code,
                stderr: self.stderr.trim_end().to_string(),
            })
        }
    }
}

/// Run a program to completion, capturing stdout and stderr.
///
/// Blocks until the child exits; there is no timeout.
pub fn run_captured(
    program: &str,
    args: &[String],
    working_dir: &Path,
) -> Result<ProcessOutput, PipelineError> {
    log::info!("Running: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .output()
        .map_err(|e| PipelineError::io(program, e))?;

    let result = ProcessOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    log::debug!("Return code: {}", result.code);
    if !result.stdout.is_empty() {
        log::debug!("stdout: {}", result.stdout.trim_end());
    }
    if !result.stderr.is_empty() {
        log::debug!("stderr: {}", result.stderr.trim_end());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders() -> Placeholders {
        let mut values = Placeholders::new();
        values.insert("workdir", "/tmp/scene".to_string());
        values.insert("seed", "42".to_string());
        values
    }

    #[test]
    fn test_expand_placeholders() {
        let template = CommandTemplate::new(
            "blender",
            ["-b", "{workdir}/painter.blend", "--", "seed", "{seed}", "{unknown}"],
        );

        let (program, args) = template.expand(&placeholders());

        assert_eq!(program, "blender");
        assert_eq!(
            args,
            vec!["-b", "/tmp/scene/painter.blend", "--", "seed", "42", "{unknown}"]
        );
    }

    #[test]
    fn test_expanded_values_are_not_rescanned() {
        let mut values = placeholders();
        values.insert("output", "/tmp/{seed}/{workdir}.png".to_string());
        let template = CommandTemplate::new("render", ["{output}", "{{seed}}", "{seed"]);

        let (_, args) = template.expand(&values);

        assert_eq!(args, vec!["/tmp/{seed}/{workdir}.png", "{42}", "{seed"]);
    }

    #[test]
    fn test_template_from_yaml_list() {
        let template: CommandTemplate =
            serde_yaml::from_str("[blender, -b, '{scene}']").unwrap();

        assert_eq!(template.program, "blender");
        assert_eq!(template.args, vec!["-b", "{scene}"]);
        assert!(serde_yaml::from_str::<CommandTemplate>("[]").is_err());
    }

    #[test]
    fn test_failed_output_becomes_error() {
        let output = ProcessOutput {
            code: 1,
            stdout: String::new(),
            stderr: "render error\n".to_string(),
        };

        match output.into_result() {
            Err(PipelineError::ExternalProcessFailed { code, stderr }) => {
                assert_eq!(code, 1);
                assert_eq!(stderr, "render error");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captured_collects_streams() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec![
            "-c".to_string(),
            "echo out; echo err 1>&2; exit 3".to_string(),
        ];

        let output = run_captured("sh", &args, dir.path()).unwrap();

        assert_eq!(output.code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = run_captured("autopaint-no-such-program", &[], dir.path());

        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }
}
