//! Keyword arguments handed to the external painting process.
//!
//! The arguments follow a `--` separator as alternating key/value tokens:
//! `-- render_resolution 2048 samples 64 seed 42`. Keys are matched by name,
//! so their order does not matter.

use crate::error::PipelineError;

/// Token separating host arguments from the painting process' own
pub const SEPARATOR: &str = "--";

const KEY_RESOLUTION: &str = "render_resolution";
const KEY_SAMPLES: &str = "samples";
const KEY_SEED: &str = "seed";

/// Parameters the painting process needs from the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunArgs {
    pub render_resolution: u32,
    pub samples: u32,
    pub seed: u32,
}

impl RunArgs {
    /// Tokens including the leading separator
    pub fn to_args(&self) -> Vec<String> {
        vec![
            SEPARATOR.to_string(),
            KEY_RESOLUTION.to_string(),
            self.render_resolution.to_string(),
            KEY_SAMPLES.to_string(),
            self.samples.to_string(),
            KEY_SEED.to_string(),
            self.seed.to_string(),
        ]
    }

    /// Parse keyword pairs following the first separator.
    ///
    /// Without a separator every token is treated as a keyword pair. Unknown
    /// keys are skipped with a warning; every known key is required.
    pub fn parse<I, S>(args: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let pairs = match tokens.iter().position(|t| t == SEPARATOR) {
            Some(idx) => &tokens[idx + 1..],
            None => &tokens[..],
        };

        if pairs.len() % 2 != 0 {
            return Err(PipelineError::InvalidArguments(format!(
                "expected key/value pairs, got {} tokens: {}",
                pairs.len(),
                pairs.join(" ")
            )));
        }

        let mut render_resolution = None;
        let mut samples = None;
        let mut seed = None;

        for pair in pairs.chunks_exact(2) {
            let (key, value) = (pair[0].as_str(), pair[1].as_str());
            let slot = match key {
                KEY_RESOLUTION => &mut render_resolution,
                KEY_SAMPLES => &mut samples,
                KEY_SEED => &mut seed,
                _ => {
                    log::warn!("Ignoring unknown argument '{}' = '{}'", key, value);
                    continue;
                }
            };
            *slot = Some(parse_u32(key, value)?);
        }

        Ok(Self {
            render_resolution: require(render_resolution, KEY_RESOLUTION)?,
            samples: require(samples, KEY_SAMPLES)?,
            seed: require(seed, KEY_SEED)?,
        })
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, PipelineError> {
    value.trim().parse::<u32>().map_err(|_| {
        PipelineError::InvalidArguments(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}

fn require(value: Option<u32>, key: &str) -> Result<u32, PipelineError> {
    value.ok_or_else(|| PipelineError::InvalidArguments(format!("missing '{}'", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_args_layout() {
        let args = RunArgs {
            render_resolution: 1024,
            samples: 32,
            seed: 42,
        };

        assert_eq!(
            args.to_args(),
            vec!["--", "render_resolution", "1024", "samples", "32", "seed", "42"]
        );
    }

    #[test]
    fn test_parse_any_order_after_separator() {
        let tokens = [
            "blender", "-b", "painter.blend", "--", "seed", "7", "render_resolution", "2048",
            "samples", "16",
        ];

        let args = RunArgs::parse(tokens).unwrap();

        assert_eq!(
            args,
            RunArgs {
                render_resolution: 2048,
                samples: 16,
                seed: 7
            }
        );
    }

    #[test]
    fn test_parse_reads_own_output() {
        let args = RunArgs {
            render_resolution: 4096,
            samples: 128,
            seed: 99_999,
        };

        assert_eq!(RunArgs::parse(args.to_args()).unwrap(), args);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let args =
            RunArgs::parse(["samples", "1", "denoise", "on", "seed", "3", "render_resolution", "8"])
                .unwrap();

        assert_eq!(args.seed, 3);
    }

    #[test]
    fn test_parse_missing_key() {
        let result = RunArgs::parse(["--", "samples", "1", "seed", "3"]);

        match result {
            Err(PipelineError::InvalidArguments(msg)) => assert!(msg.contains("render_resolution")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_dangling_key_and_bad_number() {
        assert!(matches!(
            RunArgs::parse(["--", "seed"]),
            Err(PipelineError::InvalidArguments(_))
        ));
        assert!(matches!(
            RunArgs::parse(["--", "seed", "-4", "samples", "1", "render_resolution", "8"]),
            Err(PipelineError::InvalidArguments(_))
        ));
    }
}
