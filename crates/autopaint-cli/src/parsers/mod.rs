//! Parsing functions for CLI arguments.

mod pipeline;

pub use pipeline::{parse_map_kinds, parse_thresholds};
