//! Shared utilities for autopaint-cli
//!
//! Parsing, the command-backed bake backend and the file-level operations
//! the `autopaint` binary's subcommands are built from.

pub mod backend;
pub mod parsers;
pub mod processing;
pub mod types;

// Re-export commonly used items at the crate root for convenience
pub use backend::CommandBakeBackend;
pub use parsers::{parse_map_kinds, parse_thresholds};
pub use processing::{
    correct_files, mask_files, painter_dispatcher, write_default_config, CorrectReport,
    InitOutcome,
};
pub use types::RunOverrides;
