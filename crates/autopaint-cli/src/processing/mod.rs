//! File-level operations behind the CLI commands.

mod files;
mod setup;

pub use files::{correct_files, mask_files, CorrectReport};
pub use setup::{painter_dispatcher, write_default_config, InitOutcome};
