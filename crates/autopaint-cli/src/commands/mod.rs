//! Command implementations for the autopaint CLI.

mod correct;
mod init;
mod mask;
mod paint;
mod run;

// Re-export all command functions
pub use correct::cmd_correct;
pub use init::cmd_init;
pub use mask::cmd_mask;
pub use paint::cmd_paint;
pub use run::cmd_run;
