use std::path::PathBuf;

use anyhow::Result;
use autopaint_cli::write_default_config;

/// Write a default `autopaint.yml` into `dir` (the current directory when
/// omitted). Won't overwrite an existing file unless `force` is true.
pub fn cmd_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let outcome = write_default_config(&dir, force)?;

    if outcome.written {
        println!("  Wrote: {}", outcome.path.display());
    } else {
        println!(
            "  Skipped: {} (already exists, use --force to overwrite)",
            outcome.path.display()
        );
    }
    Ok(())
}
