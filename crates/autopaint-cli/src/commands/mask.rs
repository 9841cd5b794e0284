use std::path::PathBuf;

use anyhow::Result;
use autopaint_cli::mask_files;

/// Black out `target` wherever `reference` is pure black.
pub fn cmd_mask(reference: PathBuf, target: PathBuf, out: PathBuf) -> Result<()> {
    let masked = mask_files(&reference, &target, &out)?;
    println!(
        "Masked {} background pixels -> {}",
        masked,
        out.display()
    );
    Ok(())
}
