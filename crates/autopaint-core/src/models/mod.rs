//! Data models for Autopaint
//!
//! Image buffers, map kinds, and the per-run artifact naming.

mod image;
mod kinds;
mod run;

pub use image::RgbImage;
pub use kinds::{MapKind, MaterialChannel};
pub use run::{final_file_name, Run, SEED_MAX};
