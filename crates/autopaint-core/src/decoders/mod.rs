//! Image decoders
//!
//! The pipeline only reads PNG: baked maps and renders are written as PNG by
//! the host, and every intermediate this crate writes is PNG too.

mod png;


use std::path::Path;

use crate::error::PipelineError;
use crate::models::RgbImage;

pub use self::png::{decode_png, read_png_dimensions};

/// Decode an image from a file path
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<RgbImage, PipelineError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| PipelineError::image(path, "No file extension found"))?;

    match extension.as_str() {
        "png" => decode_png(path),
        _ => Err(PipelineError::image(
            path,
            format!("Unsupported file format: {}", extension),
        )),
    }
}
