//! Image exporters
//!
//! Every artifact the pipeline writes is an 8-bit RGB PNG.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::PipelineError;
use crate::models::RgbImage;

/// Export an image as 8-bit RGB PNG, replacing any existing file
pub fn export_png8<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<(), PipelineError> {
    let path = path.as_ref();

    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| PipelineError::image(path, format!("Failed to write PNG header: {}", e)))?;
    writer
        .write_image_data(&image.data)
        .map_err(|e| PipelineError::image(path, format!("Failed to write PNG data: {}", e)))?;
    writer
        .finish()
        .map_err(|e| PipelineError::image(path, format!("Failed to finish PNG: {}", e)))?;

    log::debug!("Wrote {}x{} PNG to {}", image.width, image.height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::decode_png;
    use tempfile::tempdir;

    #[test]
    fn test_export_then_decode_preserves_pixels() {
        let mut image = RgbImage::filled(4, 3, [12, 200, 90]);
        image.set_pixel(1, 2, [0, 0, 0]);
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");

        export_png8(&image, &path).unwrap();
        let decoded = decode_png(&path).unwrap();

        assert_eq!(decoded, image);
    }

    #[test]
    fn test_export_into_missing_directory_is_io_error() {
        let image = RgbImage::filled(2, 2, [1, 2, 3]);
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");

        let result = export_png8(&image, &path);

        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }
}
