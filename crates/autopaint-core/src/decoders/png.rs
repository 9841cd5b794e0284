//! PNG image decoder

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::PipelineError;
use crate::models::RgbImage;

fn open_reader(path: &Path) -> Result<png::Reader<BufReader<File>>, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    // Palette and sub-byte images are expanded, 16-bit samples stripped to 8
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    decoder
        .read_info()
        .map_err(|e| PipelineError::image(path, format!("Failed to read PNG info: {}", e)))
}

/// Read only the PNG header and return (width, height)
pub fn read_png_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32), PipelineError> {
    let reader = open_reader(path.as_ref())?;
    let info = reader.info();
    Ok((info.width, info.height))
}

/// Decode a PNG file into 8-bit RGB, dropping alpha and expanding grayscale
pub fn decode_png<P: AsRef<Path>>(path: P) -> Result<RgbImage, PipelineError> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| PipelineError::image(path, "Failed to determine PNG buffer size"))?;
    let mut buf = vec![0u8; buffer_size];
    let frame_info = reader
        .next_frame(&mut buf)
        .map_err(|e| PipelineError::image(path, format!("Failed to read PNG frame: {}", e)))?;

    let width = frame_info.width;
    let height = frame_info.height;
    let bytes = &buf[..frame_info.buffer_size()];

    let (color_type, _) = reader.output_color_type();
    let data = match color_type {
        png::ColorType::Rgb => bytes.to_vec(),
        png::ColorType::Rgba => strip_channels(bytes, 4, |px| [px[0], px[1], px[2]]),
        png::ColorType::Grayscale => strip_channels(bytes, 1, |px| [px[0], px[0], px[0]]),
        png::ColorType::GrayscaleAlpha => strip_channels(bytes, 2, |px| [px[0], px[0], px[0]]),
        png::ColorType::Indexed => {
            return Err(PipelineError::image(path, "Indexed PNG was not expanded"));
        }
    };

    RgbImage::from_raw(width, height, data).map_err(|e| PipelineError::image(path, e))
}

/// Repack `stride`-byte pixels into RGB triplets
fn strip_channels(bytes: &[u8], stride: usize, to_rgb: impl Fn(&[u8]) -> [u8; 3]) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(bytes.len() / stride * 3);
    for px in bytes.chunks_exact(stride) {
        rgb_data.extend_from_slice(&to_rgb(px));
    }
    rgb_data
}
