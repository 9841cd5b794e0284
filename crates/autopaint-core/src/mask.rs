//! Background mask derived from a baked reference map.
//!
//! A baked map leaves pixels with no geometry at exact black, so the mask is
//! a bit-exact comparison against that sentinel. There is no tolerance: a
//! pixel of (1, 0, 0) is subject, not background.

use rayon::prelude::*;

use crate::error::PipelineError;
use crate::models::RgbImage;
use crate::PARALLEL_THRESHOLD;

/// Pixel value marking "no geometry" in a baked map
pub const SENTINEL: [u8; 3] = [0, 0, 0];

/// Per-pixel background flags, same dimensions as the image it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    masked: Vec<bool>,
}

impl Mask {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True where the reference pixel was exactly the sentinel
    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        self.masked[y as usize * self.width as usize + x as usize]
    }

    pub fn masked_count(&self) -> usize {
        self.masked.iter().filter(|&&m| m).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.masked
    }
}

/// Flag every pixel of `reference` that equals the sentinel exactly
pub fn extract_mask(reference: &RgbImage) -> Mask {
    let is_sentinel = |px: &[u8]| px == SENTINEL.as_slice();

    let masked: Vec<bool> = if reference.pixel_count() >= PARALLEL_THRESHOLD {
        reference.data.par_chunks_exact(3).map(is_sentinel).collect()
    } else {
        reference.data.chunks_exact(3).map(is_sentinel).collect()
    };

    Mask {
        width: reference.width,
        height: reference.height,
        masked,
    }
}

/// Force every masked pixel of `target` to the sentinel.
///
/// Returns the number of masked pixels. Dimensions must match exactly;
/// nothing is written on mismatch.
pub fn apply_mask(mask: &Mask, target: &mut RgbImage) -> Result<usize, PipelineError> {
    if mask.dimensions() != target.dimensions() {
        return Err(PipelineError::ShapeMismatch {
            expected: mask.dimensions(),
            actual: target.dimensions(),
        });
    }

    let blacken = |(px, &m): (&mut [u8], &bool)| {
        if m {
            px.copy_from_slice(&SENTINEL);
        }
    };

    if target.pixel_count() >= PARALLEL_THRESHOLD {
        target
            .data
            .par_chunks_exact_mut(3)
            .zip(mask.masked.par_iter())
            .for_each(blacken);
    } else {
        target
            .data
            .chunks_exact_mut(3)
            .zip(mask.masked.iter())
            .for_each(blacken);
    }

    Ok(mask.masked_count())
}
