//! Per-pixel HSV drift correction
//!
//! Clamps a painted candidate back toward its baked reference. Each of hue,
//! saturation and value has its own tolerance; a channel that drifted further
//! than its tolerance is pulled to exactly `reference ± tolerance` in the
//! direction it drifted, and a channel within tolerance is left alone. This is
//! a hard clamp, not a blend.
//!
//! Hue lives on a circle: its difference is taken along the shorter arc and
//! the clamped hue is re-wrapped. Value is clamped to [0, 1] after the
//! adjustment. Saturation is not clamped after adjustment; only
//! the 8-bit quantisation bounds it.


use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{hsv_to_rgb8, hue_delta, rgb8_to_hsv, wrap_unit, Hsv};
use crate::error::PipelineError;
use crate::models::RgbImage;
use crate::PARALLEL_THRESHOLD;

/// Tolerances as fractions of each channel's full range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionThresholds {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Default for CorrectionThresholds {
    fn default() -> Self {
        Self {
            hue: 0.02,
            saturation: 0.07,
            value: 0.07,
        }
    }
}

impl CorrectionThresholds {
    pub fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Replace non-finite tolerances with defaults, returning a warning per fix
    pub fn sanitize(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut warnings = Vec::new();
        for (name, value, fallback) in [
            ("hue", &mut self.hue, defaults.hue),
            ("saturation", &mut self.saturation, defaults.saturation),
            ("value", &mut self.value, defaults.value),
        ] {
            if !value.is_finite() {
                warnings.push(format!(
                    "{} threshold {} is not finite; using {}",
                    name, value, fallback
                ));
                *value = fallback;
            }
        }
        warnings
    }
}

/// Which channels of one pixel exceeded their tolerance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClampedChannels {
    pub hue: bool,
    pub saturation: bool,
    pub value: bool,
}

impl ClampedChannels {
    pub fn any(&self) -> bool {
        self.hue || self.saturation || self.value
    }
}

/// Pull `reference + delta` back to `reference ± threshold` when `|delta|` exceeds it
#[inline]
fn clamp_channel(reference: f32, delta: f32, threshold: f32) -> Option<f32> {
    if delta.abs() > threshold {
        Some(reference + delta.signum() * threshold)
    } else {
        None
    }
}

/// Clamp a candidate HSV color against its reference.
///
/// Returns the adjusted color and which channels were touched. Untouched
/// channels keep the candidate's value exactly.
pub fn clamp_drift(
    reference: Hsv,
    candidate: Hsv,
    thresholds: &CorrectionThresholds,
) -> (Hsv, ClampedChannels) {
    let mut out = candidate;
    let mut clamped = ClampedChannels::default();

    let dh = hue_delta(reference.h, candidate.h);
    if let Some(h) = clamp_channel(reference.h, dh, thresholds.hue) {
        out.h = wrap_unit(h);
        clamped.hue = true;
    }

    if let Some(s) = clamp_channel(reference.s, candidate.s - reference.s, thresholds.saturation) {
        out.s = s;
        clamped.saturation = true;
    }

    if let Some(v) = clamp_channel(reference.v, candidate.v - reference.v, thresholds.value) {
        out.v = v.clamp(0.0, 1.0);
        clamped.value = true;
    }

    (out, clamped)
}

/// Correct a single 8-bit pixel.
///
/// A pixel with no channel over tolerance is returned byte-for-byte, so no
/// drift means no change even after the HSV round trip.
#[inline]
pub fn correct_pixel(
    reference: [u8; 3],
    candidate: [u8; 3],
    thresholds: &CorrectionThresholds,
) -> [u8; 3] {
    let (hsv, clamped) = clamp_drift(rgb8_to_hsv(reference), rgb8_to_hsv(candidate), thresholds);
    if clamped.any() {
        hsv_to_rgb8(hsv)
    } else {
        candidate
    }
}

fn check_shapes(reference: &RgbImage, candidate: &RgbImage) -> Result<(), PipelineError> {
    if reference.dimensions() != candidate.dimensions() {
        return Err(PipelineError::ShapeMismatch {
            expected: reference.dimensions(),
            actual: candidate.dimensions(),
        });
    }
    Ok(())
}

/// Correct every pixel of `candidate` against `reference`.
///
/// Pixels are independent; large images are processed in parallel.
pub fn correct_image(
    reference: &RgbImage,
    candidate: &RgbImage,
    thresholds: &CorrectionThresholds,
) -> Result<RgbImage, PipelineError> {
    check_shapes(reference, candidate)?;

    let mut data = candidate.data.clone();
    let correct = |(out, r): (&mut [u8], &[u8])| {
        let fixed = correct_pixel([r[0], r[1], r[2]], [out[0], out[1], out[2]], thresholds);
        out.copy_from_slice(&fixed);
    };

    if candidate.pixel_count() >= PARALLEL_THRESHOLD {
        data.par_chunks_exact_mut(3)
            .zip(reference.data.par_chunks_exact(3))
            .for_each(correct);
    } else {
        data.chunks_exact_mut(3)
            .zip(reference.data.chunks_exact(3))
            .for_each(correct);
    }

    Ok(RgbImage {
        width: candidate.width,
        height: candidate.height,
        data,
    })
}

/// How many pixels each channel's tolerance would clamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriftSummary {
    pub pixels: usize,
    pub hue_clamped: usize,
    pub saturation_clamped: usize,
    pub value_clamped: usize,
    pub any_clamped: usize,
}

impl DriftSummary {
    fn record(mut self, clamped: ClampedChannels) -> Self {
        self.pixels += 1;
        self.hue_clamped += clamped.hue as usize;
        self.saturation_clamped += clamped.saturation as usize;
        self.value_clamped += clamped.value as usize;
        self.any_clamped += clamped.any() as usize;
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            pixels: self.pixels + other.pixels,
            hue_clamped: self.hue_clamped + other.hue_clamped,
            saturation_clamped: self.saturation_clamped + other.saturation_clamped,
            value_clamped: self.value_clamped + other.value_clamped,
            any_clamped: self.any_clamped + other.any_clamped,
        }
    }

    /// Fraction of pixels with at least one clamped channel
    pub fn clamped_fraction(&self) -> f32 {
        if self.pixels == 0 {
            0.0
        } else {
            self.any_clamped as f32 / self.pixels as f32
        }
    }
}

/// Measure drift without producing an image
pub fn measure_drift(
    reference: &RgbImage,
    candidate: &RgbImage,
    thresholds: &CorrectionThresholds,
) -> Result<DriftSummary, PipelineError> {
    check_shapes(reference, candidate)?;

    let classify = |r: &[u8], c: &[u8]| {
        clamp_drift(
            rgb8_to_hsv([r[0], r[1], r[2]]),
            rgb8_to_hsv([c[0], c[1], c[2]]),
            thresholds,
        )
        .1
    };

    let summary = if candidate.pixel_count() >= PARALLEL_THRESHOLD {
        reference
            .data
            .par_chunks_exact(3)
            .zip(candidate.data.par_chunks_exact(3))
            .fold(DriftSummary::default, |acc, (r, c)| acc.record(classify(r, c)))
            .reduce(DriftSummary::default, DriftSummary::merge)
    } else {
        reference
            .data
            .chunks_exact(3)
            .zip(candidate.data.chunks_exact(3))
            .fold(DriftSummary::default(), |acc, (r, c)| {
                acc.record(classify(r, c))
            })
    };

    Ok(summary)
}
