//! HSV (Hue-Saturation-Value) color space conversions

/// HSV color representation, every channel normalised
/// - H (hue): 0.0-1.0, wrapping (1.0 is the same angle as 0.0)
/// - S (saturation): 0.0-1.0
/// - V (value): 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Wrap into [0, 1). `rem_euclid` can round up to exactly 1.0 for tiny
/// negative inputs, which is the same angle as 0.0.
#[inline]
pub(crate) fn wrap_unit(x: f32) -> f32 {
    let wrapped = x.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Convert RGB to HSV
///
/// Input: RGB values in range 0.0-1.0
/// Output: HSV with every channel in 0.0-1.0 (hue in [0, 1))
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> Hsv {
    let r = r.clamp(0.0, 1.0);
    let g = g.clamp(0.0, 1.0);
    let b = b.clamp(0.0, 1.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;

    // Black and grays carry no hue or saturation
    if delta < 1e-6 {
        return Hsv { h: 0.0, s: 0.0, v };
    }

    let s = delta / max;

    let sector = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / delta;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < 1e-6 {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsv {
        h: wrap_unit(sector / 6.0),
        s,
        v,
    }
}

/// Convert HSV to RGB
///
/// Input: HSV with hue wrapping on [0, 1). Saturation is used as given, so
/// an out-of-range saturation can produce RGB components outside 0.0-1.0;
/// callers quantising to 8 bits clamp there.
#[inline]
pub fn hsv_to_rgb(hsv: Hsv) -> (f32, f32, f32) {
    let Hsv { h, s, v } = hsv;

    if s.abs() < 1e-6 {
        return (v, v, v);
    }

    let h6 = wrap_unit(h) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Convert an 8-bit RGB pixel to normalised HSV
#[inline]
pub fn rgb8_to_hsv(rgb: [u8; 3]) -> Hsv {
    rgb_to_hsv(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    )
}

/// Convert normalised HSV back to an 8-bit RGB pixel (rounded, clamped)
#[inline]
pub fn hsv_to_rgb8(hsv: Hsv) -> [u8; 3] {
    let (r, g, b) = hsv_to_rgb(hsv);
    [quantize(r), quantize(g), quantize(b)]
}

#[inline]
fn quantize(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Signed shortest-arc hue difference `candidate - reference`.
///
/// Result lies in (-0.5, 0.5]: a reference of 0.02 and a candidate of 0.99
/// are 0.03 apart, not 0.97.
#[inline]
pub fn hue_delta(reference: f32, candidate: f32) -> f32 {
    let d = wrap_unit(candidate - reference);
    if d > 0.5 {
        d - 1.0
    } else {
        d
    }
}
