//! Color space conversions
//!
//! RGB <-> HSV with every channel normalised to the unit range, so tolerances
//! are expressed as fractions independent of the 8-bit encoding.

mod hsv;


pub(crate) use hsv::wrap_unit;
pub use hsv::{hsv_to_rgb, hsv_to_rgb8, hue_delta, rgb8_to_hsv, rgb_to_hsv, Hsv};
