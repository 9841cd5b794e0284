//! Enums for the maps the pipeline bakes and the channels it rewires.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A geometry-derived map baked from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    /// Object-space surface normals
    Normal,

    /// Albedo only (direct and indirect lighting excluded)
    Color,
}

impl MapKind {
    pub const ALL: [MapKind; 2] = [MapKind::Normal, MapKind::Color];

    /// File name of the baked reference in the working directory
    pub fn baked_file_name(self) -> &'static str {
        match self {
            MapKind::Normal => "normals.png",
            MapKind::Color => "colors.png",
        }
    }

    /// Material input the corrected map is wired into
    pub fn material_channel(self) -> MaterialChannel {
        match self {
            MapKind::Normal => MaterialChannel::Normal,
            MapKind::Color => MaterialChannel::BaseColor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MapKind::Normal => "normal",
            MapKind::Color => "color",
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MapKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "normals" => Ok(MapKind::Normal),
            "color" | "colors" | "colour" | "albedo" => Ok(MapKind::Color),
            other => Err(format!(
                "Unknown map kind '{}' (expected 'normal' or 'color')",
                other
            )),
        }
    }
}

/// Surface shader input a texture can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialChannel {
    /// Decoded through a normal-map node into the shader's normal input
    Normal,

    /// Wired directly into the shader's base color input
    BaseColor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baked_file_names() {
        assert_eq!(MapKind::Normal.baked_file_name(), "normals.png");
        assert_eq!(MapKind::Color.baked_file_name(), "colors.png");
    }

    #[test]
    fn test_material_channel_per_kind() {
        assert_eq!(MapKind::Normal.material_channel(), MaterialChannel::Normal);
        assert_eq!(MapKind::Color.material_channel(), MaterialChannel::BaseColor);
    }

    #[test]
    fn test_parse_map_kind() {
        assert_eq!("Normal".parse::<MapKind>(), Ok(MapKind::Normal));
        assert_eq!(" colors ".parse::<MapKind>(), Ok(MapKind::Color));
        assert!("roughness".parse::<MapKind>().is_err());
    }
}
