//! Threshold and map list parsing.

use autopaint_core::correction::CorrectionThresholds;
use autopaint_core::models::MapKind;

/// Parse correction thresholds in format "H,S,V"
///
/// Each value is a fraction of the channel's full range and must be finite
/// and non-negative.
pub fn parse_thresholds(thresholds_str: &str) -> Result<CorrectionThresholds, String> {
    let parts: Vec<&str> = thresholds_str.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "Thresholds must be in format H,S,V (e.g., 0.02,0.07,0.07), got: {}",
            thresholds_str
        ));
    }

    let mut values = [0.0f32; 3];
    for ((slot, part), name) in values
        .iter_mut()
        .zip(&parts)
        .zip(["hue", "saturation", "value"])
    {
        let parsed = part
            .trim()
            .parse::<f32>()
            .map_err(|_| format!("Invalid {} threshold: {}", name, part))?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(format!(
                "{} threshold {} must be a finite, non-negative number",
                name, parsed
            ));
        }
        *slot = parsed;
    }

    Ok(CorrectionThresholds::new(values[0], values[1], values[2]))
}

/// Parse a comma-separated map list such as "normal,color"
///
/// Order is kept; repeated maps are dropped.
pub fn parse_map_kinds(maps_str: &str) -> Result<Vec<MapKind>, String> {
    let mut kinds = Vec::new();
    for part in maps_str.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind: MapKind = part.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    if kinds.is_empty() {
        return Err(format!(
            "Map list must name at least one of: normal, color (got '{}')",
            maps_str
        ));
    }
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thresholds() {
        let t = parse_thresholds("0.05, 0.1,0.2").unwrap();

        assert_eq!(t, CorrectionThresholds::new(0.05, 0.1, 0.2));
    }

    #[test]
    fn test_parse_thresholds_rejects_bad_input() {
        assert!(parse_thresholds("0.1,0.2").is_err());
        assert!(parse_thresholds("0.1,x,0.2").is_err());
        assert!(parse_thresholds("0.1,-0.2,0.2").is_err());
        assert!(parse_thresholds("0.1,NaN,0.2").is_err());
    }

    #[test]
    fn test_parse_map_kinds_keeps_order() {
        assert_eq!(
            parse_map_kinds("color,normal").unwrap(),
            vec![MapKind::Color, MapKind::Normal]
        );
        assert_eq!(
            parse_map_kinds("normals, colour, normal").unwrap(),
            vec![MapKind::Normal, MapKind::Color]
        );
    }

    #[test]
    fn test_parse_map_kinds_rejects_unknown_and_empty() {
        assert!(parse_map_kinds("roughness").is_err());
        assert!(parse_map_kinds(" , ").is_err());
    }
}
