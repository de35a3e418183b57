//! TOML configuration for a heatmap.
//!
//! Every field is optional in the file; missing fields fall back to the
//! rasterizer defaults. Gradient stops are written as a table of
//! `"position" = "color"` pairs:
//!
//! ```toml
//! width = 512
//! height = 256
//! max = 2000.0
//! radius = 20.0
//! blur = 10.0
//!
//! [gradient]
//! "0.0" = "navy"
//! "1.0" = "#ff0000"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::gradient::{DEFAULT_GRADIENT, Gradient};
use crate::heatmap::{DEFAULT_MAX_INTENSITY, DEFAULT_MIN_OPACITY, Heatmap};
use crate::stamp::{DEFAULT_BLUR, DEFAULT_RADIUS, StampMask};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub width: u32,
    pub height: u32,
    pub max: f32,
    pub radius: f32,
    pub blur: f32,
    pub min_opacity: f32,
    /// position (as a string key) -> CSS color
    pub gradient: BTreeMap<String, String>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            max: DEFAULT_MAX_INTENSITY,
            radius: DEFAULT_RADIUS,
            blur: DEFAULT_BLUR,
            min_opacity: DEFAULT_MIN_OPACITY,
            gradient: DEFAULT_GRADIENT
                .iter()
                .map(|(pos, color)| (pos.to_string(), color.to_string()))
                .collect(),
        }
    }
}

impl HeatmapConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| Error::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("failed to write TOML: {e}")))
    }

    /// Check everything the setters would reject, without building anything big.
    pub fn validate(&self) -> Result<()> {
        if !self.max.is_finite() || self.max <= 0.0 {
            return Err(Error::InvalidConfig(format!("max must be > 0, got {}", self.max)));
        }
        if !self.min_opacity.is_finite() {
            return Err(Error::InvalidConfig("min_opacity must be finite".into()));
        }
        StampMask::new(self.radius, self.blur)?;
        self.gradient()?;
        Ok(())
    }

    /// Parse the `[gradient]` table into a ramp.
    pub fn gradient(&self) -> Result<Gradient> {
        let stops = self
            .gradient
            .iter()
            .map(|(pos, color)| {
                pos.trim()
                    .parse::<f32>()
                    .map(|p| (p, color.as_str()))
                    .map_err(|_| Error::InvalidConfig(format!("gradient position {pos:?} is not a number")))
            })
            .collect::<Result<Vec<_>>>()?;
        // "1" and "1.0" are different keys but the same stop
        for (i, (p, _)) in stops.iter().enumerate() {
            if stops[..i].iter().any(|(q, _)| q == p) {
                return Err(Error::InvalidConfig(format!("gradient position {p} is given more than once")));
            }
        }
        Gradient::from_css(stops)
    }

    /// Build a heatmap configured from this file.
    pub fn build(&self) -> Result<Heatmap> {
        let mut heatmap = Heatmap::new(self.width, self.height)?;
        heatmap.set_max_intensity(self.max)?;
        heatmap.set_stamp_radius(self.radius, self.blur)?;
        heatmap.set_gradient(self.gradient()?.stops().iter().copied())?;
        Ok(heatmap)
    }
}

/// Load and validate a config file.
pub fn load_from_path(path: &Path) -> Result<HeatmapConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    let config = HeatmapConfig::from_toml(&content)?;
    info!("loaded heatmap config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let c = HeatmapConfig::from_toml("").unwrap();
        assert_eq!(c, HeatmapConfig::default());
        assert_eq!(c.gradient().unwrap(), Gradient::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let c = HeatmapConfig::from_toml(
            r##"
            width = 64
            max = 2000.0
            [gradient]
            "0" = "black"
            "1.0" = "#ffffff"
            "##,
        )
        .unwrap();
        assert_eq!(c.width, 64);
        assert_eq!(c.height, 256);
        assert_eq!(c.max, 2000.0);
        let g = c.gradient().unwrap();
        assert_eq!(g.stops().len(), 2);
        assert_eq!(g.sample(1.0), Rgba::opaque(255, 255, 255));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(HeatmapConfig::from_toml("max = 0.0"), Err(Error::InvalidConfig(_))));
        assert!(HeatmapConfig::from_toml("radius = -4.0").is_err());
        assert!(HeatmapConfig::from_toml("[gradient]\n\"x\" = \"red\"").is_err());
        assert!(HeatmapConfig::from_toml("[gradient]\n\"0.5\" = \"reddish\"").is_err());
        assert!(matches!(HeatmapConfig::from_toml("width = \"wide\""), Err(Error::Config(_))));
    }

    #[test]
    fn same_position_spelled_twice_is_rejected() {
        let toml = r#"
            [gradient]
            "0" = "black"
            "1" = "red"
            "1.0" = "blue"
        "#;
        let err = HeatmapConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref m) if m.contains("more than once")), "{err}");
    }

    #[test]
    fn build_applies_every_field() {
        let c = HeatmapConfig {
            width: 32,
            height: 16,
            max: 50.0,
            radius: 4.0,
            blur: 2.0,
            ..HeatmapConfig::default()
        };
        let hm = c.build().unwrap();
        assert_eq!((hm.width(), hm.height()), (32, 16));
        assert_eq!(hm.max_intensity(), 50.0);
        assert_eq!(hm.stamp().side(), 12);
        assert_eq!(hm.gradient(), &Gradient::default());
    }

    #[test]
    fn toml_round_trip_keeps_config() {
        let c = HeatmapConfig::default();
        let back = HeatmapConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn load_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "height = 99").unwrap();
        let c = load_from_path(f.path()).unwrap();
        assert_eq!(c.height, 99);

        let missing = load_from_path(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
