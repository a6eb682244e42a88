//! Render settings.

use lux_core::ShapeId;
use serde::{Deserialize, Serialize};

use crate::{RenderError, RenderResult, Shading};

/// Toggles and limits consumed by the integrator.
///
/// Changing any of them invalidates accumulated samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Maximum number of scattering events per path
    pub max_depth: u32,
    /// Depth from which Russian roulette may terminate paths
    pub russian_roulette_depth: u32,
    /// Escaped rays see the Perez sky; otherwise black
    pub sky_enabled: bool,
    /// Add the sun disc on top of the sky
    pub sun_enabled: bool,
    pub shading: Shading,
    /// Shape drawn with a selection tint
    pub highlight: Option<ShapeId>,
    /// Edge length of a render bucket in pixels
    pub bucket_size: u32,
    /// Base seed for per-pixel random streams
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_depth: 8,
            russian_roulette_depth: 3,
            sky_enabled: true,
            sun_enabled: true,
            shading: Shading::Interpolated,
            highlight: None,
            bucket_size: 64,
            seed: 0,
        }
    }
}

impl RenderSettings {
    /// Reject settings the renderer cannot run with.
    pub fn validate(&self) -> RenderResult<()> {
        if self.max_depth == 0 {
            return Err(RenderError::InvalidSettings(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.bucket_size == 0 {
            return Err(RenderError::InvalidSettings(
                "bucket_size must be at least 1".to_string(),
            ));
        }
        if self.russian_roulette_depth >= self.max_depth {
            log::warn!(
                "Russian roulette depth {} is not below max depth {}; roulette never triggers",
                self.russian_roulette_depth,
                self.max_depth
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let settings = RenderSettings {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RenderError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_partial_json() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{"max_depth": 4, "shading": "Flat", "highlight": 7}"#)
                .unwrap();
        assert_eq!(settings.max_depth, 4);
        assert_eq!(settings.shading, Shading::Flat);
        assert_eq!(settings.highlight, Some(ShapeId(7)));
        assert_eq!(settings.russian_roulette_depth, 3);
        assert!(settings.sky_enabled);
    }
}
