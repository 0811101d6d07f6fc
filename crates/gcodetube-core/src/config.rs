//! Tube mesh configuration
//!
//! Parameters that shape how a command stream turns into tube geometry.
//! Shared by the visualizer (which consumes them) and the settings crate
//! (which persists them).

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Default number of sides of a tube ring
pub const DEFAULT_RADIAL_SEGMENTS: u32 = 8;
/// Default radius for non-extruding moves
pub const DEFAULT_TRAVEL_WIDTH: f32 = 0.01;
/// Default number of points per chunk
pub const DEFAULT_POINTS_PER_CHUNK: usize = 120_000;
/// Default number of points between cooperative yields
pub const DEFAULT_YIELD_INTERVAL: usize = 200;

/// How layer boundaries are found in the stream
///
/// Exactly one strategy is active for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayerDetection {
    /// `;LAYER:<n>` comments written by the slicer
    #[default]
    Marker,
    /// Changes of Z height between consecutive segments
    Height,
}

/// Tube generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeConfig {
    /// Sides of each tube ring (at least 3)
    pub radial_segments: u32,
    /// Radius of travel moves; 0 hides them
    pub travel_width: f32,
    /// Points per chunk before a new chunk is started
    pub points_per_chunk: usize,
    /// Layer boundary strategy
    pub layer_detection: LayerDetection,
    /// Points produced between yields to the scheduler
    pub yield_interval: usize,
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            radial_segments: DEFAULT_RADIAL_SEGMENTS,
            travel_width: DEFAULT_TRAVEL_WIDTH,
            points_per_chunk: DEFAULT_POINTS_PER_CHUNK,
            layer_detection: LayerDetection::default(),
            yield_interval: DEFAULT_YIELD_INTERVAL,
        }
    }
}

impl TubeConfig {
    /// Check every field against its valid range
    pub fn validate(&self) -> Result<(), MeshError> {
        let invalid = |field, reason: String| Err(MeshError::InvalidConfig { field, reason });

        if self.radial_segments < 3 {
            return invalid(
                "radial_segments",
                format!("must be at least 3, got {}", self.radial_segments),
            );
        }
        if !self.travel_width.is_finite() || self.travel_width < 0.0 {
            return invalid(
                "travel_width",
                format!("must be a finite value >= 0, got {}", self.travel_width),
            );
        }
        if self.points_per_chunk == 0 {
            return invalid("points_per_chunk", "must be > 0".to_string());
        }
        if self.yield_interval == 0 {
            return invalid("yield_interval", "must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TubeConfig::default();
        assert_eq!(config.radial_segments, 8);
        assert_eq!(config.points_per_chunk, 120_000);
        assert_eq!(config.layer_detection, LayerDetection::Marker);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let field = |config: TubeConfig| match config.validate() {
            Err(MeshError::InvalidConfig { field, .. }) => field,
            other => panic!("unexpected validation result: {other:?}"),
        };

        assert_eq!(
            field(TubeConfig {
                radial_segments: 2,
                ..Default::default()
            }),
            "radial_segments"
        );
        assert_eq!(
            field(TubeConfig {
                travel_width: -0.5,
                ..Default::default()
            }),
            "travel_width"
        );
        assert_eq!(
            field(TubeConfig {
                points_per_chunk: 0,
                ..Default::default()
            }),
            "points_per_chunk"
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: TubeConfig =
            serde_json::from_str(r#"{ "radial_segments": 5, "layer_detection": "height" }"#)
                .unwrap();
        assert_eq!(config.radial_segments, 5);
        assert_eq!(config.layer_detection, LayerDetection::Height);
        assert_eq!(config.travel_width, DEFAULT_TRAVEL_WIDTH);
        assert_eq!(config.yield_interval, DEFAULT_YIELD_INTERVAL);
    }
}
