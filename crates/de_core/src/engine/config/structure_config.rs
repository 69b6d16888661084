//! Defensive structure and gap detection configuration

use serde::{Deserialize, Serialize};

/// Line height boundaries for block classification (meters from the defended goal line)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeightThresholds {
    /// Line height at or below this is a low block (default: 30.0)
    pub low_max_m: f32,
    /// Line height at or below this is a mid block, above is high (default: 45.0)
    pub mid_max_m: f32,
}

impl Default for BlockHeightThresholds {
    fn default() -> Self {
        Self { low_max_m: 30.0, mid_max_m: 45.0 }
    }
}

/// Gap detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Horizon at which neighbouring coverage zones are compared (default: 2.0s)
    pub gap_horizon_s: f32,
    /// Gaps at or below this size are never exploitable (default: 5.0m)
    pub gap_min_size_m: f32,
    /// Ball speed used to decide whether a gap closes before the ball gets through (default: 15.0)
    pub reference_ball_speed_mps: f32,
    /// Closing speeds at or below this count as "not closing" (default: 0.1)
    pub min_closing_speed_mps: f32,
    /// Depth jump that starts a new defensive line (default: 8.0m)
    pub line_separation_m: f32,
    /// Two deepest lines further apart than this are probed for gaps between them (default: 10.0m)
    pub between_lines_min_m: f32,
    /// Lateral offsets from the center line where between-lines probes sit (default: -15, 0, 15)
    pub between_lines_probe_offsets_m: Vec<f32>,
    pub block_height_thresholds_m: BlockHeightThresholds,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            gap_horizon_s: 2.0,
            gap_min_size_m: 5.0,
            reference_ball_speed_mps: 15.0,
            min_closing_speed_mps: 0.1,
            line_separation_m: 8.0,
            between_lines_min_m: 10.0,
            between_lines_probe_offsets_m: vec![-15.0, 0.0, 15.0],
            block_height_thresholds_m: BlockHeightThresholds::default(),
        }
    }
}
