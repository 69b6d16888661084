use serde::{Deserialize, Serialize};

use super::geometry::{distance_to_attacked_goal, team_view, Vec2};
use super::physics_constants::field;

// Constants for zone classification
pub const ZONE_THRESHOLD_RED: f32 = 0.35;
pub const ZONE_THRESHOLD_YELLOW: f32 = 0.12;
/// Distance decay length λ (meters)
pub const DECAY_LENGTH_M: f32 = 20.0;
/// Value lost at the touchline relative to the goal center line
pub const LATERAL_WEIGHT: f32 = 0.3;

/// Zone value of a position for the team attacking in `attacks_right` direction.
///
/// Parametric surface `exp(-d/λ) · (1 − w · |y − cy| / half_width)` where `d` is the distance
/// to the attacked goal-mouth center. Equals 1.0 at the goal mouth, increases toward it,
/// and is symmetric about the goal center line.
///
/// **Returns**: value in [0.0, 1.0]
pub fn zone_value(pos: Vec2, attacks_right: bool) -> f32 {
    let dist = distance_to_attacked_goal(pos, attacks_right);
    let lateral = (team_view(pos, attacks_right).y - field::CENTER_Y).abs();
    let lateral_ratio = (lateral / field::HALF_WIDTH_M).min(1.0);

    let decay = (-dist / DECAY_LENGTH_M).exp();
    (decay * (1.0 - LATERAL_WEIGHT * lateral_ratio)).clamp(0.0, 1.0)
}

/// Danger band of a zone value.
///
/// RED: value ≥ 0.35 (shooting range), YELLOW: 0.12-0.35, GREEN: < 0.12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneColor {
    Red,
    Yellow,
    Green,
}

impl ZoneColor {
    pub fn from_value(value: f32) -> Self {
        if value >= ZONE_THRESHOLD_RED {
            ZoneColor::Red
        } else if value >= ZONE_THRESHOLD_YELLOW {
            ZoneColor::Yellow
        } else {
            ZoneColor::Green
        }
    }

    pub fn of(pos: Vec2, attacks_right: bool) -> Self {
        Self::from_value(zone_value(pos, attacks_right))
    }
}
