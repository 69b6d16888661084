//! Physical model configuration: reach, reaction, plausibility limits

use serde::{Deserialize, Serialize};

/// Coverage and elimination parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConfig {
    // === Reach ===
    /// Time before a player starts moving toward a point (default: 0.3s)
    pub reaction_time_s: f32,
    /// Horizons at which coverage radii are reported, strictly increasing (default: 1, 2, 3)
    pub coverage_horizons_s: Vec<f32>,
    /// Upper bound on any player speed; faster readings are clamped (default: 12.5)
    pub max_plausible_speed_mps: f32,
    /// Sprint speed when neither the frame nor the priors know one (default: 7.0)
    pub default_sprint_speed_mps: f32,

    // === Elimination ===
    /// How far ahead the ball is projected (default: 2.0s)
    pub elimination_horizon_s: f32,
    /// Margins within ±epsilon count as recoverable (default: 0.01m)
    pub elimination_epsilon_m: f32,

    // === Frame validation ===
    /// Positions may sit this far outside the pitch (tracking noise) (default: 5.0m)
    pub bounds_tolerance_m: f32,
    /// Fewer entities than this rejects the frame (default: 2)
    pub min_entities: usize,
    /// Without an explicit possessor, the nearest attacker this close to the ball carries it (default: 2.0m)
    pub possession_radius_m: f32,
}

impl Default for PhysicalConfig {
    fn default() -> Self {
        Self {
            reaction_time_s: 0.3,
            coverage_horizons_s: vec![1.0, 2.0, 3.0],
            max_plausible_speed_mps: 12.5,
            default_sprint_speed_mps: 7.0,

            elimination_horizon_s: 2.0,
            elimination_epsilon_m: 0.01,

            bounds_tolerance_m: 5.0,
            min_entities: 2,
            possession_radius_m: 2.0,
        }
    }
}
