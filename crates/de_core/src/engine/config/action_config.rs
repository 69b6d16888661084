//! Candidate generation, interception and expected-value configuration

use serde::{Deserialize, Serialize};

/// Recommendation label cut-offs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// EV at or above this is HIGH_VALUE (default: 0.05)
    pub high_value_ev: f32,
    /// EV at or above this is MODERATE (default: 0.02)
    pub moderate_ev: f32,
    /// Success probability at or above this with non-negative EV is SAFE (default: 0.85)
    pub safe_success: f32,
    /// Success probability counted as "safe" in the per-frame summary (default: 0.80)
    pub summary_safe_success: f32,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self { high_value_ev: 0.05, moderate_ev: 0.02, safe_success: 0.85, summary_safe_success: 0.80 }
    }
}

/// Action valuation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    // === Ball speeds ===
    /// Ground pass speed (default: 15.0)
    pub pass_speed_mps: f32,
    /// Carry speed while dribbling (default: 6.0)
    pub dribble_speed_mps: f32,
    /// Shot speed (default: 25.0)
    pub shot_speed_mps: f32,

    // === Candidates ===
    /// Length of each dribble candidate (default: 8.0m)
    pub dribble_distance_m: f32,
    /// Diagonal dribble angle either side of straight ahead (default: 30°)
    pub dribble_diagonal_deg: f32,
    /// Success multiplier for passes into space rather than to feet (default: 0.85)
    pub through_pass_factor: f32,
    /// Ranked list length; the safe default is kept beyond it (default: 12)
    pub max_actions: usize,

    // === Interception ===
    /// Lead time at which interception probability is 0.5 (default: 0.1s)
    pub interception_midpoint_s: f32,
    /// Logistic scale of interception probability (default: 0.2s)
    pub interception_scale_s: f32,

    // === Completion ===
    /// Completion lost for a straight-back pass (default: 0.1)
    pub backward_angle_penalty: f32,
    /// Completion rate assumed for receivers without history (default: 0.78)
    pub population_completion_rate: f32,
    /// How strongly a receiver's history shifts completion (default: 0.5)
    pub receiver_rate_weight: f32,

    // === Turnover ===
    /// Base turnover cost when the target is in the team's own third (default: 0.02)
    pub turnover_cost_own_third: f32,
    /// ...middle third (default: 0.05)
    pub turnover_cost_middle_third: f32,
    /// ...attacking third (default: 0.08)
    pub turnover_cost_attacking_third: f32,
    /// Distance that doubles the turnover cost (default: 50.0m)
    pub turnover_distance_scale_m: f32,
    /// Extra cost when all attacking field players are committed forward (default: 0.5)
    pub commitment_weight: f32,

    /// Opponents beyond this mean distance exert no pressure (default: 15.0m)
    pub pressure_radius_m: f32,
    pub recommendation: RecommendationThresholds,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            pass_speed_mps: 15.0,
            dribble_speed_mps: 6.0,
            shot_speed_mps: 25.0,

            dribble_distance_m: 8.0,
            dribble_diagonal_deg: 30.0,
            through_pass_factor: 0.85,
            max_actions: 12,

            interception_midpoint_s: 0.1,
            interception_scale_s: 0.2,

            backward_angle_penalty: 0.1,
            population_completion_rate: 0.78,
            receiver_rate_weight: 0.5,

            turnover_cost_own_third: 0.02,
            turnover_cost_middle_third: 0.05,
            turnover_cost_attacking_third: 0.08,
            turnover_distance_scale_m: 50.0,
            commitment_weight: 0.5,

            pressure_radius_m: 15.0,
            recommendation: RecommendationThresholds::default(),
        }
    }
}
