//! # Engine Configuration
//!
//! Every tuning constant of the pipeline lives here, grouped by stage.
//!
//! ## Usage
//! ```rust
//! use de_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let counter = EngineConfig::counter_attacking();
//! assert!(counter.validate().is_ok());
//! ```
//!
//! ## Environment Variables
//!
//! - `DE_CONFIG_PROFILE`: Select preset (balanced, counter_attacking, possession)

mod action_config;
mod physical_config;
mod scoring_config;
mod structure_config;

pub use action_config::{ActionConfig, RecommendationThresholds};
pub use physical_config::PhysicalConfig;
pub use scoring_config::{ScoringConfig, ScoringWeights};
pub use structure_config::{BlockHeightThresholds, StructureConfig};

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable naming the preset picked by [`EngineConfig::from_env_or_default`]
pub const PROFILE_ENV_VAR: &str = "DE_CONFIG_PROFILE";

/// Allowed drift of the scoring weight sum from 1
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// Full pipeline configuration. Immutable once handed to an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Coverage, elimination, frame validation
    pub physical: PhysicalConfig,
    /// Lines, gaps, block height
    pub structure: StructureConfig,
    /// Candidates, interception, expected value
    pub actions: ActionConfig,
    /// Game-state composite
    pub scoring: ScoringConfig,
}

impl EngineConfig {
    /// Even weighting of danger signals (default)
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Transition-oriented: elimination and open gaps dominate the score
    pub fn counter_attacking() -> Self {
        let mut cfg = Self::default();
        cfg.scoring.scoring_weights = ScoringWeights {
            elimination_ratio: 0.40,
            gap_severity: 0.30,
            best_ev: 0.15,
            compactness_deficit: 0.15,
        };
        cfg.structure.gap_min_size_m = 4.0;
        cfg.actions.commitment_weight = 0.3;
        cfg
    }

    /// Build-up oriented: option quality dominates, losing the ball costs more
    pub fn possession() -> Self {
        let mut cfg = Self::default();
        cfg.scoring.scoring_weights = ScoringWeights {
            elimination_ratio: 0.25,
            gap_severity: 0.15,
            best_ev: 0.45,
            compactness_deficit: 0.15,
        };
        cfg.actions.turnover_cost_middle_third = 0.07;
        cfg.actions.commitment_weight = 0.8;
        cfg
    }

    /// Preset by name (case-insensitive, '-' and '_' interchangeable).
    pub fn from_profile(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "" | "default" | "balanced" => Ok(Self::balanced()),
            "counter_attacking" | "counter" => Ok(Self::counter_attacking()),
            "possession" => Ok(Self::possession()),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }

    /// Preset named by `DE_CONFIG_PROFILE`, balanced when unset or unknown.
    pub fn from_env_or_default() -> Self {
        let profile = env::var(PROFILE_ENV_VAR).unwrap_or_default();
        match Self::from_profile(&profile) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("{err}; falling back to balanced");
                Self::balanced()
            }
        }
    }

    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physical;
        non_negative("physical.reaction_time_s", p.reaction_time_s)?;
        if p.coverage_horizons_s.is_empty() {
            return Err(ConfigError::invalid("physical.coverage_horizons_s", "must not be empty"));
        }
        for &h in &p.coverage_horizons_s {
            positive("physical.coverage_horizons_s", h)?;
        }
        if p.coverage_horizons_s.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "physical.coverage_horizons_s",
                "must be strictly increasing",
            ));
        }
        positive("physical.max_plausible_speed_mps", p.max_plausible_speed_mps)?;
        positive("physical.default_sprint_speed_mps", p.default_sprint_speed_mps)?;
        if p.default_sprint_speed_mps > p.max_plausible_speed_mps {
            return Err(ConfigError::invalid(
                "physical.default_sprint_speed_mps",
                "exceeds max_plausible_speed_mps",
            ));
        }
        positive("physical.elimination_horizon_s", p.elimination_horizon_s)?;
        non_negative("physical.elimination_epsilon_m", p.elimination_epsilon_m)?;
        non_negative("physical.bounds_tolerance_m", p.bounds_tolerance_m)?;
        if p.min_entities < 2 {
            return Err(ConfigError::invalid("physical.min_entities", "must be at least 2"));
        }
        non_negative("physical.possession_radius_m", p.possession_radius_m)?;

        let s = &self.structure;
        positive("structure.gap_horizon_s", s.gap_horizon_s)?;
        non_negative("structure.gap_min_size_m", s.gap_min_size_m)?;
        positive("structure.reference_ball_speed_mps", s.reference_ball_speed_mps)?;
        non_negative("structure.min_closing_speed_mps", s.min_closing_speed_mps)?;
        positive("structure.line_separation_m", s.line_separation_m)?;
        non_negative("structure.between_lines_min_m", s.between_lines_min_m)?;
        for &offset in &s.between_lines_probe_offsets_m {
            finite("structure.between_lines_probe_offsets_m", offset)?;
        }
        let block = &s.block_height_thresholds_m;
        non_negative("structure.block_height_thresholds_m.low_max_m", block.low_max_m)?;
        non_negative("structure.block_height_thresholds_m.mid_max_m", block.mid_max_m)?;
        if block.low_max_m > block.mid_max_m {
            return Err(ConfigError::invalid(
                "structure.block_height_thresholds_m",
                format!("low_max_m {} above mid_max_m {}", block.low_max_m, block.mid_max_m),
            ));
        }

        let a = &self.actions;
        positive("actions.pass_speed_mps", a.pass_speed_mps)?;
        positive("actions.dribble_speed_mps", a.dribble_speed_mps)?;
        positive("actions.shot_speed_mps", a.shot_speed_mps)?;
        positive("actions.dribble_distance_m", a.dribble_distance_m)?;
        non_negative("actions.dribble_diagonal_deg", a.dribble_diagonal_deg)?;
        unit_interval("actions.through_pass_factor", a.through_pass_factor)?;
        if a.max_actions == 0 {
            return Err(ConfigError::invalid("actions.max_actions", "must be at least 1"));
        }
        finite("actions.interception_midpoint_s", a.interception_midpoint_s)?;
        positive("actions.interception_scale_s", a.interception_scale_s)?;
        unit_interval("actions.backward_angle_penalty", a.backward_angle_penalty)?;
        unit_interval("actions.population_completion_rate", a.population_completion_rate)?;
        non_negative("actions.receiver_rate_weight", a.receiver_rate_weight)?;
        unit_interval("actions.turnover_cost_own_third", a.turnover_cost_own_third)?;
        unit_interval("actions.turnover_cost_middle_third", a.turnover_cost_middle_third)?;
        unit_interval("actions.turnover_cost_attacking_third", a.turnover_cost_attacking_third)?;
        positive("actions.turnover_distance_scale_m", a.turnover_distance_scale_m)?;
        non_negative("actions.commitment_weight", a.commitment_weight)?;
        positive("actions.pressure_radius_m", a.pressure_radius_m)?;
        let r = &a.recommendation;
        finite("actions.recommendation.high_value_ev", r.high_value_ev)?;
        finite("actions.recommendation.moderate_ev", r.moderate_ev)?;
        unit_interval("actions.recommendation.safe_success", r.safe_success)?;
        unit_interval("actions.recommendation.summary_safe_success", r.summary_safe_success)?;

        let sc = &self.scoring;
        for w in sc.scoring_weights.as_array() {
            non_negative("scoring.scoring_weights", w)?;
        }
        let sum = sc.scoring_weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::invalid(
                "scoring.scoring_weights",
                format!("must sum to 1 (got {sum:.4})"),
            ));
        }
        positive("scoring.gap_size_reference_m", sc.gap_size_reference_m)?;
        positive("scoring.gap_time_reference_s", sc.gap_time_reference_s)?;
        positive("scoring.ev_reference", sc.ev_reference)?;
        non_negative("scoring.compact_reference_m", sc.compact_reference_m)?;
        if sc.loose_reference_m <= sc.compact_reference_m || !sc.loose_reference_m.is_finite() {
            return Err(ConfigError::invalid(
                "scoring.loose_reference_m",
                "must be finite and above compact_reference_m",
            ));
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite (got {value})")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("must not be negative (got {value})")));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be positive (got {value})")));
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(field, format!("must be within [0, 1] (got {value})")));
    }
    Ok(())
}

// ========== Tests ==========
