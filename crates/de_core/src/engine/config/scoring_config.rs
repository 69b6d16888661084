//! Game-state composite score configuration

use serde::{Deserialize, Serialize};

/// Composite weights; must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub elimination_ratio: f32,
    pub gap_severity: f32,
    pub best_ev: f32,
    pub compactness_deficit: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { elimination_ratio: 0.35, gap_severity: 0.25, best_ev: 0.25, compactness_deficit: 0.15 }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f32 {
        self.elimination_ratio + self.gap_severity + self.best_ev + self.compactness_deficit
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.elimination_ratio, self.gap_severity, self.best_ev, self.compactness_deficit]
    }
}

/// Sub-score normalisation references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub scoring_weights: ScoringWeights,
    /// Gap size that saturates the size half of gap severity (default: 20.0m)
    pub gap_size_reference_m: f32,
    /// Time-to-close that saturates the time half of gap severity (default: 3.0s)
    pub gap_time_reference_s: f32,
    /// Best EV that saturates the best-EV sub-score (default: 0.15)
    pub ev_reference: f32,
    /// Mean pairwise distance at or below which the block is fully compact (default: 15.0m)
    pub compact_reference_m: f32,
    /// Mean pairwise distance at or above which the block is fully stretched (default: 30.0m)
    pub loose_reference_m: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            scoring_weights: ScoringWeights::default(),
            gap_size_reference_m: 20.0,
            gap_time_reference_s: 3.0,
            ev_reference: 0.15,
            compact_reference_m: 15.0,
            loose_reference_m: 30.0,
        }
    }
}
