//! Game state: one bounded danger/opportunity score per frame.

use serde::Serialize;

use super::config::ScoringConfig;
use super::elimination::{elimination_ratio, EliminationStatus};
use super::structure::{DefensiveStructure, Gap};
use super::valuation::ActionOption;

/// Each in [0, 1]; higher = more dangerous for the defence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SubScores {
    pub elimination_ratio: f32,
    pub gap_severity: f32,
    pub best_ev: f32,
    pub compactness_deficit: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameStateScore {
    /// Weighted composite in [0, 1]
    pub score: f32,
    pub sub_scores: SubScores,
    /// Raw EV of the best option, `None` without options
    pub best_expected_value: Option<f32>,
}

pub struct GameStateEvaluator<'a> {
    config: &'a ScoringConfig,
}

impl<'a> GameStateEvaluator<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// `0.5·size/size_ref + 0.5·ttc/time_ref`, halves capped at 1; not closing counts as 1.
    pub fn gap_severity(&self, gap: &Gap) -> f32 {
        let size = (gap.size_m / self.config.gap_size_reference_m).clamp(0.0, 1.0);
        let time = gap
            .time_to_close_s
            .map_or(1.0, |t| (t / self.config.gap_time_reference_s).clamp(0.0, 1.0));
        0.5 * size + 0.5 * time
    }

    /// 0 at or below the compact reference, 1 at or above the loose one.
    pub fn compactness_deficit(&self, compactness_m: f32) -> f32 {
        let span = self.config.loose_reference_m - self.config.compact_reference_m;
        ((compactness_m - self.config.compact_reference_m) / span).clamp(0.0, 1.0)
    }

    /// Weighted sum of the four sub-scores, clamped to [0, 1].
    ///
    /// Each term contributes at most its weight, so a frame with every defender
    /// eliminated but no open gap or positive option scores `w_elim` (0.35 by default).
    /// The score only approaches 1 when all sub-scores are high or the weights lean on
    /// the ones that are.
    pub fn evaluate(
        &self,
        eliminations: &[EliminationStatus],
        gaps: &[Gap],
        actions: &[ActionOption],
        structure: &DefensiveStructure,
    ) -> GameStateScore {
        let best_expected_value = actions.iter().map(|a| a.expected_value).max_by(|a, b| a.total_cmp(b));

        let sub_scores = SubScores {
            elimination_ratio: elimination_ratio(eliminations),
            gap_severity: gaps
                .iter()
                .filter(|g| g.exploitable)
                .map(|g| self.gap_severity(g))
                .fold(0.0, f32::max),
            best_ev: best_expected_value
                .map_or(0.0, |ev| (ev / self.config.ev_reference).clamp(0.0, 1.0)),
            compactness_deficit: if structure.line_count == 0 {
                0.0
            } else {
                self.compactness_deficit(structure.compactness_m)
            },
        };

        let w = &self.config.scoring_weights;
        let score = w.elimination_ratio * sub_scores.elimination_ratio
            + w.gap_severity * sub_scores.gap_severity
            + w.best_ev * sub_scores.best_ev
            + w.compactness_deficit * sub_scores.compactness_deficit;

        GameStateScore { score: score.clamp(0.0, 1.0), sub_scores, best_expected_value }
    }
}
