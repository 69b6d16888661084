//! Match summary over a run of frame reports.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::elimination::elimination_ratio;
use crate::engine::evaluator::FrameReport;
use crate::engine::frame::Team;
use crate::engine::structure::BlockHeight;
use crate::engine::valuation::Recommendation;
use crate::error::FrameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlockDistribution {
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

impl BlockDistribution {
    fn record(&mut self, block: BlockHeight) {
        match block {
            BlockHeight::Low => self.low += 1,
            BlockHeight::Mid => self.mid += 1,
            BlockHeight::High => self.high += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePeak {
    pub frame_index: u64,
    pub timestamp_s: f64,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MatchSummary {
    pub total_frames: usize,
    pub evaluated_frames: usize,
    pub rejected_frames: usize,
    /// Subset of `rejected_frames` dropped by cancellation rather than bad input
    pub cancelled_frames: usize,
    /// Rejections by malformed-frame reason
    pub rejection_reasons: BTreeMap<&'static str, usize>,
    pub mean_score: Option<f32>,
    /// Highest score; ties keep the earlier frame
    pub peak: Option<ScorePeak>,
    pub mean_elimination_ratio: Option<f32>,
    pub block_distribution: BlockDistribution,
    pub exploitable_gaps: usize,
    pub high_value_options: usize,
    pub possession_team_a: usize,
    pub possession_team_b: usize,
}

impl MatchSummary {
    pub fn from_reports<'r>(reports: impl IntoIterator<Item = &'r FrameReport>) -> Self {
        let mut summary = MatchSummary::default();
        let mut score_sum = 0.0f64;
        let mut ratio_sum = 0.0f64;

        for report in reports {
            summary.total_frames += 1;
            let evaluation = match report {
                FrameReport::Evaluated(e) => e,
                FrameReport::Rejected { error, .. } => {
                    summary.rejected_frames += 1;
                    match error {
                        FrameError::Malformed { reason, .. } => {
                            *summary.rejection_reasons.entry(reason.code()).or_default() += 1;
                        }
                        FrameError::Cancelled { .. } => summary.cancelled_frames += 1,
                    }
                    continue;
                }
            };

            summary.evaluated_frames += 1;
            let score = evaluation.game_state.score;
            score_sum += f64::from(score);
            ratio_sum += f64::from(elimination_ratio(&evaluation.eliminations));

            if summary.peak.map_or(true, |p| score > p.score) {
                summary.peak = Some(ScorePeak {
                    frame_index: evaluation.frame_index,
                    timestamp_s: evaluation.timestamp_s,
                    score,
                });
            }
            summary.block_distribution.record(evaluation.structure.block);
            summary.exploitable_gaps += evaluation.gaps.iter().filter(|g| g.exploitable).count();
            summary.high_value_options += evaluation
                .actions
                .iter()
                .filter(|a| a.recommendation == Recommendation::HighValue)
                .count();
            match evaluation.possession_team {
                Team::A => summary.possession_team_a += 1,
                Team::B => summary.possession_team_b += 1,
            }
        }

        if summary.evaluated_frames > 0 {
            let n = summary.evaluated_frames as f64;
            summary.mean_score = Some((score_sum / n) as f32);
            summary.mean_elimination_ratio = Some((ratio_sum / n) as f32);
        }
        summary
    }

    pub fn rejection_rate(&self) -> f32 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.rejected_frames as f32 / self.total_frames as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{attacking_frame, engine};
    use crate::engine::evaluator::CancelToken;

    #[test]
    fn test_empty() {
        let summary = MatchSummary::from_reports(&Vec::<FrameReport>::new());
        assert_eq!(summary.total_frames, 0);
        assert_eq!(summary.mean_score, None);
        assert_eq!(summary.peak, None);
        assert_eq!(summary.rejection_rate(), 0.0);
    }

    #[test]
    fn test_counts_and_peak() {
        let engine = engine();
        let mut frames: Vec<_> = (0..6).map(|i| attacking_frame(i, i as f32 * 5.0)).collect();
        frames[2].ball = None;
        let mut reports = engine.evaluate_batch(&frames);

        let token = CancelToken::new();
        token.cancel();
        reports.push(engine.report_with(&attacking_frame(6, 0.0), &token));

        let summary = MatchSummary::from_reports(&reports);
        assert_eq!(summary.total_frames, 7);
        assert_eq!(summary.evaluated_frames, 5);
        assert_eq!(summary.rejected_frames, 2);
        assert_eq!(summary.cancelled_frames, 1);
        assert_eq!(summary.rejection_reasons.get("missing_ball"), Some(&1));
        assert_eq!(summary.possession_team_a, 5);
        let blocks = summary.block_distribution;
        assert_eq!(blocks.low + blocks.mid + blocks.high, 5);

        let scores: Vec<f32> = reports.iter().filter_map(|r| r.evaluation()).map(|e| e.game_state.score).collect();
        let max = scores.iter().copied().fold(f32::MIN, f32::max);
        let peak = summary.peak.unwrap();
        assert_eq!(peak.score, max);
        let first_at_max = reports
            .iter()
            .filter_map(|r| r.evaluation())
            .find(|e| e.game_state.score == max)
            .map(|e| e.frame_index);
        assert_eq!(Some(peak.frame_index), first_at_max);

        let mean = summary.mean_score.unwrap();
        assert!((mean - scores.iter().sum::<f32>() / 5.0).abs() < 1e-5);
        assert!((0.0..=1.0).contains(&summary.mean_elimination_ratio.unwrap()));
        assert!((summary.rejection_rate() - 2.0 / 7.0).abs() < 1e-6);
    }
}
