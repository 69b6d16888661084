//! Key moments: the most dangerous frames and the standout decisions.

use serde::Serialize;
use std::cmp::Ordering;

use super::decision_quality::{DecisionGrade, DecisionQuality};
use crate::engine::evaluator::FrameReport;
use crate::engine::frame::{Team, TrackId};
use crate::engine::valuation::ActionKind;
use crate::engine::zone_value::ZoneColor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameMoment {
    pub frame_index: u64,
    pub timestamp_s: f64,
    pub score: f32,
    pub possession_team: Team,
    pub ball_carrier: Option<TrackId>,
    /// Danger band the carrier stands in; `None` without a carrier
    pub carrier_zone: Option<ZoneColor>,
    pub best_action: Option<ActionKind>,
    pub best_expected_value: Option<f32>,
    pub exploitable_gaps: usize,
    pub eliminated_defenders: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyMoments {
    /// Highest game-state score first
    pub most_dangerous: Vec<FrameMoment>,
    /// Optimal decisions, highest quality first
    pub best_decisions: Vec<DecisionQuality>,
    /// Missed opportunities, worst first
    pub missed_opportunities: Vec<DecisionQuality>,
    /// Critical errors, worst first
    pub critical_errors: Vec<DecisionQuality>,
}

fn by_quality(a: &DecisionQuality, b: &DecisionQuality) -> Ordering {
    let qa = a.quality.unwrap_or(0.0);
    let qb = b.quality.unwrap_or(0.0);
    qa.total_cmp(&qb).then(a.frame_index.cmp(&b.frame_index))
}

/// Top `top_n` of each category. Ties keep the earlier frame first.
pub fn extract_key_moments<'r>(
    reports: impl IntoIterator<Item = &'r FrameReport>,
    decisions: &[DecisionQuality],
    top_n: usize,
) -> KeyMoments {
    let mut most_dangerous: Vec<FrameMoment> = reports
        .into_iter()
        .filter_map(FrameReport::evaluation)
        .map(|e| FrameMoment {
            frame_index: e.frame_index,
            timestamp_s: e.timestamp_s,
            score: e.game_state.score,
            possession_team: e.possession_team,
            ball_carrier: e.ball_carrier,
            carrier_zone: e.best_action().map(|a| ZoneColor::from_value(a.zone_value_current)),
            best_action: e.best_action().map(|a| a.kind),
            best_expected_value: e.game_state.best_expected_value,
            exploitable_gaps: e.gaps.iter().filter(|g| g.exploitable).count(),
            eliminated_defenders: e.eliminations.iter().filter(|s| s.eliminated).count(),
        })
        .collect();
    most_dangerous.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.frame_index.cmp(&b.frame_index)));
    most_dangerous.truncate(top_n);

    let graded = |grade: DecisionGrade| -> Vec<DecisionQuality> {
        decisions.iter().filter(|d| d.grade == Some(grade)).cloned().collect()
    };

    let mut best_decisions = graded(DecisionGrade::Optimal);
    best_decisions.sort_by(|a, b| by_quality(b, a).then(a.frame_index.cmp(&b.frame_index)));
    best_decisions.truncate(top_n);

    let mut missed_opportunities = graded(DecisionGrade::Missed);
    missed_opportunities.sort_by(by_quality);
    missed_opportunities.truncate(top_n);

    let mut critical_errors = graded(DecisionGrade::Critical);
    critical_errors.sort_by(by_quality);
    critical_errors.truncate(top_n);

    KeyMoments { most_dangerous, best_decisions, missed_opportunities, critical_errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::decision_quality::tests::{evaluation_with, option};
    use crate::analysis::decision_quality::{assess_decision, ActualAction};
    use crate::analysis::fixtures::{attacking_frame, engine};
    use crate::engine::geometry::Vec2;

    #[test]
    fn test_most_dangerous_ordering() {
        let engine = engine();
        let mut frames: Vec<_> = (0..8).map(|i| attacking_frame(i, i as f32 * 3.0)).collect();
        frames[3].ball = None;
        let reports = engine.evaluate_batch(&frames);

        let moments = extract_key_moments(&reports, &[], 3);
        assert_eq!(moments.most_dangerous.len(), 3);
        assert!(moments.most_dangerous.iter().all(|m| m.frame_index != 3));
        for pair in moments.most_dangerous.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        let top = reports
            .iter()
            .filter_map(|r| r.evaluation())
            .map(|e| e.game_state.score)
            .fold(f32::MIN, f32::max);
        assert_eq!(moments.most_dangerous[0].score, top);
        // Carrier runs from x=50 to x=71, never into the red band
        assert!(moments
            .most_dangerous
            .iter()
            .all(|m| matches!(m.carrier_zone, Some(ZoneColor::Yellow | ZoneColor::Green))));
        assert!(moments.best_decisions.is_empty());
    }

    #[test]
    fn test_decision_categories() {
        let evaluation = evaluation_with(
            1,
            vec![
                option(ActionKind::Pass, Some(7), Vec2::new(55.0, 15.0), 0.10),
                option(ActionKind::Pass, Some(10), Vec2::new(60.0, 50.0), 0.06),
                option(ActionKind::Dribble, None, Vec2::new(58.0, 34.0), 0.03),
                option(ActionKind::Pass, Some(11), Vec2::new(40.0, 34.0), 0.01),
            ],
        );
        let pass_to = |id| assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Pass).with_receiver(id));
        let decisions = vec![
            pass_to(7),
            pass_to(10),
            pass_to(11),
            assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Dribble).with_target(58.0, 34.0)),
        ];

        let moments = extract_key_moments(std::iter::empty(), &decisions, 10);
        assert_eq!(moments.best_decisions.len(), 1);
        assert_eq!(moments.missed_opportunities.len(), 1);
        assert_eq!(moments.missed_opportunities[0].actual.target_track_id, Some(TrackId(10)));
        // Critical errors worst first
        let critical: Vec<Option<TrackId>> = moments.critical_errors.iter().map(|d| d.actual.target_track_id).collect();
        assert_eq!(critical, vec![Some(TrackId(11)), None]);
    }
}
