//! Decision quality: how the action actually taken compares with the best option the
//! engine found for the same frame.
//!
//! quality = EV(actual) / EV(best), defined only when the best EV is positive.

use serde::{Deserialize, Serialize};

use crate::engine::evaluator::FrameEvaluation;
use crate::engine::frame::TrackId;
use crate::engine::geometry::Vec2;
use crate::engine::valuation::{ActionKind, ActionOption};

/// Largest distance between a reported target point and an option's target that still
/// counts as the same action.
pub const POINT_MATCH_RADIUS_M: f32 = 5.0;

pub const OPTIMAL_MIN: f32 = 0.95;
pub const GOOD_MIN: f32 = 0.75;
pub const MISSED_MIN: f32 = 0.5;

/// What the player actually did at a frame, as reported by event data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualAction {
    pub frame_index: u64,
    pub kind: ActionKind,
    #[serde(default)]
    pub target_track_id: Option<TrackId>,
    #[serde(default)]
    pub target_x: Option<f32>,
    #[serde(default)]
    pub target_y: Option<f32>,
}

impl ActualAction {
    pub fn new(frame_index: u64, kind: ActionKind) -> Self {
        Self { frame_index, kind, target_track_id: None, target_x: None, target_y: None }
    }

    pub fn with_receiver(mut self, track_id: u32) -> Self {
        self.target_track_id = Some(TrackId(track_id));
        self
    }

    pub fn with_target(mut self, x: f32, y: f32) -> Self {
        self.target_x = Some(x);
        self.target_y = Some(y);
        self
    }

    fn target_point(&self) -> Option<Vec2> {
        Some(Vec2::new(self.target_x?, self.target_y?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionGrade {
    Optimal,
    Good,
    Missed,
    Critical,
}

impl DecisionGrade {
    pub fn from_quality(quality: f32) -> Self {
        if quality >= OPTIMAL_MIN {
            DecisionGrade::Optimal
        } else if quality >= GOOD_MIN {
            DecisionGrade::Good
        } else if quality >= MISSED_MIN {
            DecisionGrade::Missed
        } else {
            DecisionGrade::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionQuality {
    pub frame_index: u64,
    pub timestamp_s: f64,
    pub actual: ActualAction,
    /// EV of the matching option; `None` when nothing the engine ranked matches
    pub actual_expected_value: Option<f32>,
    pub best_kind: Option<ActionKind>,
    pub best_target_track_id: Option<TrackId>,
    pub best_expected_value: Option<f32>,
    pub quality: Option<f32>,
    pub grade: Option<DecisionGrade>,
}

/// Option matching `actual`: same kind, then the same receiver or the nearest target
/// within [`POINT_MATCH_RADIUS_M`]. A shot matches on kind alone.
fn find_match<'e>(options: &'e [ActionOption], actual: &ActualAction) -> Option<&'e ActionOption> {
    let mut same_kind = options.iter().filter(|o| o.kind == actual.kind);
    if let Some(id) = actual.target_track_id {
        // Ranked best first, so the first hit is the receiver's best variant
        return same_kind.find(|o| o.target_track_id == Some(id));
    }
    if let Some(point) = actual.target_point() {
        return same_kind
            .map(|o| (o, o.target.distance(point)))
            .filter(|(_, d)| *d <= POINT_MATCH_RADIUS_M)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(o, _)| o);
    }
    if actual.kind == ActionKind::Shot {
        return options.iter().find(|o| o.kind == ActionKind::Shot);
    }
    None
}

pub fn assess_decision(evaluation: &FrameEvaluation, actual: &ActualAction) -> DecisionQuality {
    let best = evaluation.best_action();
    let matched = find_match(&evaluation.actions, actual);
    let actual_ev = matched.map(|o| o.expected_value);
    let best_ev = best.map(|o| o.expected_value);

    let quality = match (actual_ev, best_ev) {
        (Some(a), Some(b)) if b > 0.0 => Some(a / b),
        _ => None,
    };

    DecisionQuality {
        frame_index: evaluation.frame_index,
        timestamp_s: evaluation.timestamp_s,
        actual: actual.clone(),
        actual_expected_value: actual_ev,
        best_kind: best.map(|o| o.kind),
        best_target_track_id: best.and_then(|o| o.target_track_id),
        best_expected_value: best_ev,
        quality,
        grade: quality.map(DecisionGrade::from_quality),
    }
}

/// Aggregate over graded decisions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DecisionReview {
    pub assessed: usize,
    /// Assessed but without a quality (no match, or no positive best option)
    pub ungraded: usize,
    pub mean_quality: Option<f32>,
    pub optimal: usize,
    pub good: usize,
    pub missed: usize,
    pub critical: usize,
}

pub fn review_decisions(decisions: &[DecisionQuality]) -> DecisionReview {
    let mut review = DecisionReview { assessed: decisions.len(), ..Default::default() };
    let mut sum = 0.0f64;
    let mut graded = 0usize;
    for d in decisions {
        let (Some(q), Some(grade)) = (d.quality, d.grade) else {
            review.ungraded += 1;
            continue;
        };
        sum += f64::from(q);
        graded += 1;
        match grade {
            DecisionGrade::Optimal => review.optimal += 1,
            DecisionGrade::Good => review.good += 1,
            DecisionGrade::Missed => review.missed += 1,
            DecisionGrade::Critical => review.critical += 1,
        }
    }
    if graded > 0 {
        review.mean_quality = Some((sum / graded as f64) as f32);
    }
    review
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::fixtures::{attacking_frame, engine};
    use crate::engine::valuation::Recommendation;
    use crate::engine::zone_value::ZoneColor;

    pub(crate) fn option(kind: ActionKind, receiver: Option<u32>, target: Vec2, ev: f32) -> ActionOption {
        ActionOption {
            kind,
            target,
            target_track_id: receiver.map(TrackId),
            through_gap: false,
            distance_m: 10.0,
            defender_pressure: 0.0,
            success_probability: 0.8,
            interception_probability: None,
            zone_value_current: 0.1,
            zone_value_target: 0.2,
            zone_value_gain: 0.1,
            target_zone: ZoneColor::from_value(0.2),
            turnover_cost: 0.05,
            expected_value: ev,
            recommendation: Recommendation::Moderate,
            is_safe_default: false,
        }
    }

    /// Real evaluation with the action list replaced, best first.
    pub(crate) fn evaluation_with(index: u64, actions: Vec<ActionOption>) -> FrameEvaluation {
        let mut evaluation = engine().evaluate(&attacking_frame(index, 0.0)).unwrap();
        evaluation.actions = actions;
        evaluation
    }

    fn scripted(index: u64) -> FrameEvaluation {
        evaluation_with(
            index,
            vec![
                option(ActionKind::Pass, Some(7), Vec2::new(55.0, 15.0), 0.10),
                option(ActionKind::Dribble, None, Vec2::new(58.0, 34.0), 0.08),
                option(ActionKind::Pass, Some(10), Vec2::new(60.0, 50.0), 0.04),
                option(ActionKind::Shot, None, Vec2::new(105.0, 34.0), 0.02),
            ],
        )
    }

    #[test]
    fn test_grades() {
        assert_eq!(DecisionGrade::from_quality(1.0), DecisionGrade::Optimal);
        assert_eq!(DecisionGrade::from_quality(0.95), DecisionGrade::Optimal);
        assert_eq!(DecisionGrade::from_quality(0.8), DecisionGrade::Good);
        assert_eq!(DecisionGrade::from_quality(0.5), DecisionGrade::Missed);
        assert_eq!(DecisionGrade::from_quality(0.49), DecisionGrade::Critical);
        assert_eq!(DecisionGrade::from_quality(-0.3), DecisionGrade::Critical);
    }

    #[test]
    fn test_best_choice_is_optimal() {
        let d = assess_decision(&scripted(1), &ActualAction::new(1, ActionKind::Pass).with_receiver(7));
        assert_eq!(d.quality, Some(1.0));
        assert_eq!(d.grade, Some(DecisionGrade::Optimal));
        assert_eq!(d.best_target_track_id, Some(TrackId(7)));
    }

    #[test]
    fn test_match_by_point_and_kind() {
        let evaluation = scripted(1);
        let d = assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Dribble).with_target(57.0, 33.0));
        assert!((d.quality.unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(d.grade, Some(DecisionGrade::Good));

        let d = assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Pass).with_target(61.0, 49.0));
        assert!((d.quality.unwrap() - 0.4).abs() < 1e-6);
        assert_eq!(d.grade, Some(DecisionGrade::Critical));

        let d = assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Shot));
        assert_eq!(d.actual_expected_value, Some(0.02));
    }

    #[test]
    fn test_unmatched_is_ungraded() {
        let evaluation = scripted(1);
        // Too far from any dribble target
        let far = assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Dribble).with_target(30.0, 10.0));
        assert_eq!(far.quality, None);
        // Unknown receiver
        let stranger = assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Pass).with_receiver(99));
        assert_eq!(stranger.grade, None);
        assert_eq!(stranger.best_expected_value, Some(0.10));
    }

    #[test]
    fn test_no_positive_best_is_ungraded() {
        let evaluation = evaluation_with(2, vec![option(ActionKind::Pass, Some(7), Vec2::new(55.0, 15.0), -0.01)]);
        let d = assess_decision(&evaluation, &ActualAction::new(2, ActionKind::Pass).with_receiver(7));
        assert_eq!(d.actual_expected_value, Some(-0.01));
        assert_eq!(d.quality, None);
    }

    #[test]
    fn test_review() {
        let evaluation = scripted(1);
        let decisions = vec![
            assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Pass).with_receiver(7)),
            assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Pass).with_receiver(10)),
            assess_decision(&evaluation, &ActualAction::new(1, ActionKind::Pass).with_receiver(99)),
        ];
        let review = review_decisions(&decisions);
        assert_eq!(review.assessed, 3);
        assert_eq!(review.ungraded, 1);
        assert_eq!((review.optimal, review.critical), (1, 1));
        assert!((review.mean_quality.unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_actual_action_json() {
        let a: ActualAction = serde_json::from_str(r#"{"frame_index": 4, "kind": "pass", "target_track_id": 7}"#).unwrap();
        assert_eq!(a, ActualAction::new(4, ActionKind::Pass).with_receiver(7));
    }
}
