//! # Action Valuation (Expected Value Engine)
//!
//! Candidate next actions for the ball carrier:
//! - a pass to every teammate, plus a through pass into every exploitable gap
//! - dribbles straight ahead and on both diagonals
//! - a shot from inside the shooting zone
//!
//! Each is valued `EV = p × (zv(target) − zv(current)) − (1 − p) × turnover_cost`
//! and the list is ranked by EV.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::config::{ActionConfig, RecommendationThresholds};
use super::coverage::Covered;
use super::frame::{Entity, Role, TrackId};
use super::geometry::{
    attack_direction, attacked_goal, clamp_to_pitch, is_in_opponent_half, is_in_shooting_zone, third_of,
    PitchThird, Vec2,
};
use super::interception::{
    angle_factor, completion_probability, distance_factor, receiver_factor, InterceptionEstimate,
    InterceptionModel,
};
use super::priors::PlayerPriors;
use super::structure::Gap;
use super::validation::FrameContext;
use super::zone_value::{zone_value, ZoneColor};

/// Zone value credited to a scored shot
pub const SHOT_TARGET_ZONE_VALUE: f32 = 1.0;
/// Opponents averaged for defender pressure
pub const PRESSURE_NEIGHBOURS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Pass,
    Dribble,
    Shot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    HighValue,
    Safe,
    Moderate,
    LowValue,
    Avoid,
}

/// HIGH_VALUE ≥ high_value_ev; SAFE: p ≥ safe_success with EV ≥ 0; MODERATE ≥ moderate_ev;
/// LOW_VALUE ≥ 0; AVOID otherwise.
pub fn recommend(expected_value: f32, success_probability: f32, t: &RecommendationThresholds) -> Recommendation {
    if expected_value >= t.high_value_ev {
        Recommendation::HighValue
    } else if success_probability >= t.safe_success && expected_value >= 0.0 {
        Recommendation::Safe
    } else if expected_value >= t.moderate_ev {
        Recommendation::Moderate
    } else if expected_value >= 0.0 {
        Recommendation::LowValue
    } else {
        Recommendation::Avoid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOption {
    pub kind: ActionKind,
    pub target: Vec2,
    /// Receiver of a pass
    pub target_track_id: Option<TrackId>,
    /// Pass into a gap rather than to feet
    pub through_gap: bool,
    pub distance_m: f32,
    pub defender_pressure: f32,
    pub success_probability: f32,
    /// Interception (or shot block) probability
    pub interception_probability: Option<f32>,
    pub zone_value_current: f32,
    pub zone_value_target: f32,
    pub zone_value_gain: f32,
    /// Danger band of the target
    pub target_zone: ZoneColor,
    pub turnover_cost: f32,
    pub expected_value: f32,
    pub recommendation: Recommendation,
    pub is_safe_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActionSummary {
    pub total_options: usize,
    pub high_value_options: usize,
    pub safe_options: usize,
}

pub fn summarize(options: &[ActionOption], t: &RecommendationThresholds) -> ActionSummary {
    ActionSummary {
        total_options: options.len(),
        high_value_options: options.iter().filter(|o| o.expected_value >= t.high_value_ev).count(),
        safe_options: options.iter().filter(|o| o.success_probability >= t.summary_safe_success).count(),
    }
}

#[inline]
pub fn expected_value(success_probability: f32, zone_value_gain: f32, turnover_cost: f32) -> f32 {
    success_probability * zone_value_gain - (1.0 - success_probability) * turnover_cost
}

/// `max(0, 1 − mean distance of the nearest opponents / radius)`; 0 without opponents.
pub fn defender_pressure(point: Vec2, opponents: &[Covered<'_>], radius_m: f32) -> f32 {
    let mut distances: Vec<f32> = opponents.iter().map(|o| o.position().distance(point)).collect();
    if distances.is_empty() {
        return 0.0;
    }
    distances.sort_by(|a, b| a.total_cmp(b));
    let nearest = &distances[..distances.len().min(PRESSURE_NEIGHBOURS)];
    let mean = nearest.iter().sum::<f32>() / nearest.len() as f32;
    (1.0 - mean / radius_m).max(0.0)
}

/// Share of attacking field players already in the opponent half.
pub fn committed_ratio<'e>(attackers: impl Iterator<Item = &'e Entity>, attacks_right: bool) -> f32 {
    let (mut total, mut committed) = (0usize, 0usize);
    for player in attackers.filter(|e| e.role == Role::Field) {
        total += 1;
        if is_in_opponent_half(player.position, attacks_right) {
            committed += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        committed as f32 / total as f32
    }
}

/// EV descending, then success probability, then kind and target for a total order.
pub fn compare_options(a: &ActionOption, b: &ActionOption) -> Ordering {
    b.expected_value
        .total_cmp(&a.expected_value)
        .then(b.success_probability.total_cmp(&a.success_probability))
        .then(a.kind.cmp(&b.kind))
        .then(a.target_track_id.cmp(&b.target_track_id))
        .then(a.target.x.total_cmp(&b.target.x))
        .then(a.target.y.total_cmp(&b.target.y))
}

/// Sort, flag the safe default and cut to `max_actions`, keeping the safe default.
pub fn rank_options(mut options: Vec<ActionOption>, max_actions: usize) -> Vec<ActionOption> {
    options.sort_by(compare_options);

    // Highest success pass to feet; ties to the shorter pass, then the lower id
    let safe = options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.kind == ActionKind::Pass && !o.through_gap)
        .max_by(|(_, a), (_, b)| {
            a.success_probability
                .total_cmp(&b.success_probability)
                .then(b.distance_m.total_cmp(&a.distance_m))
                .then(b.target_track_id.cmp(&a.target_track_id))
        })
        .map(|(i, _)| i);

    if let Some(i) = safe {
        options[i].is_safe_default = true;
    }
    if options.len() > max_actions {
        let tail = options.split_off(max_actions);
        if let Some(i) = safe.filter(|&i| i >= max_actions) {
            options.push(tail[i - max_actions].clone());
        }
    }
    options
}

pub struct ActionValuator<'a> {
    config: &'a ActionConfig,
    priors: &'a dyn PlayerPriors,
    interception: InterceptionModel,
}

impl<'a> ActionValuator<'a> {
    pub fn new(config: &'a ActionConfig, priors: &'a dyn PlayerPriors) -> Self {
        Self { config, priors, interception: InterceptionModel::new(config) }
    }

    /// Cost of losing the ball at `target` after a `distance_m` action.
    pub fn turnover_cost(&self, target: Vec2, distance_m: f32, attacks_right: bool, committed: f32) -> f32 {
        let base = match third_of(target, attacks_right) {
            PitchThird::Defensive => self.config.turnover_cost_own_third,
            PitchThird::Middle => self.config.turnover_cost_middle_third,
            PitchThird::Attacking => self.config.turnover_cost_attacking_third,
        };
        let cost = base
            * (1.0 + distance_m / self.config.turnover_distance_scale_m)
            * (1.0 + self.config.commitment_weight * committed);
        cost.clamp(0.0, 1.0)
    }

    /// Ranked options for the carrier; empty when nobody has the ball at their feet.
    pub fn evaluate(
        &self,
        ctx: &FrameContext<'_>,
        opponents: &[Covered<'_>],
        gaps: &[Gap],
        eliminated: &BTreeSet<TrackId>,
    ) -> Vec<ActionOption> {
        let Some(carrier) = ctx.carrier_entity() else {
            return Vec::new();
        };
        let scene = Scene {
            origin: ctx.ball.position,
            attacks_right: ctx.attacks_right,
            committed: committed_ratio(ctx.attackers(), ctx.attacks_right),
            opponents,
            eliminated,
        };
        let teammates: Vec<&Entity> =
            ctx.attackers().filter(|e| e.track_id != carrier.track_id).collect();

        let mut options = Vec::new();
        for mate in &teammates {
            options.push(self.pass(&scene, mate.position, mate.track_id, false));
        }
        for gap in gaps.iter().filter(|g| g.exploitable) {
            let receiver = teammates.iter().min_by(|a, b| {
                a.position
                    .distance(gap.centroid)
                    .total_cmp(&b.position.distance(gap.centroid))
                    .then(a.track_id.cmp(&b.track_id))
            });
            if let Some(receiver) = receiver {
                options.push(self.pass(&scene, gap.centroid, receiver.track_id, true));
            }
        }

        let diagonal = self.config.dribble_diagonal_deg.to_radians();
        for angle in [0.0, diagonal, -diagonal] {
            let dir = attack_direction(scene.attacks_right).rotated(angle);
            let target = clamp_to_pitch(scene.origin + dir * self.config.dribble_distance_m);
            if target.distance(scene.origin) > 1e-3 {
                options.push(self.dribble(&scene, target));
            }
        }

        if is_in_shooting_zone(scene.origin, scene.attacks_right) {
            options.push(self.shot(&scene));
        }

        rank_options(options, self.config.max_actions)
    }

    fn pass(&self, scene: &Scene<'_, '_>, target: Vec2, receiver: TrackId, through_gap: bool) -> ActionOption {
        let distance = scene.origin.distance(target);
        let estimate = self.interception.estimate(
            scene.origin,
            target,
            self.config.pass_speed_mps,
            scene.opponents,
            scene.eliminated,
            scene.attacks_right,
        );
        let receiver_rate = receiver_factor(
            self.priors.completion_rate(receiver),
            self.config.population_completion_rate,
            self.config.receiver_rate_weight,
        );
        let mut p = completion_probability(
            estimate.probability,
            distance_factor(distance),
            angle_factor(target - scene.origin, scene.attacks_right, self.config.backward_angle_penalty),
            receiver_rate,
        );
        if through_gap {
            p *= self.config.through_pass_factor;
        }
        self.option(scene, ActionKind::Pass, target, Some(receiver), through_gap, p, estimate, None)
    }

    fn dribble(&self, scene: &Scene<'_, '_>, target: Vec2) -> ActionOption {
        let distance = scene.origin.distance(target);
        let estimate = self.interception.estimate(
            scene.origin,
            target,
            self.config.dribble_speed_mps,
            scene.opponents,
            scene.eliminated,
            scene.attacks_right,
        );
        let p = completion_probability(
            estimate.probability,
            distance_factor(distance),
            angle_factor(target - scene.origin, scene.attacks_right, self.config.backward_angle_penalty),
            1.0,
        );
        self.option(scene, ActionKind::Dribble, target, None, false, p, estimate, None)
    }

    fn shot(&self, scene: &Scene<'_, '_>) -> ActionOption {
        let target = attacked_goal(scene.attacks_right);
        // Nobody is out of the play for a shot
        let block = self.interception.estimate(
            scene.origin,
            target,
            self.config.shot_speed_mps,
            scene.opponents,
            &BTreeSet::new(),
            scene.attacks_right,
        );
        let p = (zone_value(scene.origin, scene.attacks_right) * (1.0 - block.probability)).clamp(0.0, 1.0);
        self.option(scene, ActionKind::Shot, target, None, false, p, block, Some(SHOT_TARGET_ZONE_VALUE))
    }

    fn option(
        &self,
        scene: &Scene<'_, '_>,
        kind: ActionKind,
        target: Vec2,
        target_track_id: Option<TrackId>,
        through_gap: bool,
        success_probability: f32,
        estimate: InterceptionEstimate,
        target_value: Option<f32>,
    ) -> ActionOption {
        let distance_m = scene.origin.distance(target);
        let zone_value_current = zone_value(scene.origin, scene.attacks_right);
        let zone_value_target = target_value.unwrap_or_else(|| zone_value(target, scene.attacks_right));
        let zone_value_gain = zone_value_target - zone_value_current;
        let turnover_cost = self.turnover_cost(target, distance_m, scene.attacks_right, scene.committed);
        let ev = expected_value(success_probability, zone_value_gain, turnover_cost);

        ActionOption {
            kind,
            target,
            target_track_id,
            through_gap,
            distance_m,
            defender_pressure: match kind {
                ActionKind::Shot => defender_pressure(scene.origin, scene.opponents, self.config.pressure_radius_m),
                _ => defender_pressure(target, scene.opponents, self.config.pressure_radius_m),
            },
            success_probability,
            interception_probability: Some(estimate.probability),
            zone_value_current,
            zone_value_target,
            zone_value_gain,
            target_zone: ZoneColor::from_value(zone_value_target),
            turnover_cost,
            expected_value: ev,
            recommendation: recommend(ev, success_probability, &self.config.recommendation),
            is_safe_default: false,
        }
    }
}

/// What every candidate of one frame shares.
struct Scene<'c, 'e> {
    origin: Vec2,
    attacks_right: bool,
    committed: f32,
    opponents: &'c [Covered<'e>],
    eliminated: &'c BTreeSet<TrackId>,
}
