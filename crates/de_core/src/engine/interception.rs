//! # Interception & Success Probability
//!
//! For a ball travelling a→b at speed `v`, a defender reaching a point `u` meters along the
//! segment is early by `lead(u) = u/v − (reaction + |P(u) − D| / s)`. `lead` is concave in
//! `u`, so its maximum over the segment has a closed form:
//!
//! - `k = s / v ≥ 1`: lead increases along the whole segment, `u* = L`
//! - otherwise `u* = p + k·q / √(1 − k²)` clamped to `[0, L]`
//!
//! where `p` is the defender's projection onto the segment line and `q` their distance
//! from it. Any positive lead means the defender gets there first.

use serde::Serialize;
use std::collections::BTreeSet;

use super::config::ActionConfig;
use super::coverage::{CoverageZone, Covered};
use super::frame::TrackId;
use super::geometry::{angle_between, attack_direction, depth_from_attacked_goal, Vec2};

/// Completion by pass length: (distance_m, factor), linearly interpolated
pub const DISTANCE_DECAY_TABLE: [(f32, f32); 8] = [
    (5.0, 0.95),
    (10.0, 0.90),
    (15.0, 0.85),
    (20.0, 0.78),
    (25.0, 0.70),
    (30.0, 0.62),
    (35.0, 0.55),
    (40.0, 0.48),
];
/// Factor lost per meter beyond the end of the table
pub const LONG_PASS_DECAY_PER_M: f32 = 0.008;
pub const LONG_PASS_FLOOR: f32 = 0.25;
/// Receiver history can move completion at most this far either way
pub const RECEIVER_FACTOR_RANGE: (f32, f32) = (0.5, 1.5);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterceptionEstimate {
    /// 0 when nobody is eligible
    pub probability: f32,
    /// Best lead among eligible defenders (s)
    pub max_lead_s: Option<f32>,
    pub interceptor: Option<TrackId>,
    /// Where the best-placed defender meets the ball
    pub point: Option<Vec2>,
}

impl InterceptionEstimate {
    pub const UNCONTESTED: InterceptionEstimate =
        InterceptionEstimate { probability: 0.0, max_lead_s: None, interceptor: None, point: None };
}

/// Largest lead of one defender over segment a→b.
///
/// **Returns**: `(lead_s, meeting_point)`
pub fn max_lead(a: Vec2, b: Vec2, ball_speed_mps: f32, zone: &CoverageZone) -> (f32, Vec2) {
    let s = zone.reach_speed_mps;
    if s <= 0.0 || ball_speed_mps <= 0.0 {
        return (f32::NEG_INFINITY, a);
    }
    let defender_time = |point: Vec2| zone.reaction_time_s + zone.center.distance(point) / s;

    let offset = b - a;
    let length = offset.length();
    let Some(dir) = offset.normalized() else {
        return (-defender_time(a), a);
    };

    let rel = zone.center - a;
    let p = rel.dot(dir);
    let q = rel.cross(dir).abs();
    let k = s / ball_speed_mps;

    let u = if k >= 1.0 { length } else { (p + k * q / (1.0 - k * k).sqrt()).clamp(0.0, length) };
    let point = a + dir * u;
    (u / ball_speed_mps - defender_time(point), point)
}

/// An eliminated defender deeper than both ends of the segment cannot get back to it.
pub fn is_eligible(
    defender: &Covered<'_>,
    a: Vec2,
    b: Vec2,
    eliminated: &BTreeSet<TrackId>,
    attacks_right: bool,
) -> bool {
    if !eliminated.contains(&defender.track_id()) {
        return true;
    }
    let depth = |p: Vec2| depth_from_attacked_goal(p, attacks_right);
    depth(defender.position()) <= depth(a).max(depth(b))
}

#[derive(Debug, Clone)]
pub struct InterceptionModel {
    midpoint_s: f32,
    scale_s: f32,
}

impl InterceptionModel {
    pub fn new(config: &ActionConfig) -> Self {
        Self { midpoint_s: config.interception_midpoint_s, scale_s: config.interception_scale_s }
    }

    /// Logistic in lead; monotone increasing, within [0, 1].
    pub fn probability_from_lead(&self, lead_s: f32) -> f32 {
        if lead_s.is_nan() {
            return 0.0;
        }
        let p = 1.0 / (1.0 + (-(lead_s - self.midpoint_s) / self.scale_s).exp());
        p.clamp(0.0, 1.0)
    }

    /// Interception risk of segment a→b against every eligible opponent.
    pub fn estimate(
        &self,
        a: Vec2,
        b: Vec2,
        ball_speed_mps: f32,
        opponents: &[Covered<'_>],
        eliminated: &BTreeSet<TrackId>,
        attacks_right: bool,
    ) -> InterceptionEstimate {
        let best = opponents
            .iter()
            .filter(|d| is_eligible(d, a, b, eliminated, attacks_right))
            .map(|d| {
                let (lead, point) = max_lead(a, b, ball_speed_mps, &d.zone);
                (lead, point, d.track_id())
            })
            .max_by(|x, y| x.0.total_cmp(&y.0).then(y.2.cmp(&x.2)));

        match best {
            Some((lead, point, id)) => InterceptionEstimate {
                probability: self.probability_from_lead(lead),
                max_lead_s: lead.is_finite().then_some(lead),
                interceptor: Some(id),
                point: Some(point),
            },
            None => InterceptionEstimate::UNCONTESTED,
        }
    }
}

/// Completion factor from the decay table.
pub fn distance_factor(distance_m: f32) -> f32 {
    let (first_d, first_f) = DISTANCE_DECAY_TABLE[0];
    if distance_m <= first_d {
        return first_f;
    }
    for pair in DISTANCE_DECAY_TABLE.windows(2) {
        let ((d0, f0), (d1, f1)) = (pair[0], pair[1]);
        if distance_m <= d1 {
            let t = (distance_m - d0) / (d1 - d0);
            return f0 + (f1 - f0) * t;
        }
    }
    let (last_d, last_f) = DISTANCE_DECAY_TABLE[DISTANCE_DECAY_TABLE.len() - 1];
    (last_f - (distance_m - last_d) * LONG_PASS_DECAY_PER_M).max(LONG_PASS_FLOOR)
}

/// `1 − penalty · θ/π`, θ the angle between the ball path and the attack direction.
pub fn angle_factor(path: Vec2, attacks_right: bool, backward_penalty: f32) -> f32 {
    let theta = angle_between(path, attack_direction(attacks_right));
    1.0 - backward_penalty * theta / std::f32::consts::PI
}

/// Receiver history relative to the population rate; population when missing.
pub fn receiver_factor(rate: Option<f32>, population_rate: f32, weight: f32) -> f32 {
    let rate = rate.filter(|r| r.is_finite()).unwrap_or(population_rate);
    (1.0 + weight * (rate - population_rate)).clamp(RECEIVER_FACTOR_RANGE.0, RECEIVER_FACTOR_RANGE.1)
}

pub fn completion_probability(interception: f32, distance: f32, angle: f32, receiver: f32) -> f32 {
    let p = (1.0 - interception) * distance * angle * receiver;
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PhysicalConfig;
    use crate::engine::coverage::CoverageModel;
    use crate::engine::frame::{Entity, Team};
    use proptest::prelude::*;

    fn zone_at(x: f32, y: f32, speed: f32) -> CoverageZone {
        let entity = Entity::field(5, Team::B, x, y);
        CoverageModel::new(&PhysicalConfig::default()).zone_with_speed(&entity, speed)
    }

    fn model() -> InterceptionModel {
        InterceptionModel::new(&ActionConfig::default())
    }

    #[test]
    fn test_defender_on_path_has_positive_lead() {
        // Defender standing on the line 10m out; ball needs 0.67s, defender only reacts
        let zone = zone_at(40.0, 34.0, 7.0);
        let (lead, point) = max_lead(Vec2::new(30.0, 34.0), Vec2::new(60.0, 34.0), 15.0, &zone);
        assert!(lead > 0.0);
        assert!((point.x - 40.0).abs() < 1e-3);
        assert!((lead - (10.0 / 15.0 - 0.3)).abs() < 1e-4);
    }

    #[test]
    fn test_distant_defender_negative_lead() {
        let zone = zone_at(40.0, 5.0, 7.0);
        let (lead, _) = max_lead(Vec2::new(30.0, 34.0), Vec2::new(45.0, 34.0), 15.0, &zone);
        assert!(lead < 0.0);
        assert!(model().probability_from_lead(lead) < 0.05);
    }

    #[test]
    fn test_fast_defender_meets_at_end() {
        let zone = zone_at(40.0, 40.0, 8.0);
        let (_, point) = max_lead(Vec2::new(30.0, 34.0), Vec2::new(35.0, 34.0), 6.0, &zone);
        assert_eq!(point, Vec2::new(35.0, 34.0));
    }

    #[test]
    fn test_no_eligible_defenders_is_zero() {
        let estimate = model().estimate(
            Vec2::new(30.0, 34.0),
            Vec2::new(50.0, 34.0),
            15.0,
            &[],
            &BTreeSet::new(),
            true,
        );
        assert_eq!(estimate.probability, 0.0);
        assert_eq!(estimate, InterceptionEstimate::UNCONTESTED);
    }

    #[test]
    fn test_eliminated_deep_defender_ignored() {
        let entity = Entity::field(5, Team::B, 40.0, 34.0);
        let covered = CoverageModel::new(&PhysicalConfig::default()).cover([&entity], &crate::engine::priors::NoPriors);
        let eliminated: BTreeSet<TrackId> = [TrackId(5)].into_iter().collect();

        // Both ends closer to the defended goal (x=105) than the defender
        assert!(!is_eligible(&covered[0], Vec2::new(60.0, 34.0), Vec2::new(70.0, 30.0), &eliminated, true));
        // A backward pass toward the defender brings them back into play
        assert!(is_eligible(&covered[0], Vec2::new(60.0, 34.0), Vec2::new(35.0, 30.0), &eliminated, true));
        // Not eliminated: always eligible
        assert!(is_eligible(&covered[0], Vec2::new(60.0, 34.0), Vec2::new(70.0, 30.0), &BTreeSet::new(), true));
    }

    #[test]
    fn test_distance_factor_table() {
        assert_eq!(distance_factor(2.0), 0.95);
        assert!((distance_factor(12.5) - 0.875).abs() < 1e-5);
        assert!((distance_factor(40.0) - 0.48).abs() < 1e-5);
        assert!((distance_factor(50.0) - 0.40).abs() < 1e-5);
        assert_eq!(distance_factor(200.0), LONG_PASS_FLOOR);
    }

    #[test]
    fn test_angle_factor() {
        assert!((angle_factor(Vec2::new(1.0, 0.0), true, 0.1) - 1.0).abs() < 1e-6);
        assert!((angle_factor(Vec2::new(-1.0, 0.0), true, 0.1) - 0.9).abs() < 1e-6);
        assert!((angle_factor(Vec2::new(-1.0, 0.0), false, 0.1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_receiver_factor_defaults() {
        assert_eq!(receiver_factor(None, 0.78, 0.5), 1.0);
        assert!((receiver_factor(Some(0.88), 0.78, 0.5) - 1.05).abs() < 1e-5);
        assert_eq!(receiver_factor(Some(f32::NAN), 0.78, 0.5), 1.0);
    }

    #[test]
    fn test_completion_clamped() {
        assert_eq!(completion_probability(0.0, 1.0, 1.0, 1.5), 1.0);
        assert_eq!(completion_probability(1.0, 0.9, 1.0, 1.0), 0.0);
        assert_eq!(completion_probability(f32::NAN, 0.9, 1.0, 1.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_closed_form_beats_sampling(
            ax in 0.0f32..105.0, ay in 0.0f32..68.0,
            bx in 0.0f32..105.0, by in 0.0f32..68.0,
            dx in 0.0f32..105.0, dy in 0.0f32..68.0,
            speed in 3.0f32..12.0,
            ball_speed in 5.0f32..25.0,
        ) {
            let zone = zone_at(dx, dy, speed);
            let (a, b) = (Vec2::new(ax, ay), Vec2::new(bx, by));
            let (best, _) = max_lead(a, b, ball_speed, &zone);
            let length = a.distance(b);
            for i in 0..=100 {
                let u = length * i as f32 / 100.0;
                let point = if length > 0.0 { a + (b - a) * (u / length) } else { a };
                let lead = u / ball_speed - (zone.reaction_time_s + zone.center.distance(point) / speed);
                prop_assert!(best >= lead - 1e-3, "closed form {best} below sample {lead}");
            }
        }

        #[test]
        fn prop_probability_monotone_and_bounded(l1 in -5.0f32..5.0, l2 in -5.0f32..5.0) {
            let m = model();
            let (lo, hi) = if l1 <= l2 { (l1, l2) } else { (l2, l1) };
            let (p_lo, p_hi) = (m.probability_from_lead(lo), m.probability_from_lead(hi));
            prop_assert!(p_lo <= p_hi);
            prop_assert!((0.0..=1.0).contains(&p_lo) && (0.0..=1.0).contains(&p_hi));
        }

        #[test]
        fn prop_distance_factor_non_increasing(d1 in 0.0f32..120.0, d2 in 0.0f32..120.0) {
            let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(distance_factor(lo) >= distance_factor(hi) - 1e-6);
        }
    }
}
