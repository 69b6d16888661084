//! Elimination: has the ball gone past a defender beyond their recoverable range?
//!
//! The ball is projected `h_elim` ahead (`P = ball + v × h_elim`, v = ball velocity when the
//! ball moves, else the carrier's). A defending field player is eliminated when the ball is
//! already closer to the defended goal than they are and P lies outside their coverage
//! zone at `h_elim` by more than ε. Margins within ε favour the defence.

use serde::Serialize;

use super::config::PhysicalConfig;
use super::coverage::{CoverageZone, Covered};
use super::frame::TrackId;
use super::geometry::{clamp_to_pitch, depth_from_attacked_goal, Vec2};
use super::validation::FrameContext;

/// Ball speeds at or below this count as a stationary ball (m/s)
pub const STATIONARY_BALL_SPEED_MPS: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliminationStatus {
    pub track_id: TrackId,
    pub eliminated: bool,
    /// Ball already closer to the defended goal than this defender
    pub behind_play: bool,
    /// Distance to the projected ball minus reach (m); positive = out of reach
    pub margin_m: f32,
    /// Teammate best placed to cover for an eliminated defender
    pub recoverable_by: Option<TrackId>,
}

#[derive(Debug, Clone)]
pub struct EliminationCalculator {
    horizon_s: f32,
    epsilon_m: f32,
}

impl EliminationCalculator {
    pub fn new(config: &PhysicalConfig) -> Self {
        Self { horizon_s: config.elimination_horizon_s, epsilon_m: config.elimination_epsilon_m }
    }

    pub fn horizon_s(&self) -> f32 {
        self.horizon_s
    }

    /// Where the ball is expected to be after `h_elim`.
    pub fn projected_ball(&self, ctx: &FrameContext<'_>) -> Vec2 {
        let velocity = if ctx.ball.velocity.length() > STATIONARY_BALL_SPEED_MPS {
            ctx.ball.velocity
        } else {
            ctx.carrier_entity().map(|c| c.velocity).unwrap_or(Vec2::ZERO)
        };
        clamp_to_pitch(ctx.ball.position + velocity * self.horizon_s)
    }

    /// `attacks_right` is the attacking team's direction.
    #[inline]
    pub fn is_behind_play(ball: Vec2, defender: Vec2, attacks_right: bool) -> bool {
        depth_from_attacked_goal(ball, attacks_right) < depth_from_attacked_goal(defender, attacks_right)
    }

    /// **Returns**: `(behind_play, margin_m, eliminated)`
    pub fn classify(
        &self,
        zone: &CoverageZone,
        ball: Vec2,
        projected: Vec2,
        attacks_right: bool,
    ) -> (bool, f32, bool) {
        let behind = Self::is_behind_play(ball, zone.center, attacks_right);
        let margin = zone.center.distance(projected) - zone.radius_at(self.horizon_s);
        (behind, margin, behind && margin > self.epsilon_m)
    }

    /// One status per defending field player, in input order.
    pub fn evaluate(&self, ctx: &FrameContext<'_>, defenders: &[Covered<'_>]) -> Vec<EliminationStatus> {
        let projected = self.projected_ball(ctx);

        defenders
            .iter()
            .filter(|d| d.is_field_player())
            .map(|d| {
                let (behind_play, margin_m, eliminated) =
                    self.classify(&d.zone, ctx.ball.position, projected, ctx.attacks_right);
                let recoverable_by =
                    if eliminated { self.best_cover(d.track_id(), defenders, projected) } else { None };
                EliminationStatus { track_id: d.track_id(), eliminated, behind_play, margin_m, recoverable_by }
            })
            .collect()
    }

    /// Teammate (goalkeeper included) reaching `point` with the largest slack; ties to lower id.
    fn best_cover(&self, exclude: TrackId, defenders: &[Covered<'_>], point: Vec2) -> Option<TrackId> {
        defenders
            .iter()
            .filter(|d| d.track_id() != exclude)
            .map(|d| (d.zone.slack(point, self.horizon_s), d.track_id()))
            .filter(|(slack, _)| *slack >= 0.0)
            .max_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, id)| id)
    }
}

/// Eliminated share of defending field players; 0 when there are none.
pub fn elimination_ratio(statuses: &[EliminationStatus]) -> f32 {
    if statuses.is_empty() {
        return 0.0;
    }
    let eliminated = statuses.iter().filter(|s| s.eliminated).count();
    eliminated as f32 / statuses.len() as f32
}
