//! Frame validation and per-frame evaluation context.
//!
//! Malformed frames are rejected with a [`MalformedReason`]; implausible kinematics are
//! clamped and recorded as [`FrameDiagnostic`]s so evaluation can proceed.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use super::config::PhysicalConfig;
use super::frame::{Ball, Entity, Frame, Team, TrackId};
use super::geometry::{within_extended_bounds, Vec2};
use crate::error::{FrameError, MalformedReason, Result};

/// Recoverable data problems found while validating a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameDiagnostic {
    /// Speed above the plausible maximum, scaled down
    SpeedClamped { track_id: TrackId, observed_mps: f32, clamped_mps: f32 },
    /// Velocity not finite, treated as standing still
    NonFiniteVelocity { track_id: TrackId },
    /// Reported sprint speed unusable, ignored
    InvalidSprintSpeed { track_id: TrackId },
    /// Ball velocity not finite, treated as stationary
    NonFiniteBallVelocity,
    /// No explicit possession; taken from the player nearest the ball
    PossessionInferred { team: Team, nearest: TrackId },
    /// Possessor belongs to the other team than the explicit possession flag
    PossessorConflict { track_id: TrackId, possession_team: Team },
}

/// Validated view of one frame. Owned by a single evaluation and dropped with it.
#[derive(Debug, Clone)]
pub struct FrameContext<'f> {
    pub frame: &'f Frame,
    /// Frame entities with kinematics clamped, in frame order
    pub entities: Vec<Entity>,
    pub ball: Ball,
    pub attacking_team: Team,
    /// Attack direction of `attacking_team`
    pub attacks_right: bool,
    pub carrier: Option<TrackId>,
    pub diagnostics: Vec<FrameDiagnostic>,
}

impl<'f> FrameContext<'f> {
    pub fn validate(frame: &'f Frame, config: &PhysicalConfig) -> Result<Self> {
        let reject = |reason| Err(FrameError::malformed(frame.index, reason));

        if !frame.timestamp_s.is_finite() {
            return reject(MalformedReason::NonFiniteTimestamp);
        }
        let Some(ball) = frame.ball.as_ref() else {
            return reject(MalformedReason::MissingBall);
        };
        if frame.entities.len() < config.min_entities {
            return reject(MalformedReason::TooFewEntities {
                found: frame.entities.len(),
                required: config.min_entities,
            });
        }

        let mut seen = BTreeSet::new();
        for entity in &frame.entities {
            check_position(entity.position, Some(entity.track_id), config.bounds_tolerance_m)
                .map_err(|reason| FrameError::malformed(frame.index, reason))?;
            if !seen.insert(entity.track_id) {
                return reject(MalformedReason::DuplicateTrackId { track_id: entity.track_id });
            }
        }
        check_position(ball.position, None, config.bounds_tolerance_m)
            .map_err(|reason| FrameError::malformed(frame.index, reason))?;

        for team in [Team::A, Team::B] {
            if frame.team(team).next().is_none() {
                return reject(MalformedReason::EmptyTeam { team });
            }
        }
        if let Some(possessor) = ball.possessor {
            if !seen.contains(&possessor) {
                return reject(MalformedReason::UnknownPossessor { track_id: possessor });
            }
        }

        let mut diagnostics = Vec::new();
        let entities: Vec<Entity> = frame
            .entities
            .iter()
            .map(|e| clamp_kinematics(e, config.max_plausible_speed_mps, &mut diagnostics))
            .collect();

        let mut ball = ball.clone();
        if !ball.velocity.is_finite() {
            debug!(frame = frame.index, "non-finite ball velocity, treating ball as stationary");
            ball.velocity = Vec2::ZERO;
            diagnostics.push(FrameDiagnostic::NonFiniteBallVelocity);
        }

        let attacking_team = resolve_possession(frame, &ball, &entities, &mut diagnostics);
        let carrier = resolve_carrier(&ball, &entities, attacking_team, config.possession_radius_m);

        Ok(Self {
            frame,
            entities,
            ball,
            attacking_team,
            attacks_right: frame.attacks_right(attacking_team),
            carrier,
            diagnostics,
        })
    }

    #[inline]
    pub fn defending_team(&self) -> Team {
        self.attacking_team.opponent()
    }

    pub fn attackers(&self) -> impl Iterator<Item = &Entity> {
        let team = self.attacking_team;
        self.entities.iter().filter(move |e| e.team == team)
    }

    pub fn defenders(&self) -> impl Iterator<Item = &Entity> {
        let team = self.defending_team();
        self.entities.iter().filter(move |e| e.team == team)
    }

    pub fn entity(&self, track_id: TrackId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.track_id == track_id)
    }

    pub fn carrier_entity(&self) -> Option<&Entity> {
        self.carrier.and_then(|id| self.entity(id))
    }
}

fn check_position(
    pos: Vec2,
    track_id: Option<TrackId>,
    tolerance_m: f32,
) -> std::result::Result<(), MalformedReason> {
    if !pos.is_finite() {
        return Err(MalformedReason::NonFiniteCoordinate { track_id });
    }
    if !within_extended_bounds(pos, tolerance_m) {
        return Err(MalformedReason::OutOfBounds { track_id, x: pos.x, y: pos.y });
    }
    Ok(())
}

fn clamp_kinematics(
    entity: &Entity,
    max_speed_mps: f32,
    diagnostics: &mut Vec<FrameDiagnostic>,
) -> Entity {
    let mut entity = entity.clone();
    let track_id = entity.track_id;

    if !entity.velocity.is_finite() {
        debug!(%track_id, "non-finite velocity, treating player as standing");
        entity.velocity = Vec2::ZERO;
        diagnostics.push(FrameDiagnostic::NonFiniteVelocity { track_id });
    } else {
        let observed = entity.speed();
        if observed > max_speed_mps {
            debug!(%track_id, observed, max_speed_mps, "implausible speed clamped");
            entity.velocity = entity.velocity.clamp_length(max_speed_mps);
            diagnostics.push(FrameDiagnostic::SpeedClamped {
                track_id,
                observed_mps: observed,
                clamped_mps: max_speed_mps,
            });
        }
    }

    if let Some(sprint) = entity.max_speed_mps {
        if !sprint.is_finite() || sprint <= 0.0 {
            entity.max_speed_mps = None;
            diagnostics.push(FrameDiagnostic::InvalidSprintSpeed { track_id });
        }
    }
    entity
}

/// Explicit flag, else the possessor's team, else the team of the player nearest the ball.
fn resolve_possession(
    frame: &Frame,
    ball: &Ball,
    entities: &[Entity],
    diagnostics: &mut Vec<FrameDiagnostic>,
) -> Team {
    let possessor_team = ball
        .possessor
        .and_then(|id| entities.iter().find(|e| e.track_id == id))
        .map(|e| (e.track_id, e.team));

    if let Some(team) = frame.possession {
        if let Some((track_id, possessor_team)) = possessor_team {
            if possessor_team != team {
                diagnostics.push(FrameDiagnostic::PossessorConflict {
                    track_id,
                    possession_team: team,
                });
            }
        }
        return team;
    }
    if let Some((_, team)) = possessor_team {
        return team;
    }

    // Validation guarantees at least one entity per team
    let nearest = entities.iter().min_by(|a, b| {
        a.position
            .distance(ball.position)
            .total_cmp(&b.position.distance(ball.position))
            .then(a.track_id.cmp(&b.track_id))
    });
    match nearest {
        Some(e) => {
            diagnostics.push(FrameDiagnostic::PossessionInferred { team: e.team, nearest: e.track_id });
            e.team
        }
        None => Team::A,
    }
}

/// The possessor when it plays for the attacking team, else the nearest attacker within
/// `radius_m` of the ball.
fn resolve_carrier(
    ball: &Ball,
    entities: &[Entity],
    attacking_team: Team,
    radius_m: f32,
) -> Option<TrackId> {
    if let Some(id) = ball.possessor {
        return entities
            .iter()
            .find(|e| e.track_id == id && e.team == attacking_team)
            .map(|e| e.track_id);
    }
    entities
        .iter()
        .filter(|e| e.team == attacking_team)
        .map(|e| (e.position.distance(ball.position), e.track_id))
        .filter(|(d, _)| *d <= radius_m)
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_frame() -> Frame {
        Frame::new(5, 12.4)
            .with_entity(Entity::field(1, Team::A, 50.0, 34.0))
            .with_entity(Entity::field(2, Team::A, 40.0, 20.0))
            .with_entity(Entity::field(10, Team::B, 60.0, 30.0))
            .with_entity(Entity::goalkeeper(11, Team::B, 100.0, 34.0))
            .with_ball(Ball::at(50.5, 34.0).possessed_by(1))
    }

    fn reason(err: FrameError) -> MalformedReason {
        match err {
            FrameError::Malformed { reason, .. } => reason,
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_frame() {
        let frame = base_frame();
        let ctx = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap();
        assert_eq!(ctx.attacking_team, Team::A);
        assert!(ctx.attacks_right);
        assert_eq!(ctx.carrier, Some(TrackId(1)));
        assert_eq!(ctx.defenders().count(), 2);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_ball_rejected() {
        let mut frame = base_frame();
        frame.ball = None;
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(err.frame_index(), 5);
        assert_eq!(reason(err), MalformedReason::MissingBall);
    }

    #[test]
    fn test_too_few_entities() {
        let frame = Frame::new(0, 0.0)
            .with_entity(Entity::field(1, Team::A, 50.0, 34.0))
            .with_ball(Ball::at(50.0, 34.0));
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(reason(err), MalformedReason::TooFewEntities { found: 1, required: 2 });
    }

    #[test]
    fn test_one_sided_frame() {
        let frame = Frame::new(0, 0.0)
            .with_entity(Entity::field(1, Team::A, 50.0, 34.0))
            .with_entity(Entity::field(2, Team::A, 55.0, 34.0))
            .with_ball(Ball::at(50.0, 34.0));
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(reason(err), MalformedReason::EmptyTeam { team: Team::B });
    }

    #[test]
    fn test_out_of_bounds_and_non_finite() {
        let mut frame = base_frame();
        frame.entities[1].position = Vec2::new(-6.0, 20.0);
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert!(matches!(reason(err), MalformedReason::OutOfBounds { track_id: Some(TrackId(2)), .. }));

        // Within tolerance is accepted
        frame.entities[1].position = Vec2::new(-4.0, 20.0);
        assert!(FrameContext::validate(&frame, &PhysicalConfig::default()).is_ok());

        frame.entities[1].position = Vec2::new(f32::NAN, 20.0);
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(reason(err), MalformedReason::NonFiniteCoordinate { track_id: Some(TrackId(2)) });
    }

    #[test]
    fn test_ball_out_of_bounds() {
        let mut frame = base_frame();
        frame.ball = Some(Ball::at(120.0, 34.0));
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert!(matches!(reason(err), MalformedReason::OutOfBounds { track_id: None, .. }));
    }

    #[test]
    fn test_duplicate_and_unknown_ids() {
        let frame = base_frame().with_entity(Entity::field(2, Team::B, 70.0, 30.0));
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(reason(err), MalformedReason::DuplicateTrackId { track_id: TrackId(2) });

        let mut frame = base_frame();
        frame.ball = Some(Ball::at(50.0, 34.0).possessed_by(99));
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(reason(err), MalformedReason::UnknownPossessor { track_id: TrackId(99) });
    }

    #[test]
    fn test_bad_timestamp() {
        let mut frame = base_frame();
        frame.timestamp_s = f64::NAN;
        let err = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap_err();
        assert_eq!(reason(err), MalformedReason::NonFiniteTimestamp);
    }

    #[test]
    fn test_implausible_speed_clamped() {
        let mut frame = base_frame();
        frame.entities[2].velocity = Vec2::new(30.0, 40.0);
        frame.entities[3].velocity = Vec2::new(f32::INFINITY, 0.0);
        let config = PhysicalConfig::default();
        let ctx = FrameContext::validate(&frame, &config).unwrap();

        assert!((ctx.entities[2].speed() - config.max_plausible_speed_mps).abs() < 1e-4);
        assert_eq!(ctx.entities[3].velocity, Vec2::ZERO);
        assert_eq!(ctx.diagnostics.len(), 2);
        assert!(matches!(ctx.diagnostics[0], FrameDiagnostic::SpeedClamped { track_id: TrackId(10), .. }));
        // Input frame untouched
        assert_eq!(frame.entities[2].velocity, Vec2::new(30.0, 40.0));
    }

    #[test]
    fn test_possession_inference() {
        // No possessor, no flag: nearest player decides
        let mut frame = base_frame();
        frame.ball = Some(Ball::at(59.0, 30.0));
        let ctx = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap();
        assert_eq!(ctx.attacking_team, Team::B);
        assert!(!ctx.attacks_right);
        assert_eq!(ctx.carrier, Some(TrackId(10)));
        assert!(matches!(ctx.diagnostics[0], FrameDiagnostic::PossessionInferred { team: Team::B, .. }));

        // Explicit flag wins, the opposing possessor is not a carrier
        let frame = base_frame().with_possession(Team::B);
        let ctx = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap();
        assert_eq!(ctx.attacking_team, Team::B);
        assert_eq!(ctx.carrier, None);
        assert!(matches!(ctx.diagnostics[0], FrameDiagnostic::PossessorConflict { .. }));
    }

    #[test]
    fn test_loose_ball_has_no_carrier() {
        let mut frame = base_frame().with_possession(Team::A);
        frame.ball = Some(Ball::at(45.0, 27.0));
        let ctx = FrameContext::validate(&frame, &PhysicalConfig::default()).unwrap();
        assert_eq!(ctx.carrier, None);
    }
}
