//! Per-frame snapshot: tracked entities and the ball.
//!
//! A `Frame` is what the tracking layer hands over. It is never modified by the engine;
//! validation produces a separate [`FrameContext`](super::validation::FrameContext).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Vec2;

/// Stable tracker id of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Field,
    Goalkeeper,
}

/// One tracked player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub track_id: TrackId,
    pub team: Team,
    pub role: Role,
    /// Pitch meters
    pub position: Vec2,
    /// m/s
    pub velocity: Vec2,
    pub jersey: Option<u8>,
    pub name: Option<String>,
    /// Observed sprint speed, when the tracking layer knows it
    pub max_speed_mps: Option<f32>,
}

impl Entity {
    pub fn new(track_id: u32, team: Team, role: Role, position: Vec2) -> Self {
        Self {
            track_id: TrackId(track_id),
            team,
            role,
            position,
            velocity: Vec2::ZERO,
            jersey: None,
            name: None,
            max_speed_mps: None,
        }
    }

    pub fn field(track_id: u32, team: Team, x: f32, y: f32) -> Self {
        Self::new(track_id, team, Role::Field, Vec2::new(x, y))
    }

    pub fn goalkeeper(track_id: u32, team: Team, x: f32, y: f32) -> Self {
        Self::new(track_id, team, Role::Goalkeeper, Vec2::new(x, y))
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.velocity = Vec2::new(vx, vy);
        self
    }

    pub fn with_max_speed(mut self, max_speed_mps: f32) -> Self {
        self.max_speed_mps = Some(max_speed_mps);
        self
    }

    pub fn with_jersey(mut self, jersey: u8) -> Self {
        self.jersey = Some(jersey);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn is_goalkeeper(&self) -> bool {
        self.role == Role::Goalkeeper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec2,
    /// Height above the pitch (meters), when tracked
    pub height_m: Option<f32>,
    pub velocity: Vec2,
    pub possessor: Option<TrackId>,
}

impl Ball {
    pub fn at(x: f32, y: f32) -> Self {
        Self { position: Vec2::new(x, y), height_m: None, velocity: Vec2::ZERO, possessor: None }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.velocity = Vec2::new(vx, vy);
        self
    }

    pub fn possessed_by(mut self, track_id: u32) -> Self {
        self.possessor = Some(TrackId(track_id));
        self
    }
}

/// Immutable per-frame snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: u64,
    pub timestamp_s: f64,
    pub entities: Vec<Entity>,
    /// `None` only so that a frame without a ball can be reported as malformed
    pub ball: Option<Ball>,
    /// Team A attacks toward x=105m when true
    pub team_a_attacks_right: bool,
    /// Explicit possession, overriding inference from the ball
    pub possession: Option<Team>,
}

impl Frame {
    pub fn new(index: u64, timestamp_s: f64) -> Self {
        Self {
            index,
            timestamp_s,
            entities: Vec::new(),
            ball: None,
            team_a_attacks_right: true,
            possession: None,
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_entities(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.entities.extend(entities);
        self
    }

    pub fn with_ball(mut self, ball: Ball) -> Self {
        self.ball = Some(ball);
        self
    }

    pub fn with_possession(mut self, team: Team) -> Self {
        self.possession = Some(team);
        self
    }

    pub fn with_team_a_attacking_right(mut self, attacks_right: bool) -> Self {
        self.team_a_attacks_right = attacks_right;
        self
    }

    /// Attack direction of `team` in this frame.
    pub fn attacks_right(&self, team: Team) -> bool {
        match team {
            Team::A => self.team_a_attacks_right,
            Team::B => !self.team_a_attacks_right,
        }
    }

    pub fn entity(&self, track_id: TrackId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.track_id == track_id)
    }

    pub fn team(&self, team: Team) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.team == team)
    }
}
