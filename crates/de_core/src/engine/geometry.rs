//! Pitch geometry: vectors, distances, angles, zones and attack-direction helpers.
//!
//! All positions are pitch meters with the origin at a corner (x ∈ [0,105], y ∈ [0,68]).
//! Direction-dependent helpers take `attacks_right`:
//! - attacks_right=true: attacked goal at x=105m
//! - attacks_right=false: attacked goal at x=0m
//!
//! "Team view" rotates the pitch 180° for a team attacking left so the attacked goal is
//! always at x=105m. Rotation (not a single-axis flip) keeps left/right relative to the
//! attack direction intact, which is what mirroring two teams requires.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use super::physics_constants::{field, zones};

/// 2D vector in pitch meters (positions) or m/s (velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len > 1e-6 && len.is_finite() {
            Some(Vec2::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Rotate counter-clockwise by `angle_rad`.
    pub fn rotated(self, angle_rad: f32) -> Vec2 {
        let (sin, cos) = angle_rad.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Same direction, length capped at `max_len`.
    pub fn clamp_length(self, max_len: f32) -> Vec2 {
        let len = self.length();
        if len > max_len && len > 0.0 {
            self * (max_len / len)
        } else {
            self
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ============================================================
// Primitives
// ============================================================

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unsigned angle between two vectors in radians, [0, π].
/// Zero vectors give 0.
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let denom = a.length() * b.length();
    if denom <= 1e-9 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Projection of `p` onto segment a→b.
///
/// **Returns**: `(t, closest)` where `t` ∈ [0,1] is the parameter of the closest point.
/// A degenerate segment projects everything onto `a`.
pub fn project_onto_segment(p: Vec2, a: Vec2, b: Vec2) -> (f32, Vec2) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-9 {
        return (0.0, a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (t, a + ab * t)
}

pub fn point_to_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let (_, closest) = project_onto_segment(p, a, b);
    p.distance(closest)
}

// ============================================================
// Attack direction
// ============================================================

/// Unit vector pointing toward the attacked goal.
#[inline]
pub fn attack_direction(attacks_right: bool) -> Vec2 {
    if attacks_right {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(-1.0, 0.0)
    }
}

/// Center of the goal mouth this team attacks.
#[inline]
pub fn attacked_goal(attacks_right: bool) -> Vec2 {
    if attacks_right {
        Vec2::new(field::LENGTH_M, field::CENTER_Y)
    } else {
        Vec2::new(0.0, field::CENTER_Y)
    }
}

/// Center of the goal mouth this team defends.
#[inline]
pub fn defended_goal(attacks_right: bool) -> Vec2 {
    attacked_goal(!attacks_right)
}

/// Position as seen by a team that always attacks toward x=105m.
#[inline]
pub fn team_view(pos: Vec2, attacks_right: bool) -> Vec2 {
    if attacks_right {
        pos
    } else {
        mirror_position(pos)
    }
}

/// Rotate a position 180° about the center spot.
#[inline]
pub fn mirror_position(pos: Vec2) -> Vec2 {
    Vec2::new(field::LENGTH_M - pos.x, field::WIDTH_M - pos.y)
}

/// Velocities follow the same rotation as positions.
#[inline]
pub fn mirror_velocity(vel: Vec2) -> Vec2 {
    -vel
}

/// Distance along the length from the goal line of the team attacking in `attacks_right`
/// direction (its own goal line).
#[inline]
pub fn depth_from_own_goal(pos: Vec2, attacks_right: bool) -> f32 {
    team_view(pos, attacks_right).x
}

/// Distance along the length from the goal line that a team attacking in
/// `attacks_right` direction is trying to reach. Defenders of that goal measure
/// their own depth this way.
#[inline]
pub fn depth_from_attacked_goal(pos: Vec2, attacks_right: bool) -> f32 {
    field::LENGTH_M - team_view(pos, attacks_right).x
}

#[inline]
pub fn distance_to_attacked_goal(pos: Vec2, attacks_right: bool) -> f32 {
    pos.distance(attacked_goal(attacks_right))
}

// ============================================================
// Zones
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchThird {
    Defensive,
    Middle,
    Attacking,
}

/// Third of the pitch relative to the team's attack direction.
pub fn third_of(pos: Vec2, attacks_right: bool) -> PitchThird {
    let depth = depth_from_own_goal(pos, attacks_right);
    if depth < field::THIRD_LENGTH_M {
        PitchThird::Defensive
    } else if depth < 2.0 * field::THIRD_LENGTH_M {
        PitchThird::Middle
    } else {
        PitchThird::Attacking
    }
}

#[inline]
pub fn is_in_opponent_half(pos: Vec2, attacks_right: bool) -> bool {
    depth_from_own_goal(pos, attacks_right) > field::CENTER_X
}

/// Inside the penalty area this team attacks.
pub fn is_in_penalty_area(pos: Vec2, attacks_right: bool) -> bool {
    let tv = team_view(pos, attacks_right);
    tv.x >= field::LENGTH_M - field::PENALTY_AREA_LENGTH_M
        && (tv.y - field::CENTER_Y).abs() <= field::PENALTY_AREA_HALF_WIDTH_M
}

/// Shots are only considered from here.
pub fn is_in_shooting_zone(pos: Vec2, attacks_right: bool) -> bool {
    let tv = team_view(pos, attacks_right);
    distance_to_attacked_goal(pos, attacks_right) <= zones::SHOOTING_ZONE_MAX_DIST_M
        && (tv.y - field::CENTER_Y).abs() <= zones::SHOOTING_ZONE_HALF_WIDTH_M
}

/// Vertical channel, named from the attacking team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    LeftWing,
    LeftHalfSpace,
    Central,
    RightHalfSpace,
    RightWing,
}

pub fn channel_of(pos: Vec2, attacks_right: bool) -> Channel {
    // Facing +x in team view, +y is on the left.
    let offset = team_view(pos, attacks_right).y - field::CENTER_Y;
    let lateral = offset.abs();
    let left = offset > 0.0;
    if lateral <= field::GOAL_AREA_HALF_WIDTH_M {
        Channel::Central
    } else if lateral <= field::PENALTY_AREA_HALF_WIDTH_M {
        if left {
            Channel::LeftHalfSpace
        } else {
            Channel::RightHalfSpace
        }
    } else if left {
        Channel::LeftWing
    } else {
        Channel::RightWing
    }
}

#[inline]
pub fn is_in_half_space(pos: Vec2) -> bool {
    matches!(channel_of(pos, true), Channel::LeftHalfSpace | Channel::RightHalfSpace)
}

// ============================================================
// Bounds
// ============================================================

/// Inside the pitch extended by `tolerance_m` on every side.
pub fn within_extended_bounds(pos: Vec2, tolerance_m: f32) -> bool {
    pos.x >= -tolerance_m
        && pos.x <= field::LENGTH_M + tolerance_m
        && pos.y >= -tolerance_m
        && pos.y <= field::WIDTH_M + tolerance_m
}

pub fn clamp_to_pitch(pos: Vec2) -> Vec2 {
    Vec2::new(pos.x.clamp(0.0, field::LENGTH_M), pos.y.clamp(0.0, field::WIDTH_M))
}
