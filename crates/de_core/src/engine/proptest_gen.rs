//! Proptest strategies for frames.
//!
//! Coordinates and velocities sit on a 0.5 grid so that mirroring a frame is exact in f32.

use proptest::prelude::*;

use super::frame::{Ball, Entity, Frame, Role, Team, TrackId};
use super::geometry::Vec2;
use super::physics_constants::field;

fn grid(max: f32) -> impl Strategy<Value = f32> {
    (0u32..=(max * 2.0) as u32).prop_map(|v| v as f32 * 0.5)
}

pub fn arb_position() -> impl Strategy<Value = Vec2> {
    (grid(field::LENGTH_M), grid(field::WIDTH_M)).prop_map(|(x, y)| Vec2::new(x, y))
}

/// Up to 8 m/s per axis, below the plausible maximum in any direction.
pub fn arb_velocity() -> impl Strategy<Value = Vec2> {
    (-16i32..=16, -16i32..=16).prop_map(|(x, y)| Vec2::new(x as f32 * 0.5, y as f32 * 0.5))
}

fn arb_players() -> impl Strategy<Value = Vec<(Vec2, Vec2)>> {
    prop::collection::vec((arb_position(), arb_velocity()), 2..=6)
}

fn build_team(team: Team, first_id: u32, players: Vec<(Vec2, Vec2)>) -> Vec<Entity> {
    players
        .into_iter()
        .enumerate()
        .map(|(i, (position, velocity))| Entity {
            track_id: TrackId(first_id + i as u32),
            team,
            role: if i == 0 { Role::Goalkeeper } else { Role::Field },
            position,
            velocity,
            jersey: Some(i as u8 + 1),
            name: None,
            max_speed_mps: None,
        })
        .collect()
}

/// Valid frame with 2-6 players per side (first of each is the goalkeeper).
pub fn arb_frame() -> impl Strategy<Value = Frame> {
    (
        arb_players(),
        arb_players(),
        any::<bool>(),
        prop::option::of(0usize..12),
        arb_position(),
        arb_velocity(),
        0u64..10_000,
    )
        .prop_map(|(team_a, team_b, a_attacks_right, possessor, loose_ball, ball_velocity, index)| {
            let mut entities = build_team(Team::A, 1, team_a);
            entities.extend(build_team(Team::B, 101, team_b));

            let ball = match possessor {
                Some(i) => {
                    let carrier = &entities[i % entities.len()];
                    Ball {
                        position: carrier.position,
                        height_m: None,
                        velocity: Vec2::ZERO,
                        possessor: Some(carrier.track_id),
                    }
                }
                None => Ball { position: loose_ball, height_m: None, velocity: ball_velocity, possessor: None },
            };

            Frame {
                index,
                timestamp_s: index as f64 * 0.04,
                entities,
                ball: Some(ball),
                team_a_attacks_right: a_attacks_right,
                possession: None,
            }
        })
}
