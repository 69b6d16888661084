//! Coverage model: how much ground a player can reach within a time horizon.
//!
//! Reach is approximated by a circle around the current position:
//! `radius(h) = speed × max(0, h − reaction_time)`.

use serde::Serialize;

use super::config::PhysicalConfig;
use super::frame::{Entity, Role, TrackId};
use super::geometry::Vec2;
use super::priors::PlayerPriors;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonRadius {
    pub horizon_s: f32,
    pub radius_m: f32,
}

/// Reachable area of one player, recomputed every frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageZone {
    pub track_id: TrackId,
    pub center: Vec2,
    pub reach_speed_mps: f32,
    pub reaction_time_s: f32,
    /// One radius per configured horizon
    pub radii: Vec<HorizonRadius>,
}

impl CoverageZone {
    /// Radius at any horizon, not only the configured ones.
    #[inline]
    pub fn radius_at(&self, horizon_s: f32) -> f32 {
        self.reach_speed_mps * (horizon_s - self.reaction_time_s).max(0.0)
    }

    /// Radius minus distance: positive when `point` is reachable with time to spare.
    #[inline]
    pub fn slack(&self, point: Vec2, horizon_s: f32) -> f32 {
        self.radius_at(horizon_s) - self.center.distance(point)
    }

    #[inline]
    pub fn covers(&self, point: Vec2, horizon_s: f32) -> bool {
        self.center.distance(point) <= self.radius_at(horizon_s)
    }

    /// Earliest arrival at `point`: reaction plus straight-line run.
    pub fn time_to_reach(&self, point: Vec2) -> f32 {
        if self.reach_speed_mps <= 0.0 {
            return f32::INFINITY;
        }
        self.reaction_time_s + self.center.distance(point) / self.reach_speed_mps
    }
}

/// A player together with their zone for this frame.
#[derive(Debug, Clone)]
pub struct Covered<'a> {
    pub entity: &'a Entity,
    pub zone: CoverageZone,
}

impl Covered<'_> {
    #[inline]
    pub fn track_id(&self) -> TrackId {
        self.entity.track_id
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.entity.position
    }

    #[inline]
    pub fn is_field_player(&self) -> bool {
        self.entity.role == Role::Field
    }
}

#[derive(Debug, Clone)]
pub struct CoverageModel {
    reaction_time_s: f32,
    horizons_s: Vec<f32>,
    max_plausible_speed_mps: f32,
    default_sprint_speed_mps: f32,
}

impl CoverageModel {
    pub fn new(config: &PhysicalConfig) -> Self {
        Self {
            reaction_time_s: config.reaction_time_s,
            horizons_s: config.coverage_horizons_s.clone(),
            max_plausible_speed_mps: config.max_plausible_speed_mps,
            default_sprint_speed_mps: config.default_sprint_speed_mps,
        }
    }

    /// Missing (non-finite) speed clamps to the maximum instead of failing.
    #[inline]
    pub fn clamp_speed(&self, speed_mps: f32) -> f32 {
        if speed_mps.is_finite() {
            speed_mps.clamp(0.0, self.max_plausible_speed_mps)
        } else {
            self.max_plausible_speed_mps
        }
    }

    #[inline]
    pub fn reachable_radius(&self, speed_mps: f32, horizon_s: f32) -> f32 {
        self.clamp_speed(speed_mps) * (horizon_s - self.reaction_time_s).max(0.0)
    }

    /// Larger of current speed and sprint speed (frame → priors → default), clamped.
    pub fn reach_speed(&self, entity: &Entity, priors: &dyn PlayerPriors) -> f32 {
        let sprint = entity
            .max_speed_mps
            .or_else(|| priors.max_speed_mps(entity.track_id))
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(self.default_sprint_speed_mps);
        self.clamp_speed(entity.speed().max(sprint))
    }

    pub fn zone_with_speed(&self, entity: &Entity, reach_speed_mps: f32) -> CoverageZone {
        let speed = self.clamp_speed(reach_speed_mps);
        CoverageZone {
            track_id: entity.track_id,
            center: entity.position,
            reach_speed_mps: speed,
            reaction_time_s: self.reaction_time_s,
            radii: self
                .horizons_s
                .iter()
                .map(|&h| HorizonRadius { horizon_s: h, radius_m: self.reachable_radius(speed, h) })
                .collect(),
        }
    }

    pub fn zone_for(&self, entity: &Entity, priors: &dyn PlayerPriors) -> CoverageZone {
        self.zone_with_speed(entity, self.reach_speed(entity, priors))
    }

    pub fn cover<'a>(
        &self,
        entities: impl IntoIterator<Item = &'a Entity>,
        priors: &dyn PlayerPriors,
    ) -> Vec<Covered<'a>> {
        entities
            .into_iter()
            .map(|entity| Covered { entity, zone: self.zone_for(entity, priors) })
            .collect()
    }
}
