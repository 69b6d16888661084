//! # Analysis Module
//!
//! Match-level views over a sequence of frame reports.
//!
//! - `summary` - Counts, score statistics, block distribution
//! - `decision_quality` - Grading the action actually taken against the best option
//! - `key_moments` - Most dangerous frames and the best and worst decisions

pub mod decision_quality;
pub mod key_moments;
pub mod summary;

pub use decision_quality::{
    assess_decision, review_decisions, ActualAction, DecisionGrade, DecisionQuality, DecisionReview,
    POINT_MATCH_RADIUS_M,
};
pub use key_moments::{extract_key_moments, FrameMoment, KeyMoments};
pub use summary::{BlockDistribution, MatchSummary, ScorePeak};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::engine::config::EngineConfig;
    use crate::engine::evaluator::DecisionEngine;
    use crate::engine::frame::{Ball, Entity, Frame, Team};

    pub fn engine() -> DecisionEngine {
        DecisionEngine::new(EngineConfig::default()).unwrap()
    }

    /// Team A carrying the ball up the right; `advance` pushes the carrier and ball forward.
    pub fn attacking_frame(index: u64, advance: f32) -> Frame {
        let x = 50.0 + advance;
        Frame::new(index, index as f64 * 0.04)
            .with_entity(Entity::field(9, Team::A, x, 34.0).with_velocity(4.0, 0.0))
            .with_entity(Entity::field(7, Team::A, x + 5.0, 15.0))
            .with_entity(Entity::field(10, Team::A, x + 10.0, 50.0))
            .with_entity(Entity::field(2, Team::B, 85.0, 20.0))
            .with_entity(Entity::field(3, Team::B, 86.0, 34.0))
            .with_entity(Entity::field(4, Team::B, 85.0, 48.0))
            .with_entity(Entity::field(6, Team::B, 60.0, 30.0))
            .with_entity(Entity::goalkeeper(1, Team::B, 103.0, 34.0))
            .with_ball(Ball::at(x + 0.5, 34.0).possessed_by(9))
    }
}
