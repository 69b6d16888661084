//! Candidate future frames.
//!
//! Predictors only produce frames; evaluating them goes through the same stateless
//! pipeline as observed frames.

use super::frame::Frame;
use super::geometry::clamp_to_pitch;

pub trait FramePredictor: Send + Sync {
    /// One candidate frame per horizon (seconds ahead), in horizon order.
    fn predict(&self, frame: &Frame, horizons_s: &[f32]) -> Vec<Frame>;
}

/// Everyone keeps their current velocity; the ball stays with its possessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantVelocityPredictor;

impl FramePredictor for ConstantVelocityPredictor {
    fn predict(&self, frame: &Frame, horizons_s: &[f32]) -> Vec<Frame> {
        horizons_s
            .iter()
            .filter(|h| h.is_finite() && **h >= 0.0)
            .map(|&h| {
                let mut next = frame.clone();
                next.timestamp_s = frame.timestamp_s + f64::from(h);
                for entity in &mut next.entities {
                    if entity.velocity.is_finite() {
                        entity.position = clamp_to_pitch(entity.position + entity.velocity * h);
                    }
                }
                if let Some(ball) = next.ball.as_mut() {
                    let carried = ball.possessor.and_then(|id| next.entities.iter().find(|e| e.track_id == id));
                    ball.position = match carried {
                        Some(possessor) => possessor.position,
                        None if ball.velocity.is_finite() => clamp_to_pitch(ball.position + ball.velocity * h),
                        None => ball.position,
                    };
                }
                next
            })
            .collect()
    }
}
