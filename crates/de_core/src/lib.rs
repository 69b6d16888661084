//! # de_core - Deterministic Per-Frame Football Decision Engine
//!
//! Turns one tracked frame (player and ball positions in pitch meters) into:
//! - which defenders are eliminated from the play
//! - exploitable gaps in the defensive structure
//! - ranked pass / dribble / shot options with success probability and expected value
//! - a bounded game-state score
//!
//! ## Features
//! - Pure function of frame + configuration (same input = byte-identical JSON)
//! - Frames evaluated independently; batch evaluation over rayon
//! - JSON API and JSON Schema for the input record

// Formulas with many physical parameters
#![allow(clippy::too_many_arguments)]
// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Struct initialization pattern used in presets
#![allow(clippy::field_reassign_with_default)]

pub mod analysis;
pub mod api;
pub mod engine;
pub mod error;
pub mod state;

// Re-export main API functions
pub use api::{evaluate_frame_json, evaluate_frames_json, input_schema_json};
pub use api::{FrameOutputRecord, FrameRecord};
pub use engine::config::EngineConfig;
pub use engine::evaluator::{
    CancelToken, Cancellation, DecisionEngine, FrameEvaluation, FrameReport, LatestFrameGate,
};
pub use engine::frame::{Ball, Entity, Frame, Role, Team, TrackId};
pub use engine::geometry::Vec2;
pub use engine::prediction::{ConstantVelocityPredictor, FramePredictor};
pub use engine::priors::{NoPriors, PlayerPriors, StaticPriors};
pub use error::{ConfigError, FrameError, MalformedReason, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
