//! Per-frame evaluation pipeline.
//!
//! Stages run leaf-first over one validated frame:
//! geometry -> coverage -> elimination -> structure/gaps -> interception -> valuation -> game state

pub mod config;
pub mod coverage;
pub mod elimination;
pub mod evaluator;
pub mod frame;
pub mod game_state;
pub mod geometry;
pub mod interception;
pub mod physics_constants;
pub mod prediction;
pub mod priors;
#[cfg(test)]
pub mod proptest_gen;
pub mod structure;
pub mod validation;
pub mod valuation;
pub mod zone_value;

pub use config::EngineConfig;
pub use coverage::{CoverageModel, CoverageZone, Covered, HorizonRadius};
pub use elimination::{EliminationCalculator, EliminationStatus};
pub use evaluator::{
    CancelToken, Cancellation, DecisionEngine, FrameEvaluation, FrameReport, FrameTicket,
    LatestFrameGate, NeverCancel,
};
pub use frame::{Ball, Entity, Frame, Role, Team, TrackId};
pub use game_state::{GameStateEvaluator, GameStateScore, SubScores};
pub use geometry::{Channel, PitchThird, Vec2};
pub use interception::{InterceptionEstimate, InterceptionModel};
pub use structure::{BlockHeight, DefensiveStructure, Gap, GapDetector, GapKind, StructureAnalysis};
pub use validation::{FrameContext, FrameDiagnostic};
pub use valuation::{ActionKind, ActionOption, ActionSummary, ActionValuator, Recommendation};
pub use zone_value::{zone_value, ZoneColor};
