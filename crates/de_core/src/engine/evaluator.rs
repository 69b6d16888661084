//! # Decision Engine
//!
//! Runs the per-frame pipeline in dependency order:
//! validation → coverage → elimination → structure → valuation → game state.
//!
//! The engine holds only immutable shared state, so one instance serves any number of
//! threads. Cancellation is checked between stages; a cancelled frame leaves nothing behind.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::coverage::CoverageModel;
use super::elimination::{EliminationCalculator, EliminationStatus};
use super::frame::{Frame, Team, TrackId};
use super::game_state::{GameStateEvaluator, GameStateScore};
use super::prediction::FramePredictor;
use super::priors::{NoPriors, PlayerPriors};
use super::structure::{DefensiveStructure, Gap, GapDetector};
use super::validation::{FrameContext, FrameDiagnostic};
use super::valuation::{summarize, ActionOption, ActionSummary, ActionValuator};
use crate::error::{ConfigError, FrameError, Result};

/// Polled between pipeline stages.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared flag; cancel from any thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl Cancellation for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Sheds load by superseding stale frames: starting a newer frame cancels every
/// ticket handed out before it.
#[derive(Debug, Clone, Default)]
pub struct LatestFrameGate {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct FrameTicket {
    generation: u64,
    gate: Arc<AtomicU64>,
}

impl LatestFrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> FrameTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        FrameTicket { generation, gate: Arc::clone(&self.generation) }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl FrameTicket {
    pub fn is_current(&self) -> bool {
        self.gate.load(Ordering::Acquire) == self.generation
    }
}

impl Cancellation for FrameTicket {
    fn is_cancelled(&self) -> bool {
        !self.is_current()
    }
}

/// Everything derived from one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEvaluation {
    pub frame_index: u64,
    pub timestamp_s: f64,
    pub possession_team: Team,
    /// Attack direction of the team in possession
    pub attacks_right: bool,
    pub ball_carrier: Option<TrackId>,
    pub eliminations: Vec<EliminationStatus>,
    pub structure: DefensiveStructure,
    pub gaps: Vec<Gap>,
    /// Ranked, best first
    pub actions: Vec<ActionOption>,
    pub game_state: GameStateScore,
    pub summary: ActionSummary,
    pub diagnostics: Vec<FrameDiagnostic>,
}

impl FrameEvaluation {
    pub fn best_action(&self) -> Option<&ActionOption> {
        self.actions.first()
    }

    pub fn safe_default(&self) -> Option<&ActionOption> {
        self.actions.iter().find(|a| a.is_safe_default)
    }
}

/// Outcome for one frame: an evaluation or an explicit rejection, never a silent gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameReport {
    Evaluated(FrameEvaluation),
    Rejected { frame_index: u64, timestamp_s: f64, error: FrameError },
}

impl FrameReport {
    pub fn frame_index(&self) -> u64 {
        match self {
            FrameReport::Evaluated(e) => e.frame_index,
            FrameReport::Rejected { frame_index, .. } => *frame_index,
        }
    }

    pub fn evaluation(&self) -> Option<&FrameEvaluation> {
        match self {
            FrameReport::Evaluated(e) => Some(e),
            FrameReport::Rejected { .. } => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, FrameReport::Rejected { .. })
    }
}

#[derive(Clone)]
pub struct DecisionEngine {
    config: Arc<EngineConfig>,
    priors: Arc<dyn PlayerPriors>,
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine").field("config", &self.config).finish_non_exhaustive()
    }
}

impl DecisionEngine {
    /// Refuses invalid configurations.
    pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        Self::from_shared(Arc::new(config))
    }

    pub fn from_shared(config: Arc<EngineConfig>) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, priors: Arc::new(NoPriors) })
    }

    /// Engine on the process-wide active configuration snapshot.
    pub fn from_active_config() -> Self {
        Self { config: crate::state::active_config(), priors: Arc::new(NoPriors) }
    }

    pub fn with_priors(mut self, priors: Arc<dyn PlayerPriors>) -> Self {
        self.priors = priors;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.config)
    }

    pub fn evaluate(&self, frame: &Frame) -> Result<FrameEvaluation> {
        self.evaluate_with(frame, &NeverCancel)
    }

    pub fn evaluate_with(&self, frame: &Frame, cancel: &dyn Cancellation) -> Result<FrameEvaluation> {
        let cfg = &*self.config;
        let priors = self.priors.as_ref();
        let checkpoint = |stage: &'static str| -> Result<()> {
            if cancel.is_cancelled() {
                debug!(frame = frame.index, stage, "evaluation cancelled");
                return Err(FrameError::Cancelled { frame_index: frame.index });
            }
            Ok(())
        };

        checkpoint("validation")?;
        let ctx = FrameContext::validate(frame, &cfg.physical)?;

        checkpoint("coverage")?;
        let defenders = CoverageModel::new(&cfg.physical).cover(ctx.defenders(), priors);

        checkpoint("elimination")?;
        let eliminations = EliminationCalculator::new(&cfg.physical).evaluate(&ctx, &defenders);
        let eliminated: BTreeSet<TrackId> =
            eliminations.iter().filter(|s| s.eliminated).map(|s| s.track_id).collect();

        checkpoint("structure")?;
        let analysis = GapDetector::new(&cfg.structure).analyze(&defenders, ctx.ball.position, ctx.attacks_right);

        checkpoint("valuation")?;
        let actions =
            ActionValuator::new(&cfg.actions, priors).evaluate(&ctx, &defenders, &analysis.gaps, &eliminated);

        checkpoint("game_state")?;
        let game_state = GameStateEvaluator::new(&cfg.scoring).evaluate(
            &eliminations,
            &analysis.gaps,
            &actions,
            &analysis.structure,
        );
        let summary = summarize(&actions, &cfg.actions.recommendation);

        Ok(FrameEvaluation {
            frame_index: frame.index,
            timestamp_s: frame.timestamp_s,
            possession_team: ctx.attacking_team,
            attacks_right: ctx.attacks_right,
            ball_carrier: ctx.carrier,
            eliminations,
            structure: analysis.structure,
            gaps: analysis.gaps,
            actions,
            game_state,
            summary,
            diagnostics: ctx.diagnostics,
        })
    }

    pub fn report(&self, frame: &Frame) -> FrameReport {
        self.report_with(frame, &NeverCancel)
    }

    pub fn report_with(&self, frame: &Frame, cancel: &dyn Cancellation) -> FrameReport {
        match self.evaluate_with(frame, cancel) {
            Ok(evaluation) => FrameReport::Evaluated(evaluation),
            Err(error) => {
                if error.is_malformed() {
                    warn!(frame = frame.index, %error, "frame rejected");
                } else {
                    debug!(frame = frame.index, %error, "frame dropped");
                }
                FrameReport::Rejected { frame_index: frame.index, timestamp_s: frame.timestamp_s, error }
            }
        }
    }

    /// Evaluate `frame` unless a newer frame starts on `gate` before it finishes.
    pub fn report_latest(&self, gate: &LatestFrameGate, frame: &Frame) -> FrameReport {
        let ticket = gate.begin();
        self.report_with(frame, &ticket)
    }

    /// Independent frames over the rayon pool; output order follows input order.
    pub fn evaluate_batch(&self, frames: &[Frame]) -> Vec<FrameReport> {
        let reports: Vec<FrameReport> = frames.par_iter().map(|frame| self.report(frame)).collect();
        let rejected = reports.iter().filter(|r| r.is_rejected()).count();
        info!(frames = frames.len(), rejected, "batch evaluated");
        reports
    }

    /// Evaluate predicted future frames with the same pipeline.
    pub fn evaluate_candidates(
        &self,
        frame: &Frame,
        predictor: &dyn FramePredictor,
        horizons_s: &[f32],
    ) -> Vec<FrameReport> {
        predictor.predict(frame, horizons_s).iter().map(|candidate| self.report(candidate)).collect()
    }
}
