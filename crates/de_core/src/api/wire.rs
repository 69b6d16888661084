//! Wire records for the JSON API
//!
//! Input records mirror what a tracking feed produces per frame; output records flatten
//! the engine's evaluation into plain numbers and labels.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::elimination::EliminationStatus;
use crate::engine::evaluator::{FrameEvaluation, FrameReport};
use crate::engine::frame::{Ball, Entity, Frame, Role, Team, TrackId};
use crate::engine::game_state::GameStateScore;
use crate::engine::geometry::Vec2;
use crate::engine::structure::{BlockHeight, DefensiveStructure, Gap, GapKind};
use crate::engine::validation::FrameDiagnostic;
use crate::engine::valuation::{ActionKind, ActionOption, ActionSummary, Recommendation};
use crate::engine::zone_value::ZoneColor;
use crate::error::{FrameError, MalformedReason};

/// Error codes carried by rejected frames and API failures
pub mod error_codes {
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const MALFORMED_FRAME: &str = "MALFORMED_FRAME";
    pub const CANCELLED: &str = "CANCELLED";
    pub const SERIALIZATION_FAILED: &str = "SERIALIZATION_FAILED";
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Input
// ============================================================================

/// One tracked frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameRecord {
    pub frame_index: u64,
    pub timestamp_seconds: f64,
    /// Attack direction of team A in this period
    #[serde(default = "default_true")]
    pub team_a_attacks_right: bool,
    /// Explicit possession flag; inferred from the ball when absent
    #[serde(default)]
    pub possession_team: Option<Team>,
    pub players: Vec<PlayerRecord>,
    /// `null` when the tracker lost the ball
    #[serde(default)]
    pub ball: Option<BallRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerRecord {
    pub track_id: TrackId,
    pub team: Team,
    #[serde(default)]
    pub role: Role,
    pub x_m: f32,
    pub y_m: f32,
    #[serde(default)]
    pub vx_mps: f32,
    #[serde(default)]
    pub vy_mps: f32,
    #[serde(default)]
    pub jersey: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
    /// Measured sprint speed, overrides priors
    #[serde(default)]
    pub max_speed_mps: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BallRecord {
    pub x_m: f32,
    pub y_m: f32,
    #[serde(default)]
    pub z_m: Option<f32>,
    #[serde(default)]
    pub vx_mps: Option<f32>,
    #[serde(default)]
    pub vy_mps: Option<f32>,
    #[serde(default)]
    pub possessor_track_id: Option<TrackId>,
}

impl From<PlayerRecord> for Entity {
    fn from(p: PlayerRecord) -> Self {
        Entity {
            track_id: p.track_id,
            team: p.team,
            role: p.role,
            position: Vec2::new(p.x_m, p.y_m),
            velocity: Vec2::new(p.vx_mps, p.vy_mps),
            jersey: p.jersey,
            name: p.name,
            max_speed_mps: p.max_speed_mps,
        }
    }
}

impl From<BallRecord> for Ball {
    fn from(b: BallRecord) -> Self {
        Ball {
            position: Vec2::new(b.x_m, b.y_m),
            height_m: b.z_m,
            velocity: Vec2::new(b.vx_mps.unwrap_or(0.0), b.vy_mps.unwrap_or(0.0)),
            possessor: b.possessor_track_id,
        }
    }
}

impl From<FrameRecord> for Frame {
    fn from(r: FrameRecord) -> Self {
        Frame {
            index: r.frame_index,
            timestamp_s: r.timestamp_seconds,
            entities: r.players.into_iter().map(Entity::from).collect(),
            ball: r.ball.map(Ball::from),
            team_a_attacks_right: r.team_a_attacks_right,
            possession: r.possession_team,
        }
    }
}

impl From<&Frame> for FrameRecord {
    fn from(frame: &Frame) -> Self {
        FrameRecord {
            frame_index: frame.index,
            timestamp_seconds: frame.timestamp_s,
            team_a_attacks_right: frame.team_a_attacks_right,
            possession_team: frame.possession,
            players: frame
                .entities
                .iter()
                .map(|e| PlayerRecord {
                    track_id: e.track_id,
                    team: e.team,
                    role: e.role,
                    x_m: e.position.x,
                    y_m: e.position.y,
                    vx_mps: e.velocity.x,
                    vy_mps: e.velocity.y,
                    jersey: e.jersey,
                    name: e.name.clone(),
                    max_speed_mps: e.max_speed_mps,
                })
                .collect(),
            ball: frame.ball.as_ref().map(|b| BallRecord {
                x_m: b.position.x,
                y_m: b.position.y,
                z_m: b.height_m,
                vx_mps: Some(b.velocity.x),
                vy_mps: Some(b.velocity.y),
                possessor_track_id: b.possessor,
            }),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Per-frame API output, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutputRecord {
    Evaluated(EvaluatedFrameRecord),
    Rejected { frame_index: u64, timestamp_seconds: f64, error: ErrorRecord },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedFrameRecord {
    pub frame_index: u64,
    pub timestamp_seconds: f64,
    pub possession_team: Team,
    pub attacks_right: bool,
    pub ball_carrier_track_id: Option<TrackId>,
    pub eliminations: Vec<EliminationRecord>,
    pub gaps: Vec<GapRecord>,
    pub structure: StructureRecord,
    pub actions: Vec<ActionRecord>,
    pub game_state: GameStateScore,
    pub summary: ActionSummary,
    pub diagnostics: Vec<FrameDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub code: &'static str,
    pub message: String,
    /// Validation failure detail, absent for cancellation
    pub reason: Option<MalformedReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliminationRecord {
    pub track_id: TrackId,
    pub eliminated: bool,
    pub behind_play: bool,
    pub margin: f32,
    pub recoverable_by: Option<TrackId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRecord {
    pub centroid_x: f32,
    pub centroid_y: f32,
    pub size_m: f32,
    pub time_to_close_s: Option<f32>,
    pub exploitable: bool,
    pub kind: GapKind,
    pub between: Option<[TrackId; 2]>,
    pub zone_value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureRecord {
    pub line_height_m: f32,
    pub compactness_m: f32,
    pub width_m: f32,
    pub depth_m: f32,
    pub line_count: usize,
    pub block: BlockHeight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub target_x: f32,
    pub target_y: f32,
    pub target_track_id: Option<TrackId>,
    pub through_gap: bool,
    pub distance_m: f32,
    pub defender_pressure: f32,
    pub success_probability: f32,
    pub interception_probability: Option<f32>,
    pub zone_value_gain: f32,
    pub target_zone: ZoneColor,
    pub turnover_cost: f32,
    pub expected_value: f32,
    pub recommendation: Recommendation,
    pub is_safe_default: bool,
}

impl From<&FrameError> for ErrorRecord {
    fn from(error: &FrameError) -> Self {
        match error {
            FrameError::Malformed { reason, .. } => ErrorRecord {
                code: error_codes::MALFORMED_FRAME,
                message: error.to_string(),
                reason: Some(reason.clone()),
            },
            FrameError::Cancelled { .. } => {
                ErrorRecord { code: error_codes::CANCELLED, message: error.to_string(), reason: None }
            }
        }
    }
}

impl From<&EliminationStatus> for EliminationRecord {
    fn from(s: &EliminationStatus) -> Self {
        EliminationRecord {
            track_id: s.track_id,
            eliminated: s.eliminated,
            behind_play: s.behind_play,
            margin: s.margin_m,
            recoverable_by: s.recoverable_by,
        }
    }
}

impl From<&Gap> for GapRecord {
    fn from(g: &Gap) -> Self {
        GapRecord {
            centroid_x: g.centroid.x,
            centroid_y: g.centroid.y,
            size_m: g.size_m,
            time_to_close_s: g.time_to_close_s,
            exploitable: g.exploitable,
            kind: g.kind,
            between: g.between.map(|(a, b)| [a, b]),
            zone_value: g.zone_value,
        }
    }
}

impl From<&DefensiveStructure> for StructureRecord {
    fn from(s: &DefensiveStructure) -> Self {
        StructureRecord {
            line_height_m: s.line_height_m,
            compactness_m: s.compactness_m,
            width_m: s.width_m,
            depth_m: s.depth_m,
            line_count: s.line_count,
            block: s.block,
        }
    }
}

impl From<&ActionOption> for ActionRecord {
    fn from(a: &ActionOption) -> Self {
        ActionRecord {
            kind: a.kind,
            target_x: a.target.x,
            target_y: a.target.y,
            target_track_id: a.target_track_id,
            through_gap: a.through_gap,
            distance_m: a.distance_m,
            defender_pressure: a.defender_pressure,
            success_probability: a.success_probability,
            interception_probability: a.interception_probability,
            zone_value_gain: a.zone_value_gain,
            target_zone: a.target_zone,
            turnover_cost: a.turnover_cost,
            expected_value: a.expected_value,
            recommendation: a.recommendation,
            is_safe_default: a.is_safe_default,
        }
    }
}

impl From<&FrameEvaluation> for EvaluatedFrameRecord {
    fn from(e: &FrameEvaluation) -> Self {
        EvaluatedFrameRecord {
            frame_index: e.frame_index,
            timestamp_seconds: e.timestamp_s,
            possession_team: e.possession_team,
            attacks_right: e.attacks_right,
            ball_carrier_track_id: e.ball_carrier,
            eliminations: e.eliminations.iter().map(EliminationRecord::from).collect(),
            gaps: e.gaps.iter().map(GapRecord::from).collect(),
            structure: StructureRecord::from(&e.structure),
            actions: e.actions.iter().map(ActionRecord::from).collect(),
            game_state: e.game_state,
            summary: e.summary,
            diagnostics: e.diagnostics.clone(),
        }
    }
}

impl From<&FrameReport> for FrameOutputRecord {
    fn from(report: &FrameReport) -> Self {
        match report {
            FrameReport::Evaluated(e) => FrameOutputRecord::Evaluated(EvaluatedFrameRecord::from(e)),
            FrameReport::Rejected { frame_index, timestamp_s, error } => FrameOutputRecord::Rejected {
                frame_index: *frame_index,
                timestamp_seconds: *timestamp_s,
                error: ErrorRecord::from(error),
            },
        }
    }
}
