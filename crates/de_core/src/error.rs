//! Error types for frame evaluation and configuration

use serde::Serialize;
use thiserror::Error;

use crate::engine::frame::{Team, TrackId};

/// Per-frame evaluation failure. Always reported explicitly, never as a low score.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameError {
    #[error("malformed frame {frame_index}: {reason}")]
    Malformed { frame_index: u64, reason: MalformedReason },

    #[error("frame {frame_index} cancelled before evaluation completed")]
    Cancelled { frame_index: u64 },
}

impl FrameError {
    pub fn malformed(frame_index: u64, reason: MalformedReason) -> Self {
        Self::Malformed { frame_index, reason }
    }

    pub fn frame_index(&self) -> u64 {
        match self {
            Self::Malformed { frame_index, .. } | Self::Cancelled { frame_index } => *frame_index,
        }
    }

    /// Input problems, as opposed to the caller abandoning the frame.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Why a frame was rejected at validation.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MalformedReason {
    #[error("ball missing")]
    MissingBall,

    #[error("{found} entities, at least {required} required")]
    TooFewEntities { found: usize, required: usize },

    #[error("team {team} has no players")]
    EmptyTeam { team: Team },

    /// `track_id` is `None` for the ball.
    #[error("non-finite coordinate on {}", describe_track(.track_id))]
    NonFiniteCoordinate { track_id: Option<TrackId> },

    #[error("{} at ({x:.2}, {y:.2}) is outside the pitch", describe_track(.track_id))]
    OutOfBounds { track_id: Option<TrackId>, x: f32, y: f32 },

    #[error("timestamp is not finite")]
    NonFiniteTimestamp,

    #[error("duplicate track id {track_id}")]
    DuplicateTrackId { track_id: TrackId },

    #[error("possessor {track_id} is not in the frame")]
    UnknownPossessor { track_id: TrackId },
}

impl MalformedReason {
    /// Stable snake_case name, matches the serialized tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingBall => "missing_ball",
            Self::TooFewEntities { .. } => "too_few_entities",
            Self::EmptyTeam { .. } => "empty_team",
            Self::NonFiniteCoordinate { .. } => "non_finite_coordinate",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::NonFiniteTimestamp => "non_finite_timestamp",
            Self::DuplicateTrackId { .. } => "duplicate_track_id",
            Self::UnknownPossessor { .. } => "unknown_possessor",
        }
    }
}

fn describe_track(track_id: &Option<TrackId>) -> String {
    match track_id {
        Some(id) => format!("track {id}"),
        None => "ball".to_string(),
    }
}

/// Result alias for frame evaluation
pub type Result<T> = std::result::Result<T, FrameError>;

/// Configuration loading and validation errors. Fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {field} {problem}")]
    Invalid { field: &'static str, problem: String },

    #[error("unknown configuration profile '{0}' (expected balanced, counter_attacking or possession)")]
    UnknownProfile(String),

    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid(field: &'static str, problem: impl Into<String>) -> Self {
        Self::Invalid { field, problem: problem.into() }
    }
}
