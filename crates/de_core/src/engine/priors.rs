//! Historical player data, read-only during evaluation.
//!
//! Missing data is never an error: every consumer falls back to population defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::frame::TrackId;

/// Source of per-player historical statistics.
pub trait PlayerPriors: Send + Sync {
    /// Historical pass completion rate in [0, 1]
    fn completion_rate(&self, track_id: TrackId) -> Option<f32>;
    /// Historical sprint speed (m/s)
    fn max_speed_mps(&self, track_id: TrackId) -> Option<f32>;
}

/// No history at all; population defaults everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPriors;

impl PlayerPriors for NoPriors {
    fn completion_rate(&self, _track_id: TrackId) -> Option<f32> {
        None
    }

    fn max_speed_mps(&self, _track_id: TrackId) -> Option<f32> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerPrior {
    pub completion_rate: Option<f32>,
    pub max_speed_mps: Option<f32>,
}

/// One record of a priors file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorRecord {
    pub track_id: TrackId,
    #[serde(default)]
    pub completion_rate: Option<f32>,
    #[serde(default)]
    pub max_speed_mps: Option<f32>,
}

/// Map-backed priors, loaded once and shared.
#[derive(Debug, Clone, Default)]
pub struct StaticPriors {
    players: BTreeMap<TrackId, PlayerPrior>,
}

impl StaticPriors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (TrackId, PlayerPrior)>) -> Self {
        Self { players: entries.into_iter().collect() }
    }

    /// Parse a JSON array of `{track_id, completion_rate?, max_speed_mps?}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<PriorRecord> = serde_json::from_str(json)?;
        Ok(Self::from_entries(records.into_iter().map(|r| {
            (r.track_id, PlayerPrior { completion_rate: r.completion_rate, max_speed_mps: r.max_speed_mps })
        })))
    }

    pub fn insert(&mut self, track_id: TrackId, prior: PlayerPrior) {
        self.players.insert(track_id, prior);
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerPriors for StaticPriors {
    fn completion_rate(&self, track_id: TrackId) -> Option<f32> {
        self.players
            .get(&track_id)
            .and_then(|p| p.completion_rate)
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 1.0))
    }

    fn max_speed_mps(&self, track_id: TrackId) -> Option<f32> {
        self.players.get(&track_id).and_then(|p| p.max_speed_mps).filter(|s| s.is_finite() && *s > 0.0)
    }
}
