//! Process-wide active configuration
//!
//! Holds the configuration snapshot used by engines built with
//! [`DecisionEngine::from_active_config`](crate::DecisionEngine::from_active_config) and by
//! the JSON API. Snapshots are immutable; replacement swaps the whole `Arc`, so an
//! evaluation in flight keeps the snapshot it started with.

use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::engine::config::EngineConfig;
use crate::error::ConfigError;

/// Global active configuration
pub static ACTIVE_CONFIG: Lazy<RwLock<Arc<EngineConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(EngineConfig::from_env_or_default())));

/// Current snapshot.
pub fn active_config() -> Arc<EngineConfig> {
    let guard = ACTIVE_CONFIG.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(&guard)
}

/// Validate `config` and make it the active snapshot. An invalid config leaves the
/// previous snapshot in place.
pub fn replace_active_config(config: EngineConfig) -> Result<Arc<EngineConfig>, ConfigError> {
    config.validate()?;
    let next = Arc::new(config);
    let mut guard = ACTIVE_CONFIG.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Arc::clone(&next);
    info!("active configuration replaced");
    Ok(next)
}

/// Back to the environment-selected profile.
pub fn reset_active_config() -> Arc<EngineConfig> {
    let next = Arc::new(EngineConfig::from_env_or_default());
    let mut guard = ACTIVE_CONFIG.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Arc::clone(&next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so parallel test threads never race on the global.
    #[test]
    fn test_replace_and_reset() {
        let before = active_config();

        let mut invalid = EngineConfig::default();
        invalid.physical.reaction_time_s = -1.0;
        assert!(replace_active_config(invalid).is_err());
        assert_eq!(*active_config(), *before);

        let counter = EngineConfig::counter_attacking();
        let installed = replace_active_config(counter.clone()).unwrap();
        assert_eq!(*installed, counter);
        assert!(Arc::ptr_eq(&installed, &active_config()));

        // Snapshots held elsewhere are unaffected by a later swap
        let held = active_config();
        reset_active_config();
        assert_eq!(*held, counter);
        assert_eq!(*active_config(), EngineConfig::from_env_or_default());
    }
}
