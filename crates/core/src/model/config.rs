use std::collections::HashMap;
use thiserror::Error;

use crate::model::{GameId, GameIdError};

/// Safe fallback when an assignment carries no per-game requirement.
pub const DEFAULT_ITEMS_REQUIRED: u32 = 10;

/// How many newly-correct items pass between store re-evaluations.
pub const DEFAULT_CHECK_INTERVAL: u32 = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("check interval must be greater than zero")]
    ZeroCheckInterval,
}

/// Unvalidated tracker configuration, typically assembled from assignment
/// data and per-game defaults.
#[derive(Clone, Debug, Default)]
pub struct TrackerConfigDraft {
    pub check_interval: Option<u32>,
    pub fallback_items_required: Option<u32>,
}

/// Validated tracker configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    check_interval: u32,
    fallback_items_required: u32,
}

impl TrackerConfigDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into a usable configuration.
    ///
    /// A missing or zero `fallback_items_required` defaults to
    /// [`DEFAULT_ITEMS_REQUIRED`]: the tracker must never end up with a zero
    /// threshold, which would make the forced re-evaluation bound useless.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroCheckInterval` if an explicit zero interval
    /// was supplied.
    pub fn validate(self) -> Result<TrackerConfig, ConfigError> {
        if self.check_interval == Some(0) {
            return Err(ConfigError::ZeroCheckInterval);
        }
        let fallback = match self.fallback_items_required {
            Some(0) | None => DEFAULT_ITEMS_REQUIRED,
            Some(n) => n,
        };
        Ok(TrackerConfig {
            check_interval: self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL),
            fallback_items_required: fallback,
        })
    }
}

impl TrackerConfig {
    #[must_use]
    pub fn check_interval(&self) -> u32 {
        self.check_interval
    }

    #[must_use]
    pub fn fallback_items_required(&self) -> u32 {
        self.fallback_items_required
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            fallback_items_required: DEFAULT_ITEMS_REQUIRED,
        }
    }
}

/// Per-game required-item thresholds.
///
/// Built once at application start and passed by reference to whoever needs
/// it; deliberately not a mutable module-level singleton so tests can
/// construct their own.
#[derive(Clone, Debug, Default)]
pub struct GameThresholds {
    overrides: HashMap<GameId, u32>,
}

impl GameThresholds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform's standard thresholds.
    ///
    /// # Errors
    ///
    /// Returns `GameIdError` only if a built-in slug is invalid, which would
    /// be a programming error caught by tests.
    pub fn standard() -> Result<Self, GameIdError> {
        let mut thresholds = Self::new();
        for (slug, required) in [
            ("memory-game", 10),
            ("hangman", 8),
            ("noughts-and-crosses", 9),
            ("word-scramble", 10),
            ("vocab-blast", 12),
        ] {
            thresholds.set(GameId::new(slug)?, required);
        }
        Ok(thresholds)
    }

    pub fn set(&mut self, game_id: GameId, items_required: u32) {
        self.overrides.insert(game_id, items_required);
    }

    /// Required items for the given game, falling back to
    /// [`DEFAULT_ITEMS_REQUIRED`] for unknown games.
    #[must_use]
    pub fn items_required(&self, game_id: &GameId) -> u32 {
        self.overrides
            .get(game_id)
            .copied()
            .unwrap_or(DEFAULT_ITEMS_REQUIRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_safe() {
        let config = TrackerConfigDraft::new().validate().unwrap();
        assert_eq!(config.check_interval(), DEFAULT_CHECK_INTERVAL);
        assert_eq!(config.fallback_items_required(), DEFAULT_ITEMS_REQUIRED);
    }

    #[test]
    fn zero_check_interval_is_rejected() {
        let err = TrackerConfigDraft {
            check_interval: Some(0),
            fallback_items_required: None,
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCheckInterval));
    }

    #[test]
    fn zero_fallback_threshold_is_replaced() {
        let config = TrackerConfigDraft {
            check_interval: Some(5),
            fallback_items_required: Some(0),
        }
        .validate()
        .unwrap();
        assert_eq!(config.fallback_items_required(), DEFAULT_ITEMS_REQUIRED);
    }

    #[test]
    fn standard_thresholds_cover_known_games() {
        let thresholds = GameThresholds::standard().unwrap();
        assert_eq!(
            thresholds.items_required(&GameId::new("hangman").unwrap()),
            8
        );
        assert_eq!(
            thresholds.items_required(&GameId::new("vocab-blast").unwrap()),
            12
        );
    }

    #[test]
    fn unknown_game_uses_default_threshold() {
        let thresholds = GameThresholds::standard().unwrap();
        assert_eq!(
            thresholds.items_required(&GameId::new("new-game").unwrap()),
            DEFAULT_ITEMS_REQUIRED
        );
    }
}
