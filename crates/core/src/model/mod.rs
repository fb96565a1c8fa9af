mod config;
mod event;
mod ids;
mod status;

pub use config::{
    ConfigError, DEFAULT_CHECK_INTERVAL, DEFAULT_ITEMS_REQUIRED, GameThresholds, TrackerConfig,
    TrackerConfigDraft,
};
pub use event::ItemAnswered;
pub use ids::{AssignmentId, GameId, GameIdError, ItemId, ItemIdError, StudentId};
pub use status::{CompletionCounts, GameCompletionStatus};
