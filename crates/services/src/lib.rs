#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod http_store;
pub mod store;
pub mod tracker;

pub use progress_core::Clock;

pub use error::ProgressStoreError;
pub use events::{GameEvents, TrackerLoop, TrackerSubscription, tracker_channel};
pub use http_store::{HttpProgressStore, HttpStoreConfig};
pub use store::{ProgressStore, ProgressStoreService};
pub use tracker::{AssignmentContext, CompletionTracker, TrackerSignal};
