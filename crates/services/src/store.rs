use std::sync::Arc;

use async_trait::async_trait;

use progress_core::Clock;
use progress_core::model::{
    AssignmentId, CompletionCounts, GameCompletionStatus, GameId, ItemId, StudentId,
};
use storage::repository::ProgressRepository;

use crate::error::ProgressStoreError;

/// Logical read interface to the progress store.
///
/// `fetch_completion` is a pure read/compute operation with no side effects
/// on the store, so it is idempotent and safe to retry.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Compute the completion status for one game within one assignment.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if the assignment or game is unknown or
    /// the backing store is unreachable.
    async fn fetch_completion(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
    ) -> Result<GameCompletionStatus, ProgressStoreError>;
}

/// Repository-backed progress store.
///
/// Owns the time source and repository access; hides both from the tracker
/// and the UI.
#[derive(Clone)]
pub struct ProgressStoreService {
    clock: Clock,
    repository: Arc<dyn ProgressRepository>,
}

impl ProgressStoreService {
    #[must_use]
    pub fn new(clock: Clock, repository: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, repository }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryProgressRepository::new()),
        )
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn ProgressRepository> {
        &self.repository
    }

    /// Record a correctly answered item. This is the write path used by game
    /// session persistence; the completion tracker itself never writes.
    ///
    /// Returns `true` if the item was newly recorded.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Storage` on repository failures.
    pub async fn record_correct_item(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
        item_id: &ItemId,
    ) -> Result<bool, ProgressStoreError> {
        let newly_recorded = self
            .repository
            .record_correct_item(assignment_id, student_id, game_id, item_id, self.clock.now())
            .await?;
        if newly_recorded {
            tracing::debug!(%assignment_id, %game_id, %item_id, "recorded correct item");
        }
        Ok(newly_recorded)
    }
}

#[async_trait]
impl ProgressStore for ProgressStoreService {
    async fn fetch_completion(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
    ) -> Result<GameCompletionStatus, ProgressStoreError> {
        let rows = self
            .repository
            .list_progress(assignment_id, student_id)
            .await?;

        let game_row = rows
            .iter()
            .find(|row| &row.game_id == game_id)
            .ok_or_else(|| ProgressStoreError::MissingGame(game_id.clone()))?;

        // Assignment aggregate: per-game counts capped at that game's
        // requirement so over-completion in one game cannot stand in for
        // another; complete only when every game is complete.
        let mut correct_total = 0_u32;
        let mut required_total = 0_u32;
        for row in &rows {
            correct_total = correct_total
                .saturating_add(row.unique_correct_items.min(row.items_required));
            required_total = required_total.saturating_add(row.items_required);
        }

        Ok(GameCompletionStatus::evaluate(
            CompletionCounts::new(game_row.unique_correct_items, game_row.items_required),
            CompletionCounts::new(correct_total, required_total),
        ))
    }
}
