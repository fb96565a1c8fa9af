use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{AssignmentId, GameId, ItemId, StudentId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One game configured within an assignment, with its completion threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentGame {
    pub game_id: GameId,
    pub items_required: u32,
}

/// Persisted shape of an assignment as this subsystem sees it: the set of
/// games and their required-item thresholds. Everything else about an
/// assignment (due dates, class lists, vocabulary selection) belongs to other
/// parts of the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub id: AssignmentId,
    pub name: String,
    pub games: Vec<AssignmentGame>,
}

impl AssignmentRecord {
    #[must_use]
    pub fn game(&self, game_id: &GameId) -> Option<&AssignmentGame> {
        self.games.iter().find(|g| &g.game_id == game_id)
    }
}

/// Raw per-game counts for one student within one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProgressRow {
    pub game_id: GameId,
    pub unique_correct_items: u32,
    pub items_required: u32,
}

/// Repository contract for assignment progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist or update an assignment's game configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the assignment cannot be stored.
    async fn upsert_assignment(&self, assignment: &AssignmentRecord) -> Result<(), StorageError>;

    /// Fetch an assignment by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_assignment(&self, id: AssignmentId) -> Result<AssignmentRecord, StorageError>;

    /// Record that a student answered an item correctly.
    ///
    /// Idempotent: recording the same item again is a no-op. Returns `true`
    /// if the item was newly recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the assignment or game is not
    /// configured, or other storage errors.
    async fn record_correct_item(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
        item_id: &ItemId,
        answered_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Per-game progress for a student, one row per configured game with
    /// zero counts included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the assignment is missing, or
    /// other storage errors.
    async fn list_progress(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
    ) -> Result<Vec<GameProgressRow>, StorageError>;
}

type ItemKey = (AssignmentId, StudentId, GameId);

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryProgressRepository {
    assignments: Arc<Mutex<HashMap<AssignmentId, AssignmentRecord>>>,
    items: Arc<Mutex<HashMap<ItemKey, HashSet<ItemId>>>>,
}

impl InMemoryProgressRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn upsert_assignment(&self, assignment: &AssignmentRecord) -> Result<(), StorageError> {
        let mut guard = self
            .assignments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn get_assignment(&self, id: AssignmentId) -> Result<AssignmentRecord, StorageError> {
        let guard = self
            .assignments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn record_correct_item(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
        item_id: &ItemId,
        _answered_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let assignment = self.get_assignment(assignment_id).await?;
        if assignment.game(game_id).is_none() {
            return Err(StorageError::NotFound);
        }

        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let set = guard
            .entry((assignment_id, student_id, game_id.clone()))
            .or_default();
        Ok(set.insert(item_id.clone()))
    }

    async fn list_progress(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
    ) -> Result<Vec<GameProgressRow>, StorageError> {
        let assignment = self.get_assignment(assignment_id).await?;
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut rows = Vec::with_capacity(assignment.games.len());
        for game in &assignment.games {
            let key = (assignment_id, student_id, game.game_id.clone());
            let count = guard.get(&key).map_or(0, HashSet::len);
            rows.push(GameProgressRow {
                game_id: game.game_id.clone(),
                unique_correct_items: u32::try_from(count)
                    .map_err(|_| StorageError::Serialization("item count overflow".into()))?,
                items_required: game.items_required,
            });
        }
        Ok(rows)
    }
}
