use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use progress_core::Clock;
use progress_core::machine::{CompletionMachine, CompletionPhase, CompletionSignal, MachineEvent};
use progress_core::model::{
    AssignmentId, GameCompletionStatus, GameId, ItemAnswered, ItemId, StudentId, TrackerConfig,
};
use progress_core::exit::{ExitDecision, decide_exit};

use crate::store::ProgressStore;

/// Identifies the assignment/student/game triple a tracker is bound to.
/// Absent outside assignment mode, in which case the tracker is inert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentContext {
    pub assignment_id: AssignmentId,
    pub student_id: StudentId,
    pub game_id: GameId,
}

/// One-shot notifications surfaced to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerSignal {
    /// The game just crossed its threshold; show the completion modal.
    CompletionReached(GameCompletionStatus),
}

/// Event-driven completion tracker for one game session.
///
/// Bridges the game's answer events to periodic store re-evaluation: answers
/// accumulate in a local deduplicated counter, and every `check_interval`
/// newly-correct items (or as soon as the counter reaches the required item
/// count, so completion is never missed to interval misalignment) the store
/// is asked for fresh aggregate counts.
///
/// The counter deliberately counts only correct, not-previously-seen items:
/// the store deduplicates authoritatively, so an overcount here would only
/// trigger a harmless extra fetch, while an undercount could delay the
/// completion modal.
///
/// Store failures during re-evaluation are logged and swallowed; the last
/// successfully computed status stays authoritative (stale but safe, since
/// under-counting merely delays the modal and never falsely completes).
pub struct CompletionTracker {
    context: Option<AssignmentContext>,
    store: Arc<dyn ProgressStore>,
    config: TrackerConfig,
    clock: Clock,
    machine: CompletionMachine,
    seen_items: HashSet<ItemId>,
    correct_count: u32,
    last_refreshed_at: Option<DateTime<Utc>>,
}

impl CompletionTracker {
    #[must_use]
    pub fn new(
        store: Arc<dyn ProgressStore>,
        context: Option<AssignmentContext>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            context,
            store,
            config,
            clock: Clock::default_clock(),
            machine: CompletionMachine::new(),
            seen_items: HashSet::new(),
            correct_count: 0,
            last_refreshed_at: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn is_assignment_mode(&self) -> bool {
        self.context.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> CompletionPhase {
        self.machine.phase()
    }

    /// Last successfully evaluated status, if any.
    #[must_use]
    pub fn status(&self) -> Option<&GameCompletionStatus> {
        self.machine.status()
    }

    /// Locally observed count of newly-correct items this session.
    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed_at
    }

    /// Run the mount-time evaluation. No-op outside assignment mode.
    ///
    /// May return a completion signal when the game was already complete
    /// before this session started.
    pub async fn initialize(&mut self) -> Option<TrackerSignal> {
        if !self.is_assignment_mode() {
            return None;
        }
        self.reevaluate().await
    }

    /// Feed one answered-item event into the tracker.
    ///
    /// Incorrect answers and repeats of an already-correct item are ignored.
    /// Correct answers advance the local counter; when the counter lands on
    /// the check interval or reaches the required item count, the store is
    /// consulted and the completion machine stepped.
    pub async fn on_item_answered(&mut self, event: ItemAnswered) -> Option<TrackerSignal> {
        if !self.is_assignment_mode() || !event.was_correct {
            return None;
        }

        if let Some(item_id) = event.item_id {
            if !self.seen_items.insert(item_id) {
                return None;
            }
        }
        self.correct_count += 1;

        if self.should_reevaluate() {
            self.reevaluate().await
        } else {
            None
        }
    }

    /// Decide what to do about a request to leave the activity.
    #[must_use]
    pub fn request_exit(&self) -> ExitDecision {
        decide_exit(self.is_assignment_mode(), self.status())
    }

    fn should_reevaluate(&self) -> bool {
        // Complete is terminal for the session; no further fetches.
        if self.machine.phase() == CompletionPhase::Complete {
            return false;
        }
        self.correct_count % self.config.check_interval() == 0
            || self.correct_count >= self.items_required_bound()
    }

    /// Required-item bound used to force re-evaluation regardless of
    /// interval alignment. Before the first successful fetch this falls back
    /// to the configured threshold so completion cannot be missed while the
    /// store is unreachable at mount.
    fn items_required_bound(&self) -> u32 {
        self.status()
            .map(GameCompletionStatus::items_required)
            .filter(|required| *required > 0)
            .unwrap_or_else(|| self.config.fallback_items_required())
    }

    async fn reevaluate(&mut self) -> Option<TrackerSignal> {
        let context = self.context.clone()?;
        self.machine.transition(MachineEvent::EvaluationStarted);

        let fetched = self
            .store
            .fetch_completion(context.assignment_id, context.student_id, &context.game_id)
            .await;

        match fetched {
            Ok(status) => {
                self.last_refreshed_at = Some(self.clock.now());
                let signal = self.machine.transition(MachineEvent::Evaluated(status));
                signal.map(|CompletionSignal::CompletionReached(status)| {
                    tracing::info!(
                        assignment_id = %context.assignment_id,
                        game_id = %context.game_id,
                        "game completion threshold reached"
                    );
                    TrackerSignal::CompletionReached(status)
                })
            }
            Err(error) => {
                tracing::warn!(
                    assignment_id = %context.assignment_id,
                    game_id = %context.game_id,
                    %error,
                    "progress fetch failed; keeping last known status"
                );
                self.machine.transition(MachineEvent::EvaluationFailed);
                None
            }
        }
    }
}

impl fmt::Debug for CompletionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionTracker")
            .field("context", &self.context)
            .field("phase", &self.machine.phase())
            .field("correct_count", &self.correct_count)
            .field("last_refreshed_at", &self.last_refreshed_at)
            .finish_non_exhaustive()
    }
}
