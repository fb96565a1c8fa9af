use serde::{Deserialize, Serialize};

/// Raw counts for one scope (a single game, or a whole assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCounts {
    pub unique_correct_items: u32,
    pub items_required: u32,
}

impl CompletionCounts {
    #[must_use]
    pub fn new(unique_correct_items: u32, items_required: u32) -> Self {
        Self {
            unique_correct_items,
            items_required,
        }
    }
}

/// Completion state for one game within one assignment, plus the
/// assignment-level aggregate.
///
/// Ephemeral: recomputed on demand from store counts, never persisted by this
/// subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCompletionStatus {
    unique_correct_items: u32,
    items_required: u32,
    progress_percentage: u8,
    is_complete: bool,
    assignment_progress: u8,
    is_assignment_complete: bool,
}

impl GameCompletionStatus {
    /// Evaluate completion from raw counts. Pure and total.
    ///
    /// A zero `items_required` is treated as already complete (100%) rather
    /// than a division error, so misconfigured data degrades safely.
    /// Over-completion clamps the percentage to 100; an incomplete scope
    /// never rounds up to 100.
    #[must_use]
    pub fn evaluate(game: CompletionCounts, assignment: CompletionCounts) -> Self {
        Self {
            unique_correct_items: game.unique_correct_items,
            items_required: game.items_required,
            progress_percentage: percentage(game),
            is_complete: is_complete(game),
            assignment_progress: percentage(assignment),
            is_assignment_complete: is_complete(assignment),
        }
    }

    /// Rehydrate a status from store-computed fields (e.g. an HTTP store
    /// response), re-deriving the percentage and completion flags locally so
    /// the invariants hold regardless of what the store sent.
    #[must_use]
    pub fn from_store(
        game: CompletionCounts,
        assignment_progress: u8,
        is_assignment_complete: bool,
    ) -> Self {
        Self {
            unique_correct_items: game.unique_correct_items,
            items_required: game.items_required,
            progress_percentage: percentage(game),
            is_complete: is_complete(game),
            assignment_progress: assignment_progress.min(100),
            is_assignment_complete,
        }
    }

    #[must_use]
    pub fn unique_correct_items(&self) -> u32 {
        self.unique_correct_items
    }

    #[must_use]
    pub fn items_required(&self) -> u32 {
        self.items_required
    }

    /// Rounded completion percentage, clamped to `[0, 100]`.
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        self.progress_percentage
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    #[must_use]
    pub fn assignment_progress(&self) -> u8 {
        self.assignment_progress
    }

    #[must_use]
    pub fn is_assignment_complete(&self) -> bool {
        self.is_assignment_complete
    }

    /// Items still needed to complete the game. Saturates at zero when
    /// over-complete.
    #[must_use]
    pub fn items_remaining(&self) -> u32 {
        self.items_required.saturating_sub(self.unique_correct_items)
    }
}

fn is_complete(counts: CompletionCounts) -> bool {
    counts.unique_correct_items >= counts.items_required
}

fn percentage(counts: CompletionCounts) -> u8 {
    if counts.items_required == 0 {
        return 100;
    }
    let correct = u64::from(counts.unique_correct_items);
    let required = u64::from(counts.items_required);
    // Round half up in integer math. An unfinished scope must never display
    // 100%, so rounding is capped at 99 below the threshold.
    let pct = (correct * 100 + required / 2) / required;
    let ceiling: u64 = if counts.unique_correct_items < counts.items_required {
        99
    } else {
        100
    };
    u8::try_from(pct.min(ceiling)).unwrap_or(99)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(correct: u32, required: u32) -> CompletionCounts {
        CompletionCounts::new(correct, required)
    }

    #[test]
    fn incomplete_below_threshold() {
        let status = GameCompletionStatus::evaluate(counts(4, 10), counts(4, 30));
        assert!(!status.is_complete());
        assert_eq!(status.progress_percentage(), 40);
        assert_eq!(status.items_remaining(), 6);
        assert_eq!(status.assignment_progress(), 13);
        assert!(!status.is_assignment_complete());
    }

    #[test]
    fn complete_at_threshold() {
        let status = GameCompletionStatus::evaluate(counts(10, 10), counts(10, 30));
        assert!(status.is_complete());
        assert_eq!(status.progress_percentage(), 100);
        assert_eq!(status.items_remaining(), 0);
    }

    #[test]
    fn over_completion_clamps_to_100() {
        let status = GameCompletionStatus::evaluate(counts(15, 10), counts(15, 10));
        assert!(status.is_complete());
        assert_eq!(status.progress_percentage(), 100);
        assert_eq!(status.assignment_progress(), 100);
        assert_eq!(status.items_remaining(), 0);
    }

    #[test]
    fn zero_required_is_already_complete() {
        let status = GameCompletionStatus::evaluate(counts(0, 0), counts(0, 0));
        assert!(status.is_complete());
        assert_eq!(status.progress_percentage(), 100);
        assert!(status.is_assignment_complete());
    }

    #[test]
    fn percentage_rounds_half_up() {
        // 1/3 = 33.3% -> 33, 2/3 = 66.7% -> 67, 1/8 = 12.5% -> 13
        assert_eq!(percentage(counts(1, 3)), 33);
        assert_eq!(percentage(counts(2, 3)), 67);
        assert_eq!(percentage(counts(1, 8)), 13);
    }

    #[test]
    fn incomplete_is_strictly_below_100() {
        for correct in 0..10 {
            let pct = percentage(counts(correct, 10));
            assert!(pct < 100, "{correct}/10 gave {pct}");
        }
    }

    #[test]
    fn near_complete_rounding_stays_below_100() {
        // 199/200 would round up to 100; one missing item must still read 99.
        let status = GameCompletionStatus::evaluate(counts(199, 200), counts(199, 400));
        assert!(!status.is_complete());
        assert_eq!(status.progress_percentage(), 99);
        assert_eq!(status.items_remaining(), 1);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let a = GameCompletionStatus::evaluate(counts(7, 12), counts(7, 40));
        let b = GameCompletionStatus::evaluate(counts(7, 12), counts(7, 40));
        assert_eq!(a, b);
    }

    #[test]
    fn percentage_never_decreases_with_more_correct_items() {
        let mut last = 0;
        for correct in 0..=12 {
            let pct = percentage(counts(correct, 12));
            assert!(pct >= last);
            last = pct;
        }
    }

    #[test]
    fn from_store_rederives_game_fields() {
        let status = GameCompletionStatus::from_store(counts(10, 10), 250, false);
        assert!(status.is_complete());
        assert_eq!(status.progress_percentage(), 100);
        // Assignment progress is taken from the store but clamped.
        assert_eq!(status.assignment_progress(), 100);
        assert!(!status.is_assignment_complete());
    }
}
