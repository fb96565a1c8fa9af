//! Decision logic for a student leaving an activity.

use crate::model::GameCompletionStatus;

/// What to do when the student asks to leave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitDecision {
    /// Leave immediately, no dialog.
    ExitNow,
    /// Ask for confirmation before discarding in-progress work.
    ConfirmExit {
        progress_percentage: u8,
        items_remaining: u32,
    },
}

/// Exit rule table:
///
/// | Condition | Decision |
/// |---|---|
/// | not in assignment mode | exit now |
/// | no evaluated status yet | exit now |
/// | game complete | exit now |
/// | incomplete, no correct items | exit now |
/// | incomplete with progress | confirm with percentage + remaining |
#[must_use]
pub fn decide_exit(
    assignment_mode: bool,
    status: Option<&GameCompletionStatus>,
) -> ExitDecision {
    if !assignment_mode {
        return ExitDecision::ExitNow;
    }
    let Some(status) = status else {
        return ExitDecision::ExitNow;
    };
    if status.is_complete() || status.unique_correct_items() == 0 {
        return ExitDecision::ExitNow;
    }
    ExitDecision::ConfirmExit {
        progress_percentage: status.progress_percentage(),
        items_remaining: status.items_remaining(),
    }
}
