//! Plain-string progress labels for dialogs and headers.
//!
//! Presentation-agnostic on purpose: no locale handling, no markup. The host
//! UI can replace these wholesale if it needs localization.

use progress_core::model::GameCompletionStatus;

/// "4 / 10 words (40%)"
#[must_use]
pub fn game_progress(status: &GameCompletionStatus) -> String {
    format!(
        "{} / {} words ({}%)",
        status.unique_correct_items(),
        status.items_required(),
        status.progress_percentage()
    )
}

/// "3 words to go" / "1 word to go" / "done"
#[must_use]
pub fn remaining_label(items_remaining: u32) -> String {
    match items_remaining {
        0 => "done".to_string(),
        1 => "1 word to go".to_string(),
        n => format!("{n} words to go"),
    }
}

/// "Assignment: 67% complete"
#[must_use]
pub fn assignment_progress(status: &GameCompletionStatus) -> String {
    if status.is_assignment_complete() {
        "Assignment complete".to_string()
    } else {
        format!("Assignment: {}% complete", status.assignment_progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::CompletionCounts;

    fn status(correct: u32, required: u32) -> GameCompletionStatus {
        GameCompletionStatus::evaluate(
            CompletionCounts::new(correct, required),
            CompletionCounts::new(correct, required + 20),
        )
    }

    #[test]
    fn formats_game_progress() {
        assert_eq!(game_progress(&status(4, 10)), "4 / 10 words (40%)");
    }

    #[test]
    fn pluralizes_remaining() {
        assert_eq!(remaining_label(0), "done");
        assert_eq!(remaining_label(1), "1 word to go");
        assert_eq!(remaining_label(3), "3 words to go");
    }

    #[test]
    fn formats_assignment_progress() {
        assert_eq!(assignment_progress(&status(4, 10)), "Assignment: 13% complete");
    }

    #[test]
    fn complete_assignment_has_fixed_label() {
        let status = GameCompletionStatus::evaluate(
            CompletionCounts::new(10, 10),
            CompletionCounts::new(30, 30),
        );
        assert_eq!(assignment_progress(&status), "Assignment complete");
    }
}
