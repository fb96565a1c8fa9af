use progress_core::exit::ExitDecision;
use progress_core::model::{AssignmentId, GameCompletionStatus};
use services::TrackerSignal;

/// Caller-supplied navigation contract. The progress subsystem owns no
/// routing; it only asks the host to move when a modal outcome requires it.
pub trait Navigator {
    fn go_to_assignment(&self, assignment_id: AssignmentId);
}

/// Which dialog, if any, is currently presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    /// Shown once when a game opens in assignment mode.
    Intro,
    /// Shown once when the completion threshold is crossed.
    Completion { status: GameCompletionStatus },
    /// Shown when the student tries to leave with unsaved progress.
    ExitConfirm {
        progress_percentage: u8,
        items_remaining: u32,
    },
}

/// Buttons available on the dialogs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalChoice {
    /// Dismiss the current dialog and continue in place.
    KeepPlaying,
    /// From the completion modal: navigate to the assignment overview.
    BackToAssignment,
    /// From the exit-confirmation modal: leave despite unfinished progress.
    ExitAnyway,
}

/// Result of asking to leave the activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitRequestOutcome {
    /// Nothing to lose; the host should navigate away now.
    Exit,
    /// A confirmation dialog was opened instead.
    ConfirmationShown,
}

/// Result of a modal button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalOutcome {
    Stayed,
    Navigated,
}

/// Dialog state for one game session.
///
/// Carries no business logic: completion one-shot semantics live in the
/// tracker's state machine, and the exit rule table lives in
/// `progress_core::exit`. This type only turns their outputs into dialog
/// state and routes button presses.
pub struct ModalVm {
    assignment_id: Option<AssignmentId>,
    active: ActiveModal,
    intro_shown: bool,
}

impl ModalVm {
    #[must_use]
    pub fn new(assignment_id: Option<AssignmentId>) -> Self {
        Self {
            assignment_id,
            active: ActiveModal::None,
            intro_shown: false,
        }
    }

    #[must_use]
    pub fn active(&self) -> ActiveModal {
        self.active
    }

    #[must_use]
    pub fn is_assignment_mode(&self) -> bool {
        self.assignment_id.is_some()
    }

    /// Show the intro dialog, once, in assignment mode only.
    pub fn present_intro(&mut self) {
        if self.is_assignment_mode() && !self.intro_shown {
            self.intro_shown = true;
            self.active = ActiveModal::Intro;
        }
    }

    /// React to a tracker signal. The tracker guarantees the completion
    /// signal fires at most once per session.
    pub fn on_signal(&mut self, signal: TrackerSignal) {
        match signal {
            TrackerSignal::CompletionReached(status) => {
                self.active = ActiveModal::Completion { status };
            }
        }
    }

    /// Apply an exit decision from the tracker.
    pub fn apply_exit_decision(&mut self, decision: ExitDecision) -> ExitRequestOutcome {
        match decision {
            ExitDecision::ExitNow => ExitRequestOutcome::Exit,
            ExitDecision::ConfirmExit {
                progress_percentage,
                items_remaining,
            } => {
                self.active = ActiveModal::ExitConfirm {
                    progress_percentage,
                    items_remaining,
                };
                ExitRequestOutcome::ConfirmationShown
            }
        }
    }

    /// Dismiss whatever dialog is open without any other state change.
    pub fn dismiss(&mut self) {
        self.active = ActiveModal::None;
    }

    /// Handle a button press on the current dialog.
    ///
    /// A choice that does not belong to the open dialog is ignored rather
    /// than surfaced as an error; the subsystem must never interrupt
    /// gameplay.
    pub fn choose(&mut self, choice: ModalChoice, navigator: &dyn Navigator) -> ModalOutcome {
        match (self.active, choice) {
            (ActiveModal::Intro, ModalChoice::KeepPlaying)
            | (ActiveModal::Completion { .. }, ModalChoice::KeepPlaying)
            | (ActiveModal::ExitConfirm { .. }, ModalChoice::KeepPlaying) => {
                self.dismiss();
                ModalOutcome::Stayed
            }
            (ActiveModal::Completion { .. }, ModalChoice::BackToAssignment)
            | (ActiveModal::ExitConfirm { .. }, ModalChoice::ExitAnyway) => {
                self.dismiss();
                if let Some(assignment_id) = self.assignment_id {
                    navigator.go_to_assignment(assignment_id);
                }
                ModalOutcome::Navigated
            }
            _ => ModalOutcome::Stayed,
        }
    }
}
