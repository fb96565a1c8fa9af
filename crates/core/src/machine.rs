//! Completion state machine for one game session.
//!
//! An explicit machine with a single `transition` entry point, so the
//! completion lifecycle can be tested without any UI attached.

use crate::model::GameCompletionStatus;

/// Lifecycle phase of the session's completion tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionPhase {
    /// No evaluation has happened yet.
    NotStarted,
    /// A store fetch is in flight.
    Evaluating,
    /// Last evaluation found the game below its threshold.
    Incomplete,
    /// Threshold crossed. Terminal for the session.
    Complete,
}

/// Inputs to the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineEvent {
    EvaluationStarted,
    Evaluated(GameCompletionStatus),
    EvaluationFailed,
}

/// One-shot outputs of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionSignal {
    /// The game just crossed its completion threshold. Fired at most once
    /// per session; this is what pops the completion modal.
    CompletionReached(GameCompletionStatus),
}

/// Session-scoped completion machine.
///
/// Invariants:
/// - `Incomplete -> Complete` is one-way; a later status claiming the game is
///   incomplete again does not regress the phase.
/// - `CompletionSignal::CompletionReached` fires exactly once.
/// - A failed evaluation keeps the last successfully evaluated status
///   (last-known-good), so a flaky store can only delay the modal, never
///   falsely complete the game.
#[derive(Clone, Debug)]
pub struct CompletionMachine {
    phase: CompletionPhase,
    last_status: Option<GameCompletionStatus>,
    completed_once: bool,
}

impl CompletionMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: CompletionPhase::NotStarted,
            last_status: None,
            completed_once: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> CompletionPhase {
        self.phase
    }

    /// Last successfully evaluated status, if any.
    #[must_use]
    pub fn status(&self) -> Option<&GameCompletionStatus> {
        self.last_status.as_ref()
    }

    #[must_use]
    pub fn completed_once(&self) -> bool {
        self.completed_once
    }

    /// Apply an event and return the signal it produced, if any.
    pub fn transition(&mut self, event: MachineEvent) -> Option<CompletionSignal> {
        match event {
            MachineEvent::EvaluationStarted => {
                if !self.completed_once {
                    self.phase = CompletionPhase::Evaluating;
                }
                None
            }
            MachineEvent::Evaluated(status) => self.apply_status(status),
            MachineEvent::EvaluationFailed => {
                self.phase = self.settled_phase();
                None
            }
        }
    }

    fn apply_status(&mut self, status: GameCompletionStatus) -> Option<CompletionSignal> {
        if self.completed_once {
            // Terminal: refresh the status for display, but never regress.
            if status.is_complete() {
                self.last_status = Some(status);
            }
            self.phase = CompletionPhase::Complete;
            return None;
        }

        self.last_status = Some(status);
        if status.is_complete() {
            self.phase = CompletionPhase::Complete;
            self.completed_once = true;
            Some(CompletionSignal::CompletionReached(status))
        } else {
            self.phase = CompletionPhase::Incomplete;
            None
        }
    }

    fn settled_phase(&self) -> CompletionPhase {
        if self.completed_once {
            CompletionPhase::Complete
        } else if self.last_status.is_some() {
            CompletionPhase::Incomplete
        } else {
            CompletionPhase::NotStarted
        }
    }
}

impl Default for CompletionMachine {
    fn default() -> Self {
        Self::new()
    }
}
