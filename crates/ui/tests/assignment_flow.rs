//! End-to-end flow: store -> tracker -> event channel -> modal view-model.

use std::sync::{Arc, Mutex};

use progress_core::model::{
    AssignmentId, GameId, ItemAnswered, ItemId, StudentId, TrackerConfigDraft,
};
use progress_core::time::fixed_clock;
use services::{
    AssignmentContext, CompletionTracker, ProgressStoreService, tracker_channel,
};
use storage::repository::{AssignmentGame, AssignmentRecord};
use ui::{ActiveModal, ExitRequestOutcome, ModalChoice, ModalOutcome, ModalVm, Navigator};

#[derive(Default)]
struct RecordingNavigator {
    visited: Mutex<Vec<AssignmentId>>,
}

impl Navigator for RecordingNavigator {
    fn go_to_assignment(&self, assignment_id: AssignmentId) {
        self.visited.lock().unwrap().push(assignment_id);
    }
}

#[tokio::test]
async fn completion_modal_flow_end_to_end() {
    let store = ProgressStoreService::in_memory(fixed_clock());
    let assignment_id = AssignmentId::random();
    let student_id = StudentId::random();
    let game_id = GameId::new("memory-game").unwrap();
    store
        .repository()
        .upsert_assignment(&AssignmentRecord {
            id: assignment_id,
            name: "German colours".to_string(),
            games: vec![AssignmentGame {
                game_id: game_id.clone(),
                items_required: 3,
            }],
        })
        .await
        .unwrap();

    let tracker = CompletionTracker::new(
        Arc::new(store.clone()),
        Some(AssignmentContext {
            assignment_id,
            student_id,
            game_id: game_id.clone(),
        }),
        TrackerConfigDraft::new().validate().unwrap(),
    )
    .with_clock(fixed_clock());

    let (events, mut subscription, tracker_loop) = tracker_channel(tracker);
    let handle = tokio::spawn(tracker_loop.run());

    let mut vm = ModalVm::new(Some(assignment_id));
    vm.present_intro();
    assert_eq!(vm.active(), ActiveModal::Intro);
    let navigator = RecordingNavigator::default();
    vm.choose(ModalChoice::KeepPlaying, &navigator);

    for item in ["rot", "blau", "gelb"] {
        let item_id = ItemId::new(item).unwrap();
        store
            .record_correct_item(assignment_id, student_id, &game_id, &item_id)
            .await
            .unwrap();
        events.emit(ItemAnswered::correct(item_id));
    }

    let signal = subscription.signals.recv().await.unwrap();
    vm.on_signal(signal);
    assert!(matches!(vm.active(), ActiveModal::Completion { status } if status.is_complete()));

    let outcome = vm.choose(ModalChoice::BackToAssignment, &navigator);
    assert_eq!(outcome, ModalOutcome::Navigated);
    assert_eq!(navigator.visited.lock().unwrap().as_slice(), &[assignment_id]);

    drop(events);
    handle.await.unwrap();
}

#[tokio::test]
async fn exit_with_progress_requires_confirmation() {
    let store = ProgressStoreService::in_memory(fixed_clock());
    let assignment_id = AssignmentId::random();
    let student_id = StudentId::random();
    let game_id = GameId::new("hangman").unwrap();
    store
        .repository()
        .upsert_assignment(&AssignmentRecord {
            id: assignment_id,
            name: "German food".to_string(),
            games: vec![AssignmentGame {
                game_id: game_id.clone(),
                items_required: 5,
            }],
        })
        .await
        .unwrap();

    let mut tracker = CompletionTracker::new(
        Arc::new(store.clone()),
        Some(AssignmentContext {
            assignment_id,
            student_id,
            game_id: game_id.clone(),
        }),
        TrackerConfigDraft {
            check_interval: Some(2),
            fallback_items_required: None,
        }
        .validate()
        .unwrap(),
    )
    .with_clock(fixed_clock());
    tracker.initialize().await;

    for item in ["brot", "milch"] {
        let item_id = ItemId::new(item).unwrap();
        store
            .record_correct_item(assignment_id, student_id, &game_id, &item_id)
            .await
            .unwrap();
        tracker.on_item_answered(ItemAnswered::correct(item_id)).await;
    }

    let mut vm = ModalVm::new(Some(assignment_id));
    let navigator = RecordingNavigator::default();

    let outcome = vm.apply_exit_decision(tracker.request_exit());
    assert_eq!(outcome, ExitRequestOutcome::ConfirmationShown);
    assert_eq!(
        vm.active(),
        ActiveModal::ExitConfirm {
            progress_percentage: 40,
            items_remaining: 3,
        }
    );

    let outcome = vm.choose(ModalChoice::ExitAnyway, &navigator);
    assert_eq!(outcome, ModalOutcome::Navigated);
    assert_eq!(navigator.visited.lock().unwrap().as_slice(), &[assignment_id]);
}
