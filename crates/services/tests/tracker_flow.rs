use std::sync::Arc;

use progress_core::exit::ExitDecision;
use progress_core::model::{
    AssignmentId, GameId, ItemAnswered, ItemId, StudentId, TrackerConfigDraft,
};
use progress_core::time::fixed_clock;
use services::{
    AssignmentContext, CompletionTracker, ProgressStoreService, TrackerSignal, tracker_channel,
};
use storage::repository::{AssignmentGame, AssignmentRecord};

struct Session {
    store: ProgressStoreService,
    assignment_id: AssignmentId,
    student_id: StudentId,
}

impl Session {
    async fn seed() -> Self {
        let store = ProgressStoreService::in_memory(fixed_clock());
        let assignment_id = AssignmentId::random();
        store
            .repository()
            .upsert_assignment(&AssignmentRecord {
                id: assignment_id,
                name: "Spanish week 4".to_string(),
                games: vec![
                    AssignmentGame {
                        game_id: GameId::new("memory-game").unwrap(),
                        items_required: 4,
                    },
                    AssignmentGame {
                        game_id: GameId::new("hangman").unwrap(),
                        items_required: 2,
                    },
                ],
            })
            .await
            .unwrap();
        Self {
            store,
            assignment_id,
            student_id: StudentId::random(),
        }
    }

    fn tracker(&self, game: &str) -> CompletionTracker {
        CompletionTracker::new(
            Arc::new(self.store.clone()),
            Some(AssignmentContext {
                assignment_id: self.assignment_id,
                student_id: self.student_id,
                game_id: GameId::new(game).unwrap(),
            }),
            TrackerConfigDraft::new().validate().unwrap(),
        )
        .with_clock(fixed_clock())
    }

    async fn play(&self, game: &str, items: &[&str], events: &services::GameEvents) {
        let game_id = GameId::new(game).unwrap();
        for item in items {
            let item_id = ItemId::new(*item).unwrap();
            self.store
                .record_correct_item(self.assignment_id, self.student_id, &game_id, &item_id)
                .await
                .unwrap();
            events.emit(ItemAnswered::correct(item_id));
        }
    }
}

#[tokio::test]
async fn full_assignment_flow_across_two_games() {
    let session = Session::seed().await;

    // First game: play to completion through the event channel.
    let (events, mut subscription, tracker_loop) = tracker_channel(session.tracker("memory-game"));
    let handle = tokio::spawn(tracker_loop.run());

    session
        .play("memory-game", &["sol", "luna", "mar", "cielo"], &events)
        .await;

    let TrackerSignal::CompletionReached(status) = subscription.signals.recv().await.unwrap();
    assert!(status.is_complete());
    assert_eq!(status.unique_correct_items(), 4);
    // Hangman is untouched, so the assignment is not done yet: 4 of 6 items.
    assert!(!status.is_assignment_complete());
    assert_eq!(status.assignment_progress(), 67);

    drop(events);
    handle.await.unwrap();

    // Second game finishes the assignment.
    let (events, mut subscription, tracker_loop) = tracker_channel(session.tracker("hangman"));
    let handle = tokio::spawn(tracker_loop.run());

    session.play("hangman", &["pan", "agua"], &events).await;

    let TrackerSignal::CompletionReached(status) = subscription.signals.recv().await.unwrap();
    assert!(status.is_complete());
    assert!(status.is_assignment_complete());
    assert_eq!(status.assignment_progress(), 100);

    drop(events);
    handle.await.unwrap();
}

#[tokio::test]
async fn partial_progress_prompts_exit_confirmation() {
    let session = Session::seed().await;
    let mut tracker = session.tracker("memory-game");
    tracker.initialize().await;

    let game_id = GameId::new("memory-game").unwrap();
    for item in ["sol", "luna", "mar"] {
        let item_id = ItemId::new(item).unwrap();
        session
            .store
            .record_correct_item(session.assignment_id, session.student_id, &game_id, &item_id)
            .await
            .unwrap();
        tracker.on_item_answered(ItemAnswered::correct(item_id)).await;
    }

    assert_eq!(
        tracker.request_exit(),
        ExitDecision::ConfirmExit {
            progress_percentage: 75,
            items_remaining: 1,
        }
    );
}
