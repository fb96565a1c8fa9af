//! Typed event channel between a game and its completion tracker.
//!
//! Games hold a cloneable [`GameEvents`] handle, the tracker runs in
//! [`TrackerLoop`], and read-only consumers observe status through a watch
//! channel, so the event contract is explicit instead of an ambient
//! broadcast bus. Dropping every
//! `GameEvents` handle (unmounting the game) ends the loop; in-flight store
//! calls finish on their own and their results are discarded with the loop.

use tokio::sync::{mpsc, watch};

use progress_core::model::{GameCompletionStatus, ItemAnswered};

use crate::tracker::{CompletionTracker, TrackerSignal};

/// Sender handle injected into game components.
#[derive(Clone)]
pub struct GameEvents {
    tx: mpsc::UnboundedSender<ItemAnswered>,
}

impl GameEvents {
    /// Emit an answered-item event. A closed channel means the tracker is
    /// gone and the session is over, so the event is silently dropped.
    pub fn emit(&self, event: ItemAnswered) {
        let _ = self.tx.send(event);
    }
}

/// Read-only view of the tracker for the presentation layer.
pub struct TrackerSubscription {
    /// Latest evaluated status; `None` until the first successful fetch.
    pub status: watch::Receiver<Option<GameCompletionStatus>>,
    /// One-shot signals (completion reached).
    pub signals: mpsc::UnboundedReceiver<TrackerSignal>,
}

/// Owns the tracker and drains the event channel in FIFO order.
pub struct TrackerLoop {
    tracker: CompletionTracker,
    events: mpsc::UnboundedReceiver<ItemAnswered>,
    status_tx: watch::Sender<Option<GameCompletionStatus>>,
    signal_tx: mpsc::UnboundedSender<TrackerSignal>,
}

/// Wire a tracker to its channels.
#[must_use]
pub fn tracker_channel(
    tracker: CompletionTracker,
) -> (GameEvents, TrackerSubscription, TrackerLoop) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(tracker.status().copied());
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();

    (
        GameEvents { tx: event_tx },
        TrackerSubscription {
            status: status_rx,
            signals: signal_rx,
        },
        TrackerLoop {
            tracker,
            events: event_rx,
            status_tx,
            signal_tx,
        },
    )
}

impl TrackerLoop {
    /// Run the mount-time evaluation, then process events until every
    /// `GameEvents` handle has been dropped.
    pub async fn run(mut self) {
        if let Some(signal) = self.tracker.initialize().await {
            let _ = self.signal_tx.send(signal);
        }
        self.publish_status();

        while let Some(event) = self.events.recv().await {
            if let Some(signal) = self.tracker.on_item_answered(event).await {
                let _ = self.signal_tx.send(signal);
            }
            self.publish_status();
        }

        tracing::debug!("game event channel closed; tracker loop ending");
    }

    fn publish_status(&self) {
        let current = self.tracker.status().copied();
        self.status_tx.send_if_modified(|status| {
            if *status == current {
                false
            } else {
                *status = current;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use progress_core::model::{
        AssignmentId, GameId, ItemId, StudentId, TrackerConfigDraft,
    };
    use progress_core::time::fixed_clock;
    use storage::repository::{AssignmentGame, AssignmentRecord};

    use crate::store::ProgressStoreService;
    use crate::tracker::AssignmentContext;

    async fn seeded_tracker() -> (ProgressStoreService, AssignmentContext, CompletionTracker) {
        let service = ProgressStoreService::in_memory(fixed_clock());
        let assignment_id = AssignmentId::random();
        let game_id = GameId::new("memory-game").unwrap();
        service
            .repository()
            .upsert_assignment(&AssignmentRecord {
                id: assignment_id,
                name: "Channel test".to_string(),
                games: vec![AssignmentGame {
                    game_id: game_id.clone(),
                    items_required: 3,
                }],
            })
            .await
            .unwrap();

        let context = AssignmentContext {
            assignment_id,
            student_id: StudentId::random(),
            game_id,
        };
        let tracker = CompletionTracker::new(
            Arc::new(service.clone()),
            Some(context.clone()),
            TrackerConfigDraft::new().validate().unwrap(),
        )
        .with_clock(fixed_clock());

        (service, context, tracker)
    }

    #[tokio::test]
    async fn loop_processes_events_and_signals_completion() {
        let (service, context, tracker) = seeded_tracker().await;
        let (events, mut subscription, tracker_loop) = tracker_channel(tracker);
        let handle = tokio::spawn(tracker_loop.run());

        for n in 1..=3 {
            let item = ItemId::new(format!("w{n}")).unwrap();
            service
                .record_correct_item(
                    context.assignment_id,
                    context.student_id,
                    &context.game_id,
                    &item,
                )
                .await
                .unwrap();
            events.emit(ItemAnswered::correct(item));
        }

        let signal = subscription.signals.recv().await.unwrap();
        assert!(matches!(
            signal,
            TrackerSignal::CompletionReached(status) if status.is_complete()
        ));

        // Dropping the sender ends the loop.
        drop(events);
        handle.await.unwrap();

        let status = (*subscription.status.borrow()).unwrap();
        assert!(status.is_complete());
        assert_eq!(status.unique_correct_items(), 3);
    }

    #[tokio::test]
    async fn status_watch_reflects_initial_evaluation() {
        let (_service, _context, tracker) = seeded_tracker().await;
        let (events, mut subscription, tracker_loop) = tracker_channel(tracker);
        let handle = tokio::spawn(tracker_loop.run());

        subscription.status.changed().await.unwrap();
        let status = (*subscription.status.borrow_and_update()).unwrap();
        assert_eq!(status.unique_correct_items(), 0);
        assert!(!status.is_complete());

        drop(events);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn emit_after_loop_ends_is_harmless() {
        let (_service, _context, tracker) = seeded_tracker().await;
        let (events, _subscription, tracker_loop) = tracker_channel(tracker);
        drop(tracker_loop);

        // No receiver anymore; emit must not panic.
        events.emit(ItemAnswered::correct_unattributed());
    }
}
