use crate::application::ports::notifier::{Notice, Notifier};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Logs notices through the tracing pipeline. For headless embeddings and
/// the maintenance tooling.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::WentOffline => warn!("Connection lost; saves will be queued locally"),
            Notice::BackOnline => info!("Back online"),
            Notice::Saved => info!("Workout saved"),
            Notice::SavedLocally { pending } => {
                info!("Workout saved locally; {pending} pending sync")
            }
            Notice::SyncDeferred { pending } => {
                warn!("Sync interrupted; {pending} entries will retry")
            }
            Notice::DeadLettered { entry_id } => {
                warn!("Entry {entry_id} exhausted its retries and needs manual attention")
            }
            Notice::AllSynced => info!("All workouts synced"),
        }
    }
}

/// Fans notices out on a broadcast channel for an embedding UI to render as
/// transient toasts. Send failures mean no subscriber is listening, which is
/// fine for fire-and-forget notices.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_notifier_delivers_to_subscribers() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.notify(Notice::AllSynced);

        assert_eq!(rx.recv().await.unwrap(), Notice::AllSynced);
    }

    #[test]
    fn broadcast_notifier_without_subscribers_is_a_noop() {
        let notifier = BroadcastNotifier::new(8);
        notifier.notify(Notice::Saved);
    }
}
