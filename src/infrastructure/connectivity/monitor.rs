use crate::application::ports::connectivity::Connectivity;
use async_trait::async_trait;
use tokio::sync::watch;

/// Bridges the platform's online/offline signal into the engine. Platform
/// glue (browser events, OS reachability callbacks, a heartbeat probe) calls
/// `set_online` / `set_offline`; the sync service observes transitions
/// through `subscribe`.
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn set_online(&self) {
        self.tx.send_replace(true);
    }

    pub fn set_offline(&self) {
        self.tx.send_replace(false);
    }
}

#[async_trait]
impl Connectivity for ConnectivityMonitor {
    async fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transitions_reach_subscribers() {
        let monitor = ConnectivityMonitor::new(false);
        let mut rx = monitor.subscribe();

        assert!(!monitor.is_online().await);

        monitor.set_online();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());

        monitor.set_offline();
        rx.changed().await.unwrap();
        assert!(!*rx.borrow());
    }
}
