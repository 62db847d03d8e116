use async_trait::async_trait;
use tokio::sync::watch;

/// Platform connectivity signal: a current flag plus transition events.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;

    /// Receiver that yields the online flag on every transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
