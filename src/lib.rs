//! Offline-first write queue and sync engine for a personal workout
//! tracker. Saves are routed directly to the remote store while online, and
//! captured in a durable local queue (SQLite) when the network is out or a
//! write fails with a connectivity-class error; the queue is replayed in
//! FIFO order once connectivity returns.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{
    Connectivity, Notice, Notifier, QueueStore, RemoteStoreError, WorkoutRemote,
};
pub use application::services::{
    SaveOutcome, SaveTarget, SubmissionService, SyncService, SyncStatus,
};
pub use domain::entities::{
    DayContext, DrainReport, QueueEntry, QueueEntryDraft, WorkoutDraft, WorkoutRecord,
};
pub use domain::value_objects::{
    EntryId, EntryStatus, RemoteRowId, UserId, WorkoutPayload, WriteOp,
};
pub use infrastructure::connectivity::ConnectivityMonitor;
pub use infrastructure::database::ConnectionPool;
pub use infrastructure::notifier::{BroadcastNotifier, TracingNotifier};
pub use infrastructure::queue::SqliteQueueStore;
pub use shared::config::{AppConfig, DatabaseConfig, SyncConfig};
pub use shared::error::AppError;

/// Installs the tracing pipeline. Intended for binaries; embedding
/// applications usually bring their own subscriber.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liftlog_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
