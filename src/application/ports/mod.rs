pub mod connectivity;
pub mod notifier;
pub mod queue_store;
pub mod remote_store;

pub use connectivity::Connectivity;
pub use notifier::{Notice, Notifier};
pub use queue_store::QueueStore;
pub use remote_store::{RemoteStoreError, WorkoutRemote};
