pub mod connectivity;
pub mod database;
pub mod notifier;
pub mod queue;
