pub mod submission_service;
pub mod sync_service;

pub use submission_service::{SaveOutcome, SaveTarget, SubmissionService};
pub use sync_service::{SyncService, SyncStatus};
