pub mod day_context;
pub mod drain_report;
pub mod queue_entry;
pub mod workout;

pub use day_context::DayContext;
pub use drain_report::DrainReport;
pub use queue_entry::{QueueEntry, QueueEntryDraft};
pub use workout::{WorkoutDraft, WorkoutRecord};
