pub mod entry_id;
pub mod entry_status;
pub mod remote_row_id;
pub mod user_id;
pub mod workout_payload;
pub mod write_op;

pub use entry_id::EntryId;
pub use entry_status::EntryStatus;
pub use remote_row_id::RemoteRowId;
pub use user_id::UserId;
pub use workout_payload::WorkoutPayload;
pub use write_op::WriteOp;
