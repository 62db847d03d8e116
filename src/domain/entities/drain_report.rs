use serde::{Deserialize, Serialize};

/// Outcome of one drain pass over the queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainReport {
    pub synced_count: u32,
    pub failed_count: u32,
    pub dead_lettered_count: u32,
    pub remaining_count: u32,
}

impl DrainReport {
    pub fn new(
        synced_count: u32,
        failed_count: u32,
        dead_lettered_count: u32,
        remaining_count: u32,
    ) -> Self {
        Self {
            synced_count,
            failed_count,
            dead_lettered_count,
            remaining_count,
        }
    }

    pub fn drained_everything(&self) -> bool {
        self.remaining_count == 0
    }
}
