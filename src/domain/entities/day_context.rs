use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Denormalized UI context captured alongside a queued write (which weekday
/// of the split was selected, for which date and time). Diagnostic only; the
/// drainer never reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayContext {
    pub weekday: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl DayContext {
    pub fn new(weekday: String, date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self {
            weekday,
            date,
            time,
        }
    }
}
