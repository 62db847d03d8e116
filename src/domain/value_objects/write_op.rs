use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote write a queue entry replays: insert a new workout row,
/// or update an existing one by row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    Create,
    Update,
}

impl WriteOp {
    pub fn as_str(&self) -> &str {
        match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "create" => Ok(WriteOp::Create),
            "update" => Ok(WriteOp::Update),
            other => Err(format!("Unknown write op: {other}")),
        }
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
