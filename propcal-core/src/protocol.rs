//! Entity-store adapter protocol types.
//!
//! Defines the JSON protocol spoken between the calendar engine and a
//! store adapter binary over stdin/stdout. The protocol is
//! language-agnostic: any executable that speaks it can serve records.

use serde::{Deserialize, Serialize};

/// Commands that store adapters must implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    List,
    Create,
    Update,
    Delete,
}

/// Request sent from the engine to the adapter.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the adapter to the engine.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap()
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap()
    }
}
