//! Error types for the propcal calendar engine.

use thiserror::Error;

use crate::source::SourceType;

/// Errors that can occur in calendar operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Store adapter '{0}' not found in PATH")]
    StoreAdapterNotInstalled(String),

    #[error("Store request timed out after {0}s")]
    StoreTimeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("{0} events cannot be rescheduled by dragging")]
    NotReschedulable(SourceType),

    #[error("Recurring occurrences cannot be moved individually; edit the series instead")]
    RecurringInstanceDrag,

    #[error("Deleting a recurring event removes every occurrence; pass delete_all_occurrences to confirm")]
    RecurringDeleteUnconfirmed,

    #[error("Reschedule write failed: {0}")]
    RescheduleWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
