//! Core types for the propcal calendar engine.
//!
//! This crate holds the pure half of the engine, shared by the service
//! layer and by store adapters:
//! - source record and `UnifiedEvent` types with the capability table
//! - recurrence rules and window-bounded expansion
//! - normalization of the six feeds into unified events
//! - view-window resolution and predicate filtering
//! - the `protocol` module for engine-adapter communication

pub mod error;
pub mod event;
pub mod filter;
pub mod normalize;
pub mod protocol;
pub mod recurrence;
pub mod source;
pub mod window;

pub use error::{CalendarError, CalendarResult};
pub use event::UnifiedEvent;
pub use filter::{EventQuery, filter_events};
pub use normalize::normalize;
pub use recurrence::{ExpansionLimits, Frequency, RecurrenceEnd, RecurrenceRule, expand_event};
pub use source::{
    CalendarEventRecord, ClientMeetingRecord, ComplianceRecord, ProposalRecord,
    ProposalTaskRecord, ReviewRoundRecord, SourceRecord, SourceType,
};
pub use window::{ViewMode, ViewWindow};
