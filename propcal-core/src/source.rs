//! Source record types for the six calendar feeds.
//!
//! Each feed is owned by another subsystem (proposal management, compliance
//! tracking, meeting scheduling); the calendar only creates and deletes
//! records in the native `CalendarEvent` collection. Everything else is
//! read-only here apart from date rescheduling.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceRule;

/// The origin feed a unified event was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    CalendarEvent,
    ProposalTask,
    ProposalDeadline,
    ReviewDeadline,
    ComplianceDue,
    ClientMeeting,
}

impl SourceType {
    /// Whether a non-instance event of this type can be dragged to a new
    /// date. Recurring instances are never draggable regardless of this.
    pub fn can_drag(&self) -> bool {
        matches!(
            self,
            SourceType::CalendarEvent | SourceType::ProposalTask | SourceType::ClientMeeting
        )
    }

    /// Whether events of this type can be edited from the calendar.
    /// For recurring instances this means editing the series.
    pub fn can_edit(&self) -> bool {
        matches!(self, SourceType::CalendarEvent)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceType::CalendarEvent => "Calendar event",
            SourceType::ProposalTask => "Proposal task",
            SourceType::ProposalDeadline => "Proposal deadline",
            SourceType::ReviewDeadline => "Review deadline",
            SourceType::ComplianceDue => "Compliance deadline",
            SourceType::ClientMeeting => "Client meeting",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A native calendar event, owned by the calendar itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    /// Stored loosely by the backend (object or JSON-encoded string);
    /// parsed once at the boundary via [`CalendarEventRecord::recurrence`].
    #[serde(default)]
    pub recurrence_rule: Option<serde_json::Value>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl CalendarEventRecord {
    /// Parse the stored recurrence rule, if any. A malformed rule is
    /// treated as absent so a bad rule degrades the event to
    /// non-recurring instead of breaking expansion.
    pub fn recurrence(&self) -> Option<RecurrenceRule> {
        self.recurrence_rule.as_ref().and_then(RecurrenceRule::from_value)
    }
}

/// A task on a proposal, surfaced on the calendar by its due date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalTaskRecord {
    pub id: String,
    pub proposal_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assigned_to_email: Option<String>,
}

/// A proposal; its submission due date becomes a deadline on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: String,
    pub organization_id: String,
    pub proposal_name: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// A color-team review round with its own deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRoundRecord {
    pub id: String,
    pub proposal_id: String,
    pub round_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// A compliance requirement with a due date and risk level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub id: String,
    pub proposal_id: String,
    pub requirement_title: String,
    #[serde(default)]
    pub requirement_description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub risk_level: Option<String>,
}

/// A scheduled meeting with the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMeetingRecord {
    pub id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub meeting_title: String,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
}

/// A record from one of the six feeds, tagged by origin.
#[derive(Debug, Clone)]
pub enum SourceRecord {
    CalendarEvent(CalendarEventRecord),
    ProposalTask(ProposalTaskRecord),
    ProposalDeadline(ProposalRecord),
    ReviewDeadline(ReviewRoundRecord),
    ComplianceDue(ComplianceRecord),
    ClientMeeting(ClientMeetingRecord),
}

impl SourceRecord {
    pub fn source_type(&self) -> SourceType {
        match self {
            SourceRecord::CalendarEvent(_) => SourceType::CalendarEvent,
            SourceRecord::ProposalTask(_) => SourceType::ProposalTask,
            SourceRecord::ProposalDeadline(_) => SourceType::ProposalDeadline,
            SourceRecord::ReviewDeadline(_) => SourceType::ReviewDeadline,
            SourceRecord::ComplianceDue(_) => SourceType::ComplianceDue,
            SourceRecord::ClientMeeting(_) => SourceType::ClientMeeting,
        }
    }
}
