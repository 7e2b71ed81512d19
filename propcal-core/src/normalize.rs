//! Normalization of source records into unified events.
//!
//! One deterministic mapping per source type. A record without a usable
//! due/scheduled date cannot be placed on a calendar and normalizes to
//! `None`; the aggregate silently excludes it.

use chrono::{DateTime, Duration, Utc};

use crate::event::UnifiedEvent;
use crate::source::{
    CalendarEventRecord, ClientMeetingRecord, ComplianceRecord, ProposalRecord,
    ProposalTaskRecord, ReviewRoundRecord, SourceRecord, SourceType,
};

/// Default meeting length when the record does not carry one.
const DEFAULT_MEETING_MINUTES: i64 = 60;

pub fn normalize(record: &SourceRecord) -> Option<UnifiedEvent> {
    match record {
        SourceRecord::CalendarEvent(event) => Some(native_event(event)),
        SourceRecord::ProposalTask(task) => {
            let due = task.due_date?;
            Some(
                base(
                    SourceType::ProposalTask,
                    &task.id,
                    task.title.clone(),
                    due,
                    due,
                )
                .with_description(task.description.clone())
                .with_priority(task.priority.clone())
                .with_assigned_to(task.assigned_to_email.clone())
                .with_proposal(Some(task.proposal_id.clone()))
                .mark_all_day()
                .apply_capabilities(),
            )
        }
        SourceRecord::ProposalDeadline(proposal) => {
            let due = proposal.due_date?;
            Some(
                base(
                    SourceType::ProposalDeadline,
                    &proposal.id,
                    format!("Proposal Due: {}", proposal.proposal_name),
                    due,
                    due,
                )
                .with_proposal(Some(proposal.id.clone()))
                .mark_all_day()
                .apply_capabilities(),
            )
        }
        SourceRecord::ReviewDeadline(round) => {
            let due = round.due_date?;
            Some(
                base(
                    SourceType::ReviewDeadline,
                    &round.id,
                    format!("Review: {}", round.round_name),
                    due,
                    due,
                )
                .with_description(round.description.clone())
                .with_proposal(Some(round.proposal_id.clone()))
                .mark_all_day()
                .apply_capabilities(),
            )
        }
        SourceRecord::ComplianceDue(requirement) => {
            let due = requirement.due_date?;
            Some(
                base(
                    SourceType::ComplianceDue,
                    &requirement.id,
                    format!("Compliance: {}", requirement.requirement_title),
                    due,
                    due,
                )
                .with_description(requirement.requirement_description.clone())
                .with_priority(priority_for_risk(requirement.risk_level.as_deref()))
                .with_proposal(Some(requirement.proposal_id.clone()))
                .mark_all_day()
                .apply_capabilities(),
            )
        }
        SourceRecord::ClientMeeting(meeting) => {
            let start = meeting.scheduled_date?;
            let minutes = meeting.duration_minutes.unwrap_or(DEFAULT_MEETING_MINUTES);
            let mut event = base(
                SourceType::ClientMeeting,
                &meeting.id,
                meeting.meeting_title.clone(),
                start,
                start + Duration::minutes(minutes.max(0)),
            )
            .with_description(meeting.agenda.clone());
            event.location = meeting.location.clone();
            event.meeting_link = meeting.meeting_link.clone();
            Some(event.apply_capabilities())
        }
    }
}

/// Map a non-recurring native event (or the series master) straight
/// through. Also used by expansion for rule-less events.
pub fn native_event(event: &CalendarEventRecord) -> UnifiedEvent {
    UnifiedEvent {
        id: event.id.clone(),
        original_id: event.id.clone(),
        source_type: SourceType::CalendarEvent,
        title: event.title.clone(),
        description: event.description.clone(),
        start_date: event.start_date,
        // Guard the end >= start invariant against bad source data
        end_date: event.end_date.max(event.start_date),
        location: event.location.clone(),
        meeting_link: event.meeting_link.clone(),
        priority: None,
        assigned_to: None,
        proposal_id: None,
        all_day: event.all_day,
        is_recurring_instance: false,
        can_drag: false,
        can_edit: false,
    }
    .apply_capabilities()
}

fn base(
    source_type: SourceType,
    id: &str,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> UnifiedEvent {
    UnifiedEvent {
        id: id.to_string(),
        original_id: id.to_string(),
        source_type,
        title,
        description: None,
        start_date: start,
        end_date: end.max(start),
        location: None,
        meeting_link: None,
        priority: None,
        assigned_to: None,
        proposal_id: None,
        all_day: false,
        is_recurring_instance: false,
        can_drag: false,
        can_edit: false,
    }
}

/// Compliance risk levels surface as priorities so the priority filter
/// works across sources.
fn priority_for_risk(risk_level: Option<&str>) -> Option<String> {
    match risk_level {
        Some("critical") => Some("urgent".to_string()),
        Some(level) => Some(level.to_string()),
        None => None,
    }
}

impl UnifiedEvent {
    fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    fn with_priority(mut self, priority: Option<String>) -> Self {
        self.priority = priority;
        self
    }

    fn with_assigned_to(mut self, assigned_to: Option<String>) -> Self {
        self.assigned_to = assigned_to;
        self
    }

    fn with_proposal(mut self, proposal_id: Option<String>) -> Self {
        self.proposal_id = proposal_id;
        self
    }

    fn mark_all_day(mut self) -> Self {
        self.all_day = true;
        self
    }
}
