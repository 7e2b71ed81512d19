//! Drag-to-reschedule mutations.
//!
//! Translates "this event was dropped on a new date" into the one date
//! write the owning collection expects. The capability gate is re-verified
//! here; the UI check is a courtesy, this one is the invariant.

use chrono::NaiveDate;
use serde_json::json;

use propcal_core::{CalendarError, CalendarResult, SourceType, UnifiedEvent};

use crate::store::{Collection, EntityStore};

/// Move an event to `new_date`, keeping its time-of-day and duration.
///
/// Recurring instances are refused outright: only the series can move,
/// via an edit. Non-draggable source types are refused with the type
/// named in the error.
pub async fn reschedule(
    store: &dyn EntityStore,
    event: &UnifiedEvent,
    new_date: NaiveDate,
) -> CalendarResult<()> {
    if event.is_recurring_instance {
        return Err(CalendarError::RecurringInstanceDrag);
    }
    if !event.can_drag || !event.source_type.can_drag() {
        return Err(CalendarError::NotReschedulable(event.source_type));
    }

    let new_start = new_date.and_time(event.start_date.time()).and_utc();
    let new_end = new_start + event.duration();

    let (collection, patch) = match event.source_type {
        SourceType::CalendarEvent => (
            Collection::CalendarEvent,
            json!({ "start_date": new_start, "end_date": new_end }),
        ),
        SourceType::ProposalTask => (
            Collection::ProposalTask,
            json!({ "due_date": new_start }),
        ),
        SourceType::ClientMeeting => (
            Collection::ClientMeeting,
            json!({ "scheduled_date": new_start }),
        ),
        // Unreachable through the can_drag gate, but keep the match total
        other => return Err(CalendarError::NotReschedulable(other)),
    };

    store
        .update(collection, &event.original_id, patch)
        .await
        .map_err(|err| CalendarError::RescheduleWrite(err.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{Map, json};

    use crate::store::MemoryStore;

    fn unified(source_type: SourceType) -> UnifiedEvent {
        UnifiedEvent {
            id: "evt-1".to_string(),
            original_id: "evt-1".to_string(),
            source_type,
            title: "Event".to_string(),
            description: None,
            start_date: Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 5, 15, 30, 0).unwrap(),
            location: None,
            meeting_link: None,
            priority: None,
            assigned_to: None,
            proposal_id: None,
            all_day: false,
            is_recurring_instance: false,
            can_drag: source_type.can_drag(),
            can_edit: source_type.can_edit(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_native_drag_preserves_time_of_day_and_duration() {
        let store = MemoryStore::new();
        store.seed(
            Collection::CalendarEvent,
            vec![json!({
                "id": "evt-1",
                "organization_id": "org-1",
                "title": "Event",
                "start_date": "2024-03-05T14:00:00Z",
                "end_date": "2024-03-05T15:30:00Z"
            })],
        );

        reschedule(&store, &unified(SourceType::CalendarEvent), date(2024, 3, 10))
            .await
            .unwrap();

        let records = store
            .list(Collection::CalendarEvent, &Map::new(), None, None)
            .await
            .unwrap();
        assert_eq!(records[0]["start_date"], "2024-03-10T14:00:00Z");
        assert_eq!(records[0]["end_date"], "2024-03-10T15:30:00Z");
    }

    #[tokio::test]
    async fn test_task_drag_writes_due_date() {
        let store = MemoryStore::new();
        store.seed(
            Collection::ProposalTask,
            vec![json!({
                "id": "evt-1",
                "proposal_id": "prop-1",
                "title": "Task",
                "due_date": "2024-03-05T14:00:00Z"
            })],
        );

        reschedule(&store, &unified(SourceType::ProposalTask), date(2024, 3, 12))
            .await
            .unwrap();

        let records = store
            .list(Collection::ProposalTask, &Map::new(), None, None)
            .await
            .unwrap();
        assert_eq!(records[0]["due_date"], "2024-03-12T14:00:00Z");
    }

    #[tokio::test]
    async fn test_meeting_drag_writes_scheduled_date() {
        let store = MemoryStore::new();
        store.seed(
            Collection::ClientMeeting,
            vec![json!({
                "id": "evt-1",
                "meeting_title": "Kickoff",
                "scheduled_date": "2024-03-05T14:00:00Z"
            })],
        );

        reschedule(&store, &unified(SourceType::ClientMeeting), date(2024, 4, 1))
            .await
            .unwrap();

        let records = store
            .list(Collection::ClientMeeting, &Map::new(), None, None)
            .await
            .unwrap();
        assert_eq!(records[0]["scheduled_date"], "2024-04-01T14:00:00Z");
    }

    #[tokio::test]
    async fn test_deadline_drag_is_refused_without_a_write() {
        let store = MemoryStore::new();
        store.seed(
            Collection::Proposal,
            vec![json!({
                "id": "evt-1",
                "organization_id": "org-1",
                "proposal_name": "FAA",
                "due_date": "2024-03-05T00:00:00Z"
            })],
        );

        let result = reschedule(
            &store,
            &unified(SourceType::ProposalDeadline),
            date(2024, 3, 10),
        )
        .await;

        assert!(matches!(
            result,
            Err(CalendarError::NotReschedulable(SourceType::ProposalDeadline))
        ));
        let records = store
            .list(Collection::Proposal, &Map::new(), None, None)
            .await
            .unwrap();
        assert_eq!(records[0]["due_date"], "2024-03-05T00:00:00Z");
    }

    #[tokio::test]
    async fn test_recurring_instance_drag_is_refused() {
        let store = MemoryStore::new();
        let mut instance = unified(SourceType::CalendarEvent);
        instance.id = "evt-1-2024-03-05".to_string();
        instance.is_recurring_instance = true;
        instance.can_drag = false;

        let result = reschedule(&store, &instance, date(2024, 3, 10)).await;

        assert!(matches!(result, Err(CalendarError::RecurringInstanceDrag)));
    }

    #[tokio::test]
    async fn test_failed_write_surfaces_as_reschedule_error() {
        // Empty store: the update itself fails
        let store = MemoryStore::new();

        let result = reschedule(&store, &unified(SourceType::CalendarEvent), date(2024, 3, 10)).await;

        assert!(matches!(result, Err(CalendarError::RescheduleWrite(_))));
    }
}
