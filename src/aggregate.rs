//! Multi-source event aggregation.
//!
//! Pulls the six feeds for an organization, expands recurring native
//! events within the view window, normalizes everything else, and returns
//! one flat collection. Ordering is not guaranteed; callers sort by
//! `start_date` when they need a total order (the agenda view does).

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use propcal_core::{
    CalendarEventRecord, ClientMeetingRecord, ComplianceRecord, ExpansionLimits, ProposalRecord,
    ProposalTaskRecord, ReviewRoundRecord, SourceRecord, UnifiedEvent, ViewWindow, expand_event,
    normalize,
};

use crate::store::{Collection, EntityStore, eq_filter};

pub struct Aggregator<'a> {
    store: &'a dyn EntityStore,
    limits: ExpansionLimits,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a dyn EntityStore, limits: ExpansionLimits) -> Self {
        Aggregator { store, limits }
    }

    /// Fetch and unify every feed for the organization.
    ///
    /// The six fetches run concurrently and fail independently: a failed
    /// feed contributes zero events for this cycle instead of aborting the
    /// aggregate.
    pub async fn aggregate(
        &self,
        organization_id: &str,
        window: &ViewWindow,
    ) -> Vec<UnifiedEvent> {
        let org_filter = eq_filter("organization_id", organization_id);

        // Tasks, reviews and compliance hang off proposals rather than the
        // organization, so those three are scoped through the proposal id
        // set resolved from the first round of fetches.
        let unscoped = Map::new();
        let (native, meetings, proposals, tasks, reviews, compliance) = tokio::join!(
            self.fetch(Collection::CalendarEvent, &org_filter),
            self.fetch(Collection::ClientMeeting, &org_filter),
            self.fetch(Collection::Proposal, &org_filter),
            self.fetch(Collection::ProposalTask, &unscoped),
            self.fetch(Collection::ReviewRound, &unscoped),
            self.fetch(Collection::ComplianceRequirement, &unscoped),
        );

        let proposal_ids: HashSet<String> = proposals
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let mut events = Vec::new();

        for record in decode_all::<CalendarEventRecord>(Collection::CalendarEvent, native) {
            events.extend(expand_event(&record, window, &self.limits));
        }

        for meeting in decode_all::<ClientMeetingRecord>(Collection::ClientMeeting, meetings) {
            events.extend(normalize(&SourceRecord::ClientMeeting(meeting)));
        }

        for proposal in decode_all::<ProposalRecord>(Collection::Proposal, proposals) {
            events.extend(normalize(&SourceRecord::ProposalDeadline(proposal)));
        }

        for task in decode_all::<ProposalTaskRecord>(Collection::ProposalTask, tasks)
            .into_iter()
            .filter(|task| proposal_ids.contains(&task.proposal_id))
        {
            events.extend(normalize(&SourceRecord::ProposalTask(task)));
        }

        for round in decode_all::<ReviewRoundRecord>(Collection::ReviewRound, reviews)
            .into_iter()
            .filter(|round| proposal_ids.contains(&round.proposal_id))
        {
            events.extend(normalize(&SourceRecord::ReviewDeadline(round)));
        }

        for requirement in
            decode_all::<ComplianceRecord>(Collection::ComplianceRequirement, compliance)
                .into_iter()
                .filter(|requirement| proposal_ids.contains(&requirement.proposal_id))
        {
            events.extend(normalize(&SourceRecord::ComplianceDue(requirement)));
        }

        events
    }

    /// One feed fetch with failure isolation.
    async fn fetch(&self, collection: Collection, filter: &Map<String, Value>) -> Vec<Value> {
        match self.store.list(collection, filter, None, None).await {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    collection = collection.name(),
                    %err,
                    "source fetch failed; feed omitted from this cycle"
                );
                Vec::new()
            }
        }
    }
}

/// Decode raw records, skipping any the backend hands back malformed.
fn decode_all<T: DeserializeOwned>(collection: Collection, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!(collection = collection.name(), %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use propcal_core::{CalendarError, CalendarResult, SourceType};
    use serde_json::json;

    use crate::store::{MemoryStore, SortSpec};

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            Collection::CalendarEvent,
            vec![
                json!({
                    "id": "evt-1",
                    "organization_id": "org-1",
                    "title": "Capture review",
                    "start_date": "2024-01-10T14:00:00Z",
                    "end_date": "2024-01-10T15:00:00Z"
                }),
                json!({
                    "id": "evt-2",
                    "organization_id": "org-1",
                    "title": "Standup",
                    "start_date": "2024-01-01T09:00:00Z",
                    "end_date": "2024-01-01T09:15:00Z",
                    "recurrence_rule": {
                        "frequency": "weekly",
                        "end_type": "count",
                        "occurrence_count": 4
                    }
                }),
            ],
        );
        store.seed(
            Collection::Proposal,
            vec![
                json!({
                    "id": "prop-1",
                    "organization_id": "org-1",
                    "proposal_name": "FAA Tower",
                    "due_date": "2024-01-25T00:00:00Z"
                }),
                json!({
                    "id": "prop-other",
                    "organization_id": "org-2",
                    "proposal_name": "Other Org",
                    "due_date": "2024-01-26T00:00:00Z"
                }),
            ],
        );
        store.seed(
            Collection::ProposalTask,
            vec![
                json!({
                    "id": "task-1",
                    "proposal_id": "prop-1",
                    "title": "Draft volume",
                    "due_date": "2024-01-12T00:00:00Z"
                }),
                json!({
                    "id": "task-foreign",
                    "proposal_id": "prop-other",
                    "title": "Not ours",
                    "due_date": "2024-01-13T00:00:00Z"
                }),
                json!({
                    "id": "task-undated",
                    "proposal_id": "prop-1",
                    "title": "No due date"
                }),
            ],
        );
        store.seed(
            Collection::ReviewRound,
            vec![json!({
                "id": "rev-1",
                "proposal_id": "prop-1",
                "round_name": "Red Team",
                "due_date": "2024-01-18T00:00:00Z"
            })],
        );
        store.seed(
            Collection::ComplianceRequirement,
            vec![json!({
                "id": "req-1",
                "proposal_id": "prop-1",
                "requirement_title": "Past performance volume",
                "due_date": "2024-01-20T00:00:00Z",
                "risk_level": "high"
            })],
        );
        store.seed(
            Collection::ClientMeeting,
            vec![json!({
                "id": "mtg-1",
                "organization_id": "org-1",
                "meeting_title": "Kickoff",
                "scheduled_date": "2024-01-05T16:00:00Z",
                "duration_minutes": 30
            })],
        );
        store
    }

    fn january() -> ViewWindow {
        ViewWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
        )
    }

    fn count_by_type(events: &[UnifiedEvent], source_type: SourceType) -> usize {
        events
            .iter()
            .filter(|event| event.source_type == source_type)
            .count()
    }

    #[tokio::test]
    async fn test_aggregate_merges_all_six_feeds() {
        let store = seeded_store();
        let aggregator = Aggregator::new(&store, ExpansionLimits::default());

        let events = aggregator.aggregate("org-1", &january()).await;

        // 1 plain native + 4 recurring instances
        assert_eq!(count_by_type(&events, SourceType::CalendarEvent), 5);
        assert_eq!(count_by_type(&events, SourceType::ProposalTask), 1);
        assert_eq!(count_by_type(&events, SourceType::ProposalDeadline), 1);
        assert_eq!(count_by_type(&events, SourceType::ReviewDeadline), 1);
        assert_eq!(count_by_type(&events, SourceType::ComplianceDue), 1);
        assert_eq!(count_by_type(&events, SourceType::ClientMeeting), 1);
    }

    #[tokio::test]
    async fn test_proposal_scoped_feeds_exclude_foreign_proposals() {
        let store = seeded_store();
        let aggregator = Aggregator::new(&store, ExpansionLimits::default());

        let events = aggregator.aggregate("org-1", &january()).await;

        assert!(events.iter().all(|event| event.title != "Not ours"));
        assert!(events.iter().all(|event| event.title != "No due date"));
    }

    /// Delegates to a MemoryStore but fails list() for one collection.
    struct FailingStore {
        inner: MemoryStore,
        broken: Collection,
    }

    #[async_trait]
    impl EntityStore for FailingStore {
        async fn list(
            &self,
            collection: Collection,
            filter: &Map<String, Value>,
            sort: Option<&SortSpec>,
            limit: Option<usize>,
        ) -> CalendarResult<Vec<Value>> {
            if collection == self.broken {
                return Err(CalendarError::Store("backend unavailable".into()));
            }
            self.inner.list(collection, filter, sort, limit).await
        }

        async fn create(&self, collection: Collection, record: Value) -> CalendarResult<Value> {
            self.inner.create(collection, record).await
        }

        async fn update(
            &self,
            collection: Collection,
            id: &str,
            patch: Value,
        ) -> CalendarResult<Value> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: Collection, id: &str) -> CalendarResult<()> {
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn test_one_failed_feed_does_not_poison_the_rest() {
        let store = FailingStore {
            inner: seeded_store(),
            broken: Collection::ClientMeeting,
        };
        let aggregator = Aggregator::new(&store, ExpansionLimits::default());

        let events = aggregator.aggregate("org-1", &january()).await;

        assert_eq!(count_by_type(&events, SourceType::ClientMeeting), 0);
        assert_eq!(count_by_type(&events, SourceType::CalendarEvent), 5);
        assert_eq!(count_by_type(&events, SourceType::ProposalDeadline), 1);
        assert_eq!(count_by_type(&events, SourceType::ReviewDeadline), 1);
    }

    #[tokio::test]
    async fn test_failed_proposal_feed_empties_dependent_feeds() {
        let store = FailingStore {
            inner: seeded_store(),
            broken: Collection::Proposal,
        };
        let aggregator = Aggregator::new(&store, ExpansionLimits::default());

        let events = aggregator.aggregate("org-1", &january()).await;

        // Without proposals there is no id set to scope the dependents by
        assert_eq!(count_by_type(&events, SourceType::ProposalDeadline), 0);
        assert_eq!(count_by_type(&events, SourceType::ProposalTask), 0);
        assert_eq!(count_by_type(&events, SourceType::CalendarEvent), 5);
        assert_eq!(count_by_type(&events, SourceType::ClientMeeting), 1);
    }
}
