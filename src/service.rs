//! Calendar service facade exposed to the view layer.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use propcal_core::{
    CalendarError, CalendarEventRecord, CalendarResult, EventQuery, ExpansionLimits, UnifiedEvent,
    ViewMode, ViewWindow, filter_events,
};

use crate::aggregate::Aggregator;
use crate::config::CalendarSettings;
use crate::reschedule;
use crate::store::{Collection, EntityStore, RemoteStore, eq_filter};

pub struct CalendarService {
    store: Arc<dyn EntityStore>,
    limits: ExpansionLimits,
}

impl CalendarService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        CalendarService {
            store,
            limits: ExpansionLimits::default(),
        }
    }

    pub fn with_settings(store: Arc<dyn EntityStore>, settings: &CalendarSettings) -> Self {
        CalendarService {
            store,
            limits: settings.expansion_limits(),
        }
    }

    /// Build a service backed by the configured store adapter binary.
    pub fn from_settings(settings: &CalendarSettings) -> Self {
        let store = RemoteStore::with_timeout(
            &settings.store_adapter,
            Duration::from_secs(settings.store_timeout_secs),
        );
        Self::with_settings(Arc::new(store), settings)
    }

    /// Aggregate, expand and filter everything the view needs for one
    /// window. Failures degrade to fewer events rather than an error.
    pub async fn events_for_window(
        &self,
        organization_id: &str,
        mode: ViewMode,
        anchor: NaiveDate,
        query: &EventQuery,
    ) -> Vec<UnifiedEvent> {
        let window = ViewWindow::for_view(mode, anchor);
        let aggregator = Aggregator::new(self.store.as_ref(), self.limits);
        let events = aggregator.aggregate(organization_id, &window).await;
        filter_events(&events, query)
    }

    pub async fn reschedule_event(
        &self,
        event: &UnifiedEvent,
        new_date: NaiveDate,
    ) -> CalendarResult<()> {
        reschedule::reschedule(self.store.as_ref(), event, new_date).await
    }

    /// Create a native calendar event, assigning an id when absent.
    pub async fn create_event(
        &self,
        mut record: CalendarEventRecord,
    ) -> CalendarResult<CalendarEventRecord> {
        if record.end_date < record.start_date {
            return Err(CalendarError::InvalidEvent(
                "end_date precedes start_date".into(),
            ));
        }
        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }

        let value = serde_json::to_value(&record)
            .map_err(|e| CalendarError::Serialization(e.to_string()))?;
        let created = self.store.create(Collection::CalendarEvent, value).await?;

        serde_json::from_value(created).map_err(|e| CalendarError::Serialization(e.to_string()))
    }

    /// Patch a native calendar event. Editing a recurring event edits the
    /// series; instances have no record of their own.
    pub async fn update_event(
        &self,
        event_id: &str,
        patch: serde_json::Value,
    ) -> CalendarResult<serde_json::Value> {
        self.store
            .update(Collection::CalendarEvent, event_id, patch)
            .await
    }

    /// Delete a native calendar event.
    ///
    /// Deleting a recurring origin removes every occurrence; there is no
    /// per-occurrence delete, so the caller must confirm with
    /// `delete_all_occurrences`.
    pub async fn delete_event(
        &self,
        event_id: &str,
        delete_all_occurrences: bool,
    ) -> CalendarResult<()> {
        let records = self
            .store
            .list(
                Collection::CalendarEvent,
                &eq_filter("id", event_id),
                None,
                Some(1),
            )
            .await?;
        let value = records
            .into_iter()
            .next()
            .ok_or_else(|| CalendarError::EventNotFound(event_id.to_string()))?;
        let record: CalendarEventRecord = serde_json::from_value(value)
            .map_err(|e| CalendarError::Serialization(e.to_string()))?;

        if record.recurrence().is_some() && !delete_all_occurrences {
            return Err(CalendarError::RecurringDeleteUnconfirmed);
        }

        self.store.delete(Collection::CalendarEvent, event_id).await
    }
}
