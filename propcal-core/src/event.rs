//! The unified event shape every feed is normalized into.
//!
//! `UnifiedEvent` is ephemeral: it is recomputed for each view-window query
//! and never persisted. Only the underlying source records are stored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::source::SourceType;

/// A calendar-displayable event derived from one of the six feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedEvent {
    /// Synthetic id; recurring instances get `"{origin}-{YYYY-MM-DD}"`.
    pub id: String,
    /// Id of the record in its origin collection.
    pub original_id: String,
    pub source_type: SourceType,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub proposal_id: Option<String>,
    pub all_day: bool,
    pub is_recurring_instance: bool,
    pub can_drag: bool,
    pub can_edit: bool,
}

impl UnifiedEvent {
    pub fn duration(&self) -> Duration {
        self.end_date - self.start_date
    }

    /// Derive `can_drag`/`can_edit` from the capability table.
    /// Capabilities are never set ad hoc; instances are never draggable.
    pub(crate) fn apply_capabilities(mut self) -> Self {
        self.can_drag = self.source_type.can_drag() && !self.is_recurring_instance;
        self.can_edit = self.source_type.can_edit();
        self
    }
}
