//! Pure predicate filtering over unified events.

use serde::{Deserialize, Serialize};

use crate::event::UnifiedEvent;
use crate::source::SourceType;

/// Conjunctive filter criteria. Absent fields (and the literal `"all"`,
/// which the view layer's dropdowns send) are no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQuery {
    pub text: Option<String>,
    pub source_type: Option<SourceType>,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
    pub proposal_id: Option<String>,
}

impl EventQuery {
    /// An event survives iff it matches every supplied criterion.
    pub fn matches(&self, event: &UnifiedEvent) -> bool {
        if let Some(text) = self.text.as_deref() {
            let needle = text.to_lowercase();
            if !needle.is_empty() && !text_matches(event, &needle) {
                return false;
            }
        }

        if let Some(source_type) = self.source_type {
            if event.source_type != source_type {
                return false;
            }
        }

        if let Some(assigned_to) = active(self.assigned_to.as_deref()) {
            if event.assigned_to.as_deref() != Some(assigned_to) {
                return false;
            }
        }

        if let Some(priority) = active(self.priority.as_deref()) {
            if event.priority.as_deref() != Some(priority) {
                return false;
            }
        }

        if let Some(proposal_id) = active(self.proposal_id.as_deref()) {
            if event.proposal_id.as_deref() != Some(proposal_id) {
                return false;
            }
        }

        true
    }
}

/// Case-insensitive substring match over title, description and location.
fn text_matches(event: &UnifiedEvent, needle: &str) -> bool {
    event.title.to_lowercase().contains(needle)
        || event
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || event
            .location
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(needle))
}

fn active(criterion: Option<&str>) -> Option<&str> {
    criterion.filter(|value| *value != "all" && !value.is_empty())
}

/// Order-preserving conjunctive filter; pure, safe to re-apply.
pub fn filter_events(events: &[UnifiedEvent], query: &EventQuery) -> Vec<UnifiedEvent> {
    events
        .iter()
        .filter(|event| query.matches(event))
        .cloned()
        .collect()
}
