//! Entity-store access.
//!
//! The engine consumes a generic typed-collection store: list with a
//! field-equality filter map, plus create/update/delete. [`RemoteStore`]
//! speaks the adapter protocol to an external backend; [`MemoryStore`] is
//! an in-process implementation for tests and embedders.

pub mod memory;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use propcal_core::CalendarResult;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// The collections the calendar engine reads from. Only `CalendarEvent`
/// is ever created or deleted here; the others are owned by their own
/// subsystems and only receive date updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    CalendarEvent,
    Proposal,
    ProposalTask,
    ReviewRound,
    ComplianceRequirement,
    ClientMeeting,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::CalendarEvent => "CalendarEvent",
            Collection::Proposal => "Proposal",
            Collection::ProposalTask => "ProposalTask",
            Collection::ReviewRound => "ReviewRound",
            Collection::ComplianceRequirement => "ComplianceRequirement",
            Collection::ClientMeeting => "ClientMeeting",
        }
    }
}

/// Sort specification for list queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

/// Generic typed-collection CRUD, implementable against any backend.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// List records matching every field in `filter` (equality match).
    async fn list(
        &self,
        collection: Collection,
        filter: &Map<String, Value>,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
    ) -> CalendarResult<Vec<Value>>;

    async fn create(&self, collection: Collection, record: Value) -> CalendarResult<Value>;

    /// Merge `patch`'s fields into the record with the given id.
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> CalendarResult<Value>;

    async fn delete(&self, collection: Collection, id: &str) -> CalendarResult<()>;
}

/// Single-field equality filter, the common case.
pub fn eq_filter(field: &str, value: impl Into<Value>) -> Map<String, Value> {
    let mut filter = Map::new();
    filter.insert(field.to_string(), value.into());
    filter
}
