//! Calendar aggregation engine for the proposal workspace.
//!
//! Pulls six heterogeneous feeds (native events, proposal tasks, proposal
//! deadlines, review-round deadlines, compliance deadlines, client
//! meetings) from a generic entity store, normalizes them into one
//! `UnifiedEvent` stream, expands recurring events within the active view
//! window, and routes drag-to-reschedule mutations back to the owning
//! collection.

pub mod aggregate;
pub mod config;
pub mod reschedule;
pub mod service;
pub mod store;

pub use aggregate::Aggregator;
pub use config::CalendarSettings;
pub use service::CalendarService;
pub use store::{Collection, EntityStore, MemoryStore, RemoteStore, SortSpec};

// Re-export the core types alongside the service layer
pub use propcal_core::*;
