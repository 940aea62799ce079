//! Relational Database Layer
//!
//! libsql/Turso-backed storage for the descriptive half of every node:
//!
//! - [`Database`] - connection management and idempotent schema init
//! - [`EntityStore`] - row-level SQL for entities and the durable
//!   reconciliation log
//!
//! The relational store is authoritative for existence: node creation
//! inserts here first, and deletion removes here first (see the lifecycle
//! coordinator in [`crate::services`]).

mod database;
mod entity_store;
mod error;

pub use database::Database;
pub use entity_store::{EntityStore, PendingReconciliation, ReconcileAction};
pub use error::DatabaseError;
