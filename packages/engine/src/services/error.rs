//! Service Layer Error Types
//!
//! High-level error types for the engine's exposed surface, with enough
//! context on cross-store failures to drive reconciliation.

use crate::db::DatabaseError;
use crate::graph::GraphError;
use crate::models::{NodeKind, ValidationError};
use std::fmt;
use thiserror::Error;

/// Which of the two stores failed during a cross-store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSide {
    Relational,
    Graph,
}

impl fmt::Display for StoreSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreSide::Relational => "relational",
            StoreSide::Graph => "graph",
        })
    }
}

/// Engine operation errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A lookup query returned zero identifiers
    ///
    /// "Relation absent" is a normal outcome for existence probes, not a
    /// system fault.
    #[error("Relation not found: {source_id} -[{predicate}]-> {target_id}")]
    NotFound {
        source_id: String,
        predicate: String,
        target_id: String,
    },

    /// No entity with this external id exists in the relational store
    #[error("Unknown entity: {external_id}")]
    UnknownEntity { external_id: String },

    /// One store succeeded and the other failed during create/delete
    ///
    /// Carries the kind, external id, and failing store so callers (or
    /// background reconciliation) can repair the divergence. The
    /// relational store remains the authoritative, still-usable source of
    /// truth.
    #[error("Cross-store inconsistency for {kind} {external_id}: {store} store failed: {reason}")]
    CrossStore {
        kind: NodeKind,
        external_id: String,
        store: StoreSide,
        reason: String,
    },

    /// Graph store or wire-codec failure
    #[error("Graph operation failed: {0}")]
    Graph(#[from] GraphError),

    /// Relational store failure
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// Input validation failed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl EngineError {
    /// Create a relation-not-found error
    pub fn not_found(
        source_id: impl Into<String>,
        predicate: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            source_id: source_id.into(),
            predicate: predicate.into(),
            target_id: target_id.into(),
        }
    }

    /// Create an unknown-entity error
    pub fn unknown_entity(external_id: impl Into<String>) -> Self {
        Self::UnknownEntity {
            external_id: external_id.into(),
        }
    }

    /// Create a cross-store inconsistency error
    pub fn cross_store(
        kind: NodeKind,
        external_id: impl Into<String>,
        store: StoreSide,
        reason: impl Into<String>,
    ) -> Self {
        Self::CrossStore {
            kind,
            external_id: external_id.into(),
            store,
            reason: reason.into(),
        }
    }
}
