//! LifecycleService - Node Lifecycle Coordinator
//!
//! Creates and deletes nodes across both stores without a shared
//! transaction. Ordering is relational-first in both directions, keeping
//! the relational store authoritative for existence checks:
//!
//! - **Create**: open a relational transaction, insert the row, issue the
//!   graph create mutation, commit. A graph failure rolls the insert back
//!   and surfaces as `CrossStore`; a relational failure means the graph
//!   mutation is never attempted.
//! - **Delete**: delete the relational row (FK cascade), then
//!   wildcard-delete the node from the graph. A graph failure after the
//!   relational delete committed cannot be undone - it becomes a durable
//!   reconciliation obligation retried in the background, not a fatal
//!   error.
//!
//! There is no two-phase commit; transient orphaned graph state is the
//! accepted, recoverable failure mode.

use crate::db::{EntityStore, PendingReconciliation, ReconcileAction};
use crate::graph::{mutation, GraphClient};
use crate::models::{EntityAttributes, NodeKind};
use crate::services::error::{EngineError, StoreSide};
use std::sync::Arc;

/// Cross-store create/delete coordinator
pub struct LifecycleService {
    graph: Arc<dyn GraphClient>,
    entities: EntityStore,
}

impl LifecycleService {
    /// Create a coordinator over the shared graph client and entity store
    pub fn new(graph: Arc<dyn GraphClient>, entities: EntityStore) -> Self {
        Self { graph, entities }
    }

    /// Create a node in both stores, relational-first
    ///
    /// # Errors
    ///
    /// - `Database` if the relational insert fails (graph untouched)
    /// - `CrossStore` if the graph mutation or the final commit fails
    pub async fn create_node(
        &self,
        kind: NodeKind,
        external_id: &str,
        attributes: &EntityAttributes,
    ) -> Result<(), EngineError> {
        attributes.validate()?;

        let conn = self.entities.connect().await?;
        conn.execute("BEGIN TRANSACTION", ())
            .await
            .map_err(|e| EngineError::Database(crate::db::DatabaseError::sql_execution(
                format!("Failed to begin transaction: {}", e),
            )))?;

        if let Err(e) = EntityStore::insert_entity_on(&conn, external_id, kind, attributes).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(e.into());
        }

        if let Err(e) = self.graph.mutate(&mutation::create_node(kind, external_id)).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            tracing::warn!(
                external_id,
                kind = kind.as_str(),
                error = %e,
                "graph create failed; relational insert rolled back"
            );
            return Err(EngineError::cross_store(
                kind,
                external_id,
                StoreSide::Graph,
                e.to_string(),
            ));
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            // The graph node now exists without a committed relational row;
            // leave a cleanup obligation before surfacing the divergence.
            tracing::warn!(
                external_id,
                kind = kind.as_str(),
                error = %e,
                "relational commit failed after graph create"
            );
            if let Err(log_err) = self
                .entities
                .enqueue_reconciliation(external_id, ReconcileAction::DeleteNode)
                .await
            {
                // Both the commit and the log write failed: the orphaned
                // graph node is now only recoverable from this log line.
                tracing::error!(
                    external_id,
                    error = %log_err,
                    "failed to record graph cleanup obligation"
                );
            }
            return Err(EngineError::cross_store(
                kind,
                external_id,
                StoreSide::Relational,
                e.to_string(),
            ));
        }

        tracing::info!(external_id, kind = kind.as_str(), "node created");
        Ok(())
    }

    /// Delete a node from both stores, relational-first
    ///
    /// Deleting an unknown id is a no-op (idempotent). A graph failure
    /// after the relational delete committed is logged and recorded in
    /// the reconciliation log; the call still succeeds and the node stays
    /// gone from the authoritative store.
    pub async fn delete_node(&self, external_id: &str) -> Result<(), EngineError> {
        let existed = self.entities.delete_entity(external_id).await?;

        if let Err(e) = self.graph.mutate(&mutation::delete_node(external_id)).await {
            tracing::warn!(
                external_id,
                error = %e,
                "graph delete failed after relational delete; queued for reconciliation"
            );
            self.entities
                .enqueue_reconciliation(external_id, ReconcileAction::DeleteNode)
                .await?;
            return Ok(());
        }

        if existed {
            tracing::info!(external_id, "node deleted");
        } else {
            tracing::debug!(external_id, "delete for unknown entity (no-op)");
        }
        Ok(())
    }

    /// Replace a node's descriptive attributes (relational row only)
    pub async fn update_attributes(
        &self,
        external_id: &str,
        attributes: &EntityAttributes,
    ) -> Result<(), EngineError> {
        attributes.validate()?;

        if !self.entities.update_attributes(external_id, attributes).await? {
            return Err(EngineError::unknown_entity(external_id));
        }
        Ok(())
    }

    /// Pending cross-store cleanup obligations, oldest first
    pub async fn pending_reconciliations(
        &self,
    ) -> Result<Vec<PendingReconciliation>, EngineError> {
        Ok(self.entities.pending_reconciliations().await?)
    }

    /// Background reconciliation pass
    ///
    /// Re-attempts every pending graph cleanup, removing satisfied
    /// entries and bumping the attempt counter on entries that still
    /// fail. Returns how many entries were resolved.
    pub async fn retry_pending(&self) -> Result<usize, EngineError> {
        let pending = self.entities.pending_reconciliations().await?;
        let mut resolved = 0;

        for item in pending {
            let m = match item.action {
                ReconcileAction::DeleteNode => mutation::delete_node(&item.external_id),
            };
            match self.graph.mutate(&m).await {
                Ok(()) => {
                    self.entities.resolve_reconciliation(item.id).await?;
                    tracing::info!(
                        external_id = %item.external_id,
                        action = %item.action,
                        "reconciliation resolved"
                    );
                    resolved += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        external_id = %item.external_id,
                        attempts = item.attempts + 1,
                        error = %e,
                        "reconciliation attempt failed"
                    );
                    self.entities.bump_reconciliation_attempts(item.id).await?;
                }
            }
        }

        Ok(resolved)
    }
}
