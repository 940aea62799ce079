//! EntityStore - Row-Level SQL for Entities
//!
//! All SQL touching the `entities` and `graph_reconciliation` tables.
//! The lifecycle coordinator drives the transactional create path through
//! the `*_on` associated functions, which operate on a caller-owned
//! connection so the INSERT can sit inside an open transaction while the
//! graph mutation is attempted.
//!
//! Hydration queries select only the identity columns plus the caller's
//! projected fields; projection goes through the closed [`Field`] enum,
//! never raw column strings.

use crate::db::database::Database;
use crate::db::error::DatabaseError;
use crate::models::{Entity, EntityAttributes, Field, NodeKind, Projection};
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::Row;
use std::fmt;
use std::sync::Arc;

/// Columns always fetched regardless of projection
const IDENTITY_COLUMNS: &str = "id, kind, created_at, modified_at";

/// Pending graph-store cleanup obligation
///
/// Written when the relational half of a cross-store operation committed
/// but the graph half failed; drained by background reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReconciliation {
    /// Log row id
    pub id: i64,
    /// External id of the affected node
    pub external_id: String,
    /// Cleanup action still owed to the graph store
    pub action: ReconcileAction,
    /// Failed retry count so far
    pub attempts: i64,
    /// When the obligation was recorded
    pub created_at: DateTime<Utc>,
}

/// Cleanup actions the reconciliation log can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Wildcard-delete the node and its incident edges from the graph store
    DeleteNode,
}

impl ReconcileAction {
    /// Stable string form stored in the log
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileAction::DeleteNode => "delete_node",
        }
    }

    fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s {
            "delete_node" => Ok(ReconcileAction::DeleteNode),
            other => Err(DatabaseError::row_decode(format!(
                "unknown reconciliation action: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-level store for entity records and the reconciliation log
#[derive(Debug, Clone)]
pub struct EntityStore {
    db: Arc<Database>,
}

impl EntityStore {
    /// Create a store over a shared database handle
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Connection with busy timeout, for transactional callers
    pub async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect_with_timeout().await
    }

    /// Parse a timestamp - handles both SQLite and RFC3339 formats
    ///
    /// SQLite CURRENT_TIMESTAMP returns "YYYY-MM-DD HH:MM:SS"; older data
    /// may carry RFC3339.
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        Err(DatabaseError::row_decode(format!(
            "unable to parse timestamp '{}' as SQLite or RFC3339 format",
            s
        )))
    }

    /// Convert a row to an Entity
    ///
    /// Expected columns: the identity columns in order, then the projected
    /// fields in projection order.
    fn row_to_entity(row: &Row, projection: &Projection) -> Result<Entity, DatabaseError> {
        let id: String = row
            .get(0)
            .map_err(|e| DatabaseError::row_decode(format!("Failed to get id: {}", e)))?;
        let kind_str: String = row
            .get(1)
            .map_err(|e| DatabaseError::row_decode(format!("Failed to get kind: {}", e)))?;
        let created_at_str: String = row
            .get(2)
            .map_err(|e| DatabaseError::row_decode(format!("Failed to get created_at: {}", e)))?;
        let modified_at_str: String = row
            .get(3)
            .map_err(|e| DatabaseError::row_decode(format!("Failed to get modified_at: {}", e)))?;

        let kind: NodeKind = kind_str
            .parse()
            .map_err(|e| DatabaseError::row_decode(format!("Failed to parse kind: {}", e)))?;

        let mut entity = Entity {
            id,
            kind,
            display_name: None,
            handle: None,
            avatar_url: None,
            bio: None,
            properties: serde_json::Value::Object(serde_json::Map::new()),
            created_at: Self::parse_timestamp(&created_at_str)?,
            modified_at: Self::parse_timestamp(&modified_at_str)?,
        };

        for (offset, field) in projection.fields().iter().enumerate() {
            let idx = (4 + offset) as i32;
            match field {
                Field::DisplayName => {
                    entity.display_name = row.get(idx).map_err(|e| {
                        DatabaseError::row_decode(format!("Failed to get display_name: {}", e))
                    })?;
                }
                Field::Handle => {
                    entity.handle = row.get(idx).map_err(|e| {
                        DatabaseError::row_decode(format!("Failed to get handle: {}", e))
                    })?;
                }
                Field::AvatarUrl => {
                    entity.avatar_url = row.get(idx).map_err(|e| {
                        DatabaseError::row_decode(format!("Failed to get avatar_url: {}", e))
                    })?;
                }
                Field::Bio => {
                    entity.bio = row.get(idx).map_err(|e| {
                        DatabaseError::row_decode(format!("Failed to get bio: {}", e))
                    })?;
                }
                Field::Properties => {
                    let json: String = row.get(idx).map_err(|e| {
                        DatabaseError::row_decode(format!("Failed to get properties: {}", e))
                    })?;
                    entity.properties = serde_json::from_str(&json).map_err(|e| {
                        DatabaseError::row_decode(format!("Failed to parse properties JSON: {}", e))
                    })?;
                }
            }
        }

        Ok(entity)
    }

    /// Insert an entity row on a caller-owned connection
    ///
    /// Associated function so the lifecycle coordinator can run it inside
    /// an open transaction.
    pub async fn insert_entity_on(
        conn: &libsql::Connection,
        external_id: &str,
        kind: NodeKind,
        attributes: &EntityAttributes,
    ) -> Result<(), DatabaseError> {
        let properties = serde_json::to_string(&attributes.properties).map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to serialize properties: {}", e))
        })?;

        conn.execute(
            "INSERT INTO entities (id, kind, display_name, handle, avatar_url, bio, properties)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                external_id,
                kind.as_str(),
                attributes.display_name.as_deref(),
                attributes.handle.as_deref(),
                attributes.avatar_url.as_deref(),
                attributes.bio.as_deref(),
                properties,
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert entity: {}", e)))?;

        Ok(())
    }

    /// Delete an entity row; dependent relational rows cascade via FKs
    ///
    /// Returns whether the row existed (idempotent delete).
    pub async fn delete_entity(&self, external_id: &str) -> Result<bool, DatabaseError> {
        let conn = self.connect().await?;
        let affected = conn
            .execute("DELETE FROM entities WHERE id = ?", [external_id])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete entity: {}", e)))?;
        Ok(affected > 0)
    }

    /// Fetch a single entity with every descriptive field
    pub async fn get_entity(&self, external_id: &str) -> Result<Option<Entity>, DatabaseError> {
        let mut entities = self
            .fetch_by_ids(std::slice::from_ref(&external_id.to_string()), &Projection::all())
            .await?;
        Ok(entities.pop())
    }

    /// Fetch entities for an identifier set, restricted to a projection
    ///
    /// Result order is the relational store's native order, which is NOT
    /// the graph-determined order; the hydration pipeline re-sorts.
    pub async fn fetch_by_ids(
        &self,
        ids: &[String],
        projection: &Projection,
    ) -> Result<Vec<Entity>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut columns = IDENTITY_COLUMNS.to_string();
        for field in projection.fields() {
            columns.push_str(", ");
            columns.push_str(field.column());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM entities WHERE id IN ({})",
            columns, placeholders
        );

        let conn = self.connect().await?;
        let mut stmt = conn.prepare(&sql).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to prepare fetch_by_ids: {}", e))
        })?;

        let params: Vec<libsql::Value> = ids
            .iter()
            .map(|id| libsql::Value::Text(id.clone()))
            .collect();
        let mut rows = stmt.query(params).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute fetch_by_ids: {}", e))
        })?;

        let mut entities = Vec::with_capacity(ids.len());
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            entities.push(Self::row_to_entity(&row, projection)?);
        }

        Ok(entities)
    }

    /// Replace an entity's descriptive attributes
    ///
    /// Touches only the relational row; the graph store never sees
    /// attribute changes. Returns whether the row existed.
    pub async fn update_attributes(
        &self,
        external_id: &str,
        attributes: &EntityAttributes,
    ) -> Result<bool, DatabaseError> {
        let properties = serde_json::to_string(&attributes.properties).map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to serialize properties: {}", e))
        })?;

        let conn = self.connect().await?;
        let affected = conn
            .execute(
                "UPDATE entities
                 SET display_name = ?, handle = ?, avatar_url = ?, bio = ?, properties = ?,
                     modified_at = CURRENT_TIMESTAMP
                 WHERE id = ?",
                (
                    attributes.display_name.as_deref(),
                    attributes.handle.as_deref(),
                    attributes.avatar_url.as_deref(),
                    attributes.bio.as_deref(),
                    properties,
                    external_id,
                ),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to update attributes: {}", e))
            })?;

        Ok(affected > 0)
    }

    /// Record a pending graph cleanup obligation
    pub async fn enqueue_reconciliation(
        &self,
        external_id: &str,
        action: ReconcileAction,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute(
            "INSERT INTO graph_reconciliation (external_id, action) VALUES (?, ?)",
            (external_id, action.as_str()),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to enqueue reconciliation: {}", e))
        })?;
        Ok(())
    }

    /// Pending reconciliation entries, oldest first
    pub async fn pending_reconciliations(
        &self,
    ) -> Result<Vec<PendingReconciliation>, DatabaseError> {
        let conn = self.connect().await?;
        let mut stmt = conn
            .prepare(
                "SELECT id, external_id, action, attempts, created_at
                 FROM graph_reconciliation ORDER BY id",
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare reconciliation query: {}", e))
            })?;

        let mut rows = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to query reconciliations: {}", e))
        })?;

        let mut pending = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            let id: i64 = row
                .get(0)
                .map_err(|e| DatabaseError::row_decode(format!("Failed to get id: {}", e)))?;
            let external_id: String = row.get(1).map_err(|e| {
                DatabaseError::row_decode(format!("Failed to get external_id: {}", e))
            })?;
            let action_str: String = row
                .get(2)
                .map_err(|e| DatabaseError::row_decode(format!("Failed to get action: {}", e)))?;
            let attempts: i64 = row
                .get(3)
                .map_err(|e| DatabaseError::row_decode(format!("Failed to get attempts: {}", e)))?;
            let created_at_str: String = row.get(4).map_err(|e| {
                DatabaseError::row_decode(format!("Failed to get created_at: {}", e))
            })?;

            pending.push(PendingReconciliation {
                id,
                external_id,
                action: ReconcileAction::parse(&action_str)?,
                attempts,
                created_at: Self::parse_timestamp(&created_at_str)?,
            });
        }

        Ok(pending)
    }

    /// Remove a satisfied reconciliation entry
    pub async fn resolve_reconciliation(&self, id: i64) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute("DELETE FROM graph_reconciliation WHERE id = ?", [id])
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to resolve reconciliation: {}", e))
            })?;
        Ok(())
    }

    /// Bump the attempt counter on a still-failing entry
    pub async fn bump_reconciliation_attempts(&self, id: i64) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute(
            "UPDATE graph_reconciliation SET attempts = attempts + 1 WHERE id = ?",
            [id],
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to bump reconciliation attempts: {}", e))
        })?;
        Ok(())
    }
}
