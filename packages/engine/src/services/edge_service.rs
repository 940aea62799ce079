//! EdgeService - Cross-Store Hydration Pipeline
//!
//! Traversal reads and edge mutations over the two stores:
//!
//! 1. Resolve the query template from the catalog for the edge kind and
//!    pagination mode.
//! 2. Execute against the graph store, decode identifiers via the wire
//!    codec.
//! 3. Zero identifiers short-circuits: no relational round-trip.
//! 4. Fetch the relational rows for the identifier set, restricted to the
//!    caller's projection.
//! 5. Re-sort the rows into graph-determined order. The relational
//!    store's native order is arbitrary, and the pagination cursor is the
//!    external id of the last hydrated entity, so graph order is
//!    load-bearing.
//!
//! Edge mutations route through the guarded mutation builders; symmetric
//! kinds always travel as a two-direction pair.

use crate::config::EngineConfig;
use crate::db::EntityStore;
use crate::graph::{codec, mutation, queries, GraphClient};
use crate::models::{EdgeKind, Entity, MixedKind, Pagination, Projection, QueryMode};
use crate::services::error::EngineError;
use std::collections::HashMap;
use std::sync::Arc;

/// Traversal reads and edge mutations for the relationship engine
pub struct EdgeService {
    graph: Arc<dyn GraphClient>,
    entities: EntityStore,
    config: EngineConfig,
}

impl EdgeService {
    /// Create a service over the shared graph client and entity store
    pub fn new(graph: Arc<dyn GraphClient>, entities: EntityStore, config: EngineConfig) -> Self {
        Self {
            graph,
            entities,
            config,
        }
    }

    /// Variable bindings for a single-node traversal
    fn traversal_vars(&self, source_id: &str, pagination: &Pagination) -> HashMap<String, String> {
        let mut vars = HashMap::from([("$id".to_string(), source_id.to_string())]);
        match pagination {
            Pagination::Page { cursor, limit } => {
                vars.insert(
                    "$after".to_string(),
                    cursor.clone().unwrap_or_default(),
                );
                vars.insert(
                    "$first".to_string(),
                    self.config.clamp_limit(*limit).to_string(),
                );
            }
            Pagination::Lookup { target_id } => {
                vars.insert("$target".to_string(), target_id.clone());
            }
        }
        vars
    }

    /// Hydrate graph-ordered identifiers into relational records
    async fn hydrate(
        &self,
        ids: &[String],
        projection: Option<Projection>,
    ) -> Result<Vec<Entity>, EngineError> {
        let projection = projection.unwrap_or_default();
        let mut entities = self.entities.fetch_by_ids(ids, &projection).await?;

        // Restore graph-determined order; the cursor for the next page is
        // the id of the last entity returned.
        let position: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        entities.sort_by_key(|entity| {
            position.get(entity.id.as_str()).copied().unwrap_or(usize::MAX)
        });

        Ok(entities)
    }

    /// Traverse one edge set and hydrate the matches
    ///
    /// For `Lookup` pagination, zero matches is `EngineError::NotFound`
    /// ("relation absent" - a normal outcome); for `Page`, an empty page.
    pub async fn get_edge(
        &self,
        source_id: &str,
        kind: EdgeKind,
        pagination: Pagination,
        projection: Option<Projection>,
    ) -> Result<Vec<Entity>, EngineError> {
        let query = queries::edge_query(kind, pagination.mode());
        let vars = self.traversal_vars(source_id, &pagination);

        let raw = self.graph.query(&query, &vars).await?;
        let ids = codec::parse_ids(&raw);
        tracing::debug!(
            source_id,
            predicate = kind.predicate(),
            matches = ids.len(),
            "edge traversal"
        );

        if ids.is_empty() {
            return match pagination {
                Pagination::Lookup { target_id } => {
                    Err(EngineError::not_found(source_id, kind.predicate(), target_id))
                }
                Pagination::Page { .. } => Ok(Vec::new()),
            };
        }

        self.hydrate(&ids, projection).await
    }

    /// Aggregate count of one edge set; no hydration
    pub async fn get_edge_count(
        &self,
        source_id: &str,
        kind: EdgeKind,
    ) -> Result<u64, EngineError> {
        let query = queries::edge_query(kind, QueryMode::Count);
        let vars = HashMap::from([("$id".to_string(), source_id.to_string())]);

        let raw = self.graph.query(&query, &vars).await?;
        Ok(codec::parse_count(&raw)?)
    }

    /// Two-node intersection/difference traversal with hydration
    pub async fn get_mixed_edge(
        &self,
        source_id: &str,
        target_id: &str,
        kind: MixedKind,
        pagination: Pagination,
        projection: Option<Projection>,
    ) -> Result<Vec<Entity>, EngineError> {
        let query = queries::mixed_query(kind, pagination.mode());
        let mut vars = self.traversal_vars(source_id, &pagination);
        vars.insert("$other".to_string(), target_id.to_string());

        let raw = self.graph.query(&query, &vars).await?;
        let ids = codec::parse_ids(&raw);

        if ids.is_empty() {
            return match pagination {
                Pagination::Lookup { target_id } => {
                    Err(EngineError::not_found(source_id, kind.name(), target_id))
                }
                Pagination::Page { .. } => Ok(Vec::new()),
            };
        }

        self.hydrate(&ids, projection).await
    }

    /// Per-predicate edge counts for one node
    pub async fn get_edge_counts(
        &self,
        source_id: &str,
    ) -> Result<HashMap<String, u64>, EngineError> {
        let query = queries::count_summary_query();
        let vars = HashMap::from([("$id".to_string(), source_id.to_string())]);

        let raw = self.graph.query(&query, &vars).await?;
        Ok(codec::parse_count_map(&raw)?)
    }

    /// Per-predicate edge identifier listing for one node
    pub async fn get_edge_summary(
        &self,
        source_id: &str,
    ) -> Result<HashMap<String, Vec<String>>, EngineError> {
        let query = queries::edge_summary_query();
        let vars = HashMap::from([("$id".to_string(), source_id.to_string())]);

        let raw = self.graph.query(&query, &vars).await?;
        Ok(codec::parse_predicate_map(&raw)?)
    }

    /// Assert an edge between two existing nodes
    ///
    /// Symmetric kinds travel as both directions in one graph
    /// transaction. Repeated adds are idempotent by construction: the
    /// guard upserts, never duplicates.
    pub async fn add_edge(
        &self,
        source_id: &str,
        target_id: &str,
        kind: EdgeKind,
    ) -> Result<(), EngineError> {
        let m = if kind.is_symmetric() {
            mutation::add_symmetric_edge(source_id, target_id, kind)
        } else {
            mutation::add_edge(source_id, kind, target_id)
        };
        self.graph.mutate(&m).await?;
        tracing::debug!(source_id, target_id, predicate = kind.predicate(), "edge added");
        Ok(())
    }

    /// Retract an edge; symmetric kinds retract both directions together
    pub async fn remove_edge(
        &self,
        source_id: &str,
        target_id: &str,
        kind: EdgeKind,
    ) -> Result<(), EngineError> {
        let m = if kind.is_symmetric() {
            mutation::remove_symmetric_edge(source_id, target_id, kind)
        } else {
            mutation::remove_edge(source_id, kind, target_id)
        };
        self.graph.mutate(&m).await?;
        tracing::debug!(source_id, target_id, predicate = kind.predicate(), "edge removed");
        Ok(())
    }
}
