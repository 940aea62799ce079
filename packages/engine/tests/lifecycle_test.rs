//! Integration tests for cross-store node lifecycle
//!
//! Exercises the relational-first create/delete ordering, rollback on
//! graph failure, and the durable reconciliation log, against the fake
//! graph store and a real in-memory libsql database.

mod common;

use common::FakeGraphStore;
use socialgraph_engine::db::ReconcileAction;
use socialgraph_engine::graph::mutation;
use socialgraph_engine::graph::GraphClient;
use socialgraph_engine::models::{EdgeKind, EntityAttributes, NodeKind};
use socialgraph_engine::services::{EdgeService, EngineError, LifecycleService, StoreSide};
use socialgraph_engine::{Database, EngineConfig, EntityStore};
use serde_json::json;
use std::sync::Arc;

struct Harness {
    graph: Arc<FakeGraphStore>,
    entities: EntityStore,
    edges: EdgeService,
    lifecycle: LifecycleService,
}

async fn harness() -> Harness {
    let graph = Arc::new(FakeGraphStore::new());
    let db = Arc::new(Database::new_in_memory().await.unwrap());
    let entities = EntityStore::new(db);

    Harness {
        graph: graph.clone(),
        entities: entities.clone(),
        edges: EdgeService::new(graph.clone(), entities.clone(), EngineConfig::default()),
        lifecycle: LifecycleService::new(graph, entities),
    }
}

#[tokio::test]
async fn test_create_node_lands_in_both_stores() -> anyhow::Result<()> {
    let h = harness().await;
    let attrs = EntityAttributes::new()
        .with_display_name("Ada".to_string())
        .with_properties(json!({ "timezone": "UTC" }));

    h.lifecycle.create_node(NodeKind::User, "u-1", &attrs).await?;

    assert!(h.graph.has_node("u-1"));
    let entity = h.entities.get_entity("u-1").await?.unwrap();
    assert_eq!(entity.kind, NodeKind::User);
    assert_eq!(entity.display_name, Some("Ada".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_graph_failure_rolls_back_relational_insert() {
    let h = harness().await;
    h.graph.set_fail_mutations(true);

    let err = h
        .lifecycle
        .create_node(NodeKind::User, "u-1", &EntityAttributes::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::CrossStore {
            store: StoreSide::Graph,
            ..
        }
    ));
    // Neither store retains the half-created node
    assert!(!h.graph.has_node("u-1"));
    assert!(h.entities.get_entity("u-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_create_fails_before_touching_graph() {
    let h = harness().await;
    h.lifecycle
        .create_node(NodeKind::User, "u-1", &EntityAttributes::new())
        .await
        .unwrap();

    let err = h
        .lifecycle
        .create_node(NodeKind::Post, "u-1", &EntityAttributes::new())
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Database(_)));
    assert_eq!(h.graph.node_count(), 1);
}

#[tokio::test]
async fn test_create_mutation_is_idempotent_in_graph() {
    let graph = FakeGraphStore::new();
    let m = mutation::create_node(NodeKind::User, "u-1");

    // A concurrent duplicate is discarded by the absence guard
    graph.mutate(&m).await.unwrap();
    graph.mutate(&m).await.unwrap();

    assert_eq!(graph.node_count(), 1);
}

#[tokio::test]
async fn test_validation_rejects_non_object_properties() {
    let h = harness().await;
    let attrs = EntityAttributes::new().with_properties(json!("not an object"));

    let err = h
        .lifecycle
        .create_node(NodeKind::User, "u-1", &attrs)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert!(!h.graph.has_node("u-1"));
}

#[tokio::test]
async fn test_delete_removes_node_and_incident_edges() {
    let h = harness().await;
    h.lifecycle
        .create_node(NodeKind::User, "u-1", &EntityAttributes::new())
        .await
        .unwrap();
    h.lifecycle
        .create_node(NodeKind::User, "u-2", &EntityAttributes::new())
        .await
        .unwrap();
    h.edges.add_edge("u-1", "u-2", EdgeKind::Follows).await.unwrap();
    h.edges.add_edge("u-1", "u-2", EdgeKind::Friend).await.unwrap();

    h.lifecycle.delete_node("u-2").await.unwrap();

    assert!(!h.graph.has_node("u-2"));
    assert_eq!(h.graph.edge_count(), 0);
    assert!(h.entities.get_entity("u-2").await.unwrap().is_none());
    assert!(h.graph.has_node("u-1"));
}

#[tokio::test]
async fn test_delete_unknown_node_is_noop() {
    let h = harness().await;

    h.lifecycle.delete_node("ghost").await.unwrap();

    assert!(h.lifecycle.pending_reconciliations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_graph_failure_queues_reconciliation() {
    let h = harness().await;
    h.lifecycle
        .create_node(NodeKind::User, "u-1", &EntityAttributes::new())
        .await
        .unwrap();
    h.graph.set_fail_mutations(true);

    // The call still succeeds: the relational delete committed and the
    // graph cleanup becomes a durable obligation.
    h.lifecycle.delete_node("u-1").await.unwrap();

    assert!(h.entities.get_entity("u-1").await.unwrap().is_none());
    assert!(h.graph.has_node("u-1"));

    let pending = h.lifecycle.pending_reconciliations().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].external_id, "u-1");
    assert_eq!(pending[0].action, ReconcileAction::DeleteNode);
}

#[tokio::test]
async fn test_retry_pending_resolves_once_graph_recovers() {
    let h = harness().await;
    h.lifecycle
        .create_node(NodeKind::User, "u-1", &EntityAttributes::new())
        .await
        .unwrap();
    h.graph.set_fail_mutations(true);
    h.lifecycle.delete_node("u-1").await.unwrap();

    // Still failing: nothing resolves, the attempt counter moves
    assert_eq!(h.lifecycle.retry_pending().await.unwrap(), 0);
    let pending = h.lifecycle.pending_reconciliations().await.unwrap();
    assert_eq!(pending[0].attempts, 1);

    // Recovered: the orphaned graph node is swept
    h.graph.set_fail_mutations(false);
    assert_eq!(h.lifecycle.retry_pending().await.unwrap(), 1);
    assert!(h.lifecycle.pending_reconciliations().await.unwrap().is_empty());
    assert!(!h.graph.has_node("u-1"));
}

#[tokio::test]
async fn test_update_attributes_replaces_relational_row_only() {
    let h = harness().await;
    let attrs = EntityAttributes::new().with_display_name("Ada".to_string());
    h.lifecycle
        .create_node(NodeKind::User, "u-1", &attrs)
        .await
        .unwrap();

    let updated = EntityAttributes::new().with_handle("ada".to_string());
    h.lifecycle.update_attributes("u-1", &updated).await.unwrap();

    let entity = h.entities.get_entity("u-1").await.unwrap().unwrap();
    assert_eq!(entity.handle, Some("ada".to_string()));
    // Full replacement semantics
    assert_eq!(entity.display_name, None);
    assert!(h.graph.has_node("u-1"));
}

#[tokio::test]
async fn test_update_attributes_unknown_entity() {
    let h = harness().await;

    let err = h
        .lifecycle
        .update_attributes("ghost", &EntityAttributes::new())
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnknownEntity { .. }));
}
