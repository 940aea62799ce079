//! Edge Mutation Builder
//!
//! Builds existence-guarded conditional mutations for the graph store.
//! Every mutation ships a var-block query resolving its endpoint ids, a
//! guard of the form `@if(eq(len(var), 1) AND ...)`, and set/del triples
//! encoded by the wire codec. The whole mutation is submitted as a single
//! remote transaction: atomic within the graph store, never across stores.

use crate::graph::codec::{triple, triple_uid};
use crate::graph::queries::{ID_PREDICATE, KIND_PREDICATE};
use crate::models::{EdgeKind, NodeKind};
use std::collections::HashMap;

/// Guard requiring both endpoints to resolve to exactly one node each
///
/// Rejects operations against nonexistent entities, including the race
/// where one endpoint was concurrently deleted.
pub const ENDPOINT_GUARD: &str = "@if(eq(len(from), 1) AND eq(len(to), 1))";

/// Guard requiring that no node with the given id exists yet
pub const ABSENT_GUARD: &str = "@if(eq(len(node), 0))";

/// Guard requiring the node to exist exactly once
pub const PRESENT_GUARD: &str = "@if(eq(len(node), 1))";

/// An existence-guarded mutation, applied atomically by the graph store
#[derive(Debug, Clone)]
pub struct GuardedMutation {
    /// Var-block query resolving the external ids named in `vars`
    pub query: String,
    /// Existence guard controlling whether the triples apply
    pub guard: String,
    /// Triples to assert
    pub set: Vec<u8>,
    /// Triples to retract
    pub del: Vec<u8>,
    /// Variable bindings for `query`
    pub vars: HashMap<String, String>,
}

fn node_query() -> String {
    "query { node as var(func: eq(entity.id, $id)) }".to_string()
}

fn endpoints_query() -> String {
    "query {\n\
     \x20 from as var(func: eq(entity.id, $from_id))\n\
     \x20 to as var(func: eq(entity.id, $to_id))\n\
     }"
    .to_string()
}

fn node_vars(external_id: &str) -> HashMap<String, String> {
    HashMap::from([("$id".to_string(), external_id.to_string())])
}

fn endpoint_vars(from_id: &str, to_id: &str) -> HashMap<String, String> {
    HashMap::from([
        ("$from_id".to_string(), from_id.to_string()),
        ("$to_id".to_string(), to_id.to_string()),
    ])
}

/// Create a graph node carrying the external id and a kind label
///
/// Guarded by "no node with this id already exists": a concurrent or
/// repeated create is discarded by the store, leaving exactly one node.
pub fn create_node(kind: NodeKind, external_id: &str) -> GuardedMutation {
    let mut set = Vec::new();
    set.extend(triple("uid(node)", ID_PREDICATE, external_id));
    set.extend(triple("uid(node)", KIND_PREDICATE, kind.as_str()));

    GuardedMutation {
        query: node_query(),
        guard: ABSENT_GUARD.to_string(),
        set,
        del: Vec::new(),
        vars: node_vars(external_id),
    }
}

/// Wildcard-remove a node and every edge incident to it
///
/// Retracts all outgoing triples and all incoming references in one
/// transaction; used by the lifecycle coordinator and by background
/// reconciliation.
pub fn delete_node(external_id: &str) -> GuardedMutation {
    let mut del = Vec::new();
    del.extend_from_slice(b"uid(node) * * .\n");
    del.extend_from_slice(b"* * uid(node) .\n");

    GuardedMutation {
        query: node_query(),
        guard: PRESENT_GUARD.to_string(),
        set: Vec::new(),
        del,
        vars: node_vars(external_id),
    }
}

/// Assert a single directed edge
pub fn add_edge(from_id: &str, kind: EdgeKind, to_id: &str) -> GuardedMutation {
    GuardedMutation {
        query: endpoints_query(),
        guard: ENDPOINT_GUARD.to_string(),
        set: triple_uid("uid(from)", kind.predicate(), "uid(to)"),
        del: Vec::new(),
        vars: endpoint_vars(from_id, to_id),
    }
}

/// Retract a single directed edge
pub fn remove_edge(from_id: &str, kind: EdgeKind, to_id: &str) -> GuardedMutation {
    GuardedMutation {
        query: endpoints_query(),
        guard: ENDPOINT_GUARD.to_string(),
        set: Vec::new(),
        del: triple_uid("uid(from)", kind.predicate(), "uid(to)"),
        vars: endpoint_vars(from_id, to_id),
    }
}

/// Assert both directions of a symmetric edge in one transaction
///
/// The two triples succeed or fail together inside the graph store, so a
/// half-created symmetric relation is unrepresentable.
pub fn add_symmetric_edge(a_id: &str, b_id: &str, kind: EdgeKind) -> GuardedMutation {
    let predicate = kind.predicate();
    let mut set = Vec::new();
    set.extend(triple_uid("uid(from)", predicate, "uid(to)"));
    set.extend(triple_uid("uid(to)", predicate, "uid(from)"));

    GuardedMutation {
        query: endpoints_query(),
        guard: ENDPOINT_GUARD.to_string(),
        set,
        del: Vec::new(),
        vars: endpoint_vars(a_id, b_id),
    }
}

/// Retract both directions of a symmetric edge in one transaction
pub fn remove_symmetric_edge(a_id: &str, b_id: &str, kind: EdgeKind) -> GuardedMutation {
    let predicate = kind.predicate();
    let mut del = Vec::new();
    del.extend(triple_uid("uid(from)", predicate, "uid(to)"));
    del.extend(triple_uid("uid(to)", predicate, "uid(from)"));

    GuardedMutation {
        query: endpoints_query(),
        guard: ENDPOINT_GUARD.to_string(),
        set: Vec::new(),
        del,
        vars: endpoint_vars(a_id, b_id),
    }
}
