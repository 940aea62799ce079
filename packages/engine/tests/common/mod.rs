//! Shared test fixtures
//!
//! `FakeGraphStore` is an in-memory graph backend speaking the engine's
//! wire grammar. It recognizes queries by matching them against the
//! template catalog, honors existence guards the way the real store
//! would, and preserves edge insertion order so cursor paging is
//! deterministic.

#![allow(dead_code)]

use async_trait::async_trait;
use socialgraph_engine::graph::{codec, mutation, queries, GraphClient, GraphError};
use socialgraph_engine::graph::GuardedMutation;
use socialgraph_engine::models::{EdgeKind, MixedKind, QueryMode};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct GraphState {
    /// external id -> kind label
    nodes: BTreeMap<String, String>,
    /// (from, predicate, to) in insertion order
    edges: Vec<(String, String, String)>,
    /// When set, every mutation fails as if the store were unreachable
    fail_mutations: bool,
}

/// In-memory graph store honoring the wire grammar and guard semantics
#[derive(Default)]
pub struct FakeGraphStore {
    state: Mutex<GraphState>,
}

impl FakeGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent mutation fail (simulated outage)
    pub fn set_fail_mutations(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutations = fail;
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.state.lock().unwrap().nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().unwrap().edges.len()
    }

    pub fn has_edge(&self, from: &str, predicate: &str, to: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .edges
            .iter()
            .any(|(f, p, t)| f == from && p == predicate && t == to)
    }

    fn outgoing(state: &GraphState, from: &str, predicate: &str) -> Vec<String> {
        state
            .edges
            .iter()
            .filter(|(f, p, _)| f == from && p == predicate)
            .map(|(_, _, t)| t.clone())
            .collect()
    }

    fn incoming(state: &GraphState, to: &str, predicate: &str) -> Vec<String> {
        state
            .edges
            .iter()
            .filter(|(_, p, t)| t == to && p == predicate)
            .map(|(f, _, _)| f.clone())
            .collect()
    }

    /// Cursor/limit paging over an ordered id list
    fn page(ids: Vec<String>, after: &str, first: usize) -> Vec<String> {
        let skipped: Vec<String> = if after.is_empty() {
            ids
        } else {
            ids.into_iter()
                .skip_while(|id| id != after)
                .skip(1)
                .collect()
        };
        skipped.into_iter().take(first).collect()
    }

    /// Encode a list response: subject declaration, matches, terminator
    fn list_response(source_id: &str, ids: &[String]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend(codec::triple("<0x1>", "entity.id", source_id));
        for (i, id) in ids.iter().enumerate() {
            raw.extend(codec::triple(&format!("<0x{:x}>", i + 2), "entity.id", id));
        }
        raw.extend(b"\n");
        raw
    }

    fn count_response(predicate: &str, count: usize) -> Vec<u8> {
        codec::triple("<0x1>", &format!("count({})", predicate), &count.to_string())
    }

    fn apply_pagination(
        ids: Vec<String>,
        mode: QueryMode,
        vars: &HashMap<String, String>,
    ) -> Vec<String> {
        match mode {
            QueryMode::Page => {
                let after = vars.get("$after").map(String::as_str).unwrap_or("");
                let first: usize = vars
                    .get("$first")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(usize::MAX);
                Self::page(ids, after, first)
            }
            QueryMode::Lookup => {
                let target = vars.get("$target").map(String::as_str).unwrap_or("");
                ids.into_iter().filter(|id| id == target).collect()
            }
            QueryMode::Count => ids,
        }
    }

    fn answer_edge_query(
        &self,
        kind: EdgeKind,
        mode: QueryMode,
        vars: &HashMap<String, String>,
    ) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let source = vars.get("$id").cloned().unwrap_or_default();
        let ids = Self::outgoing(&state, &source, kind.predicate());

        match mode {
            QueryMode::Count => Self::count_response(kind.predicate(), ids.len()),
            _ => {
                let ids = Self::apply_pagination(ids, mode, vars);
                Self::list_response(&source, &ids)
            }
        }
    }

    fn answer_mixed_query(
        &self,
        kind: MixedKind,
        mode: QueryMode,
        vars: &HashMap<String, String>,
    ) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let source = vars.get("$id").cloned().unwrap_or_default();
        let other = vars.get("$other").cloned().unwrap_or_default();

        let ids: Vec<String> = match kind {
            MixedKind::FriendsInCommon => {
                let theirs = Self::outgoing(&state, &other, "friend");
                Self::outgoing(&state, &source, "friend")
                    .into_iter()
                    .filter(|id| theirs.contains(id))
                    .collect()
            }
            MixedKind::FriendsNotInCommon => {
                let theirs = Self::outgoing(&state, &other, "friend");
                Self::outgoing(&state, &source, "friend")
                    .into_iter()
                    .filter(|id| !theirs.contains(id) && *id != other)
                    .collect()
            }
            MixedKind::FollowersInCommon => {
                let theirs = Self::incoming(&state, &other, "follows");
                Self::incoming(&state, &source, "follows")
                    .into_iter()
                    .filter(|id| theirs.contains(id))
                    .collect()
            }
        };

        match mode {
            QueryMode::Count => Self::count_response(kind.name(), ids.len()),
            _ => {
                let ids = Self::apply_pagination(ids, mode, vars);
                Self::list_response(&source, &ids)
            }
        }
    }

    fn answer_count_summary(&self, vars: &HashMap<String, String>) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let source = vars.get("$id").cloned().unwrap_or_default();

        let mut raw = Vec::new();
        for kind in EdgeKind::ALL {
            let count = Self::outgoing(&state, &source, kind.predicate()).len();
            raw.extend(Self::count_response(kind.predicate(), count));
        }
        raw
    }

    fn answer_edge_summary(&self, vars: &HashMap<String, String>) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let source = vars.get("$id").cloned().unwrap_or_default();

        let mut raw = Vec::new();
        for kind in EdgeKind::ALL {
            raw.extend(codec::triple_uid(
                "<0x1>",
                &format!("edges({})", kind.predicate()),
                "<0x0>",
            ));
            for (i, id) in Self::outgoing(&state, &source, kind.predicate())
                .iter()
                .enumerate()
            {
                raw.extend(codec::triple(&format!("<0x{:x}>", i + 2), "entity.id", id));
            }
        }
        raw.extend(b"\n");
        raw
    }

    /// Split a node-to-node triple line into (subject var, predicate)
    fn parse_edge_line(line: &str) -> Option<(&str, &str)> {
        let mut parts = line.split_whitespace();
        let subject = parts.next()?;
        let predicate = parts.next()?.trim_start_matches('<').trim_end_matches('>');
        Some((subject, predicate))
    }

    fn apply_edge_mutation(
        state: &mut GraphState,
        m: &GuardedMutation,
    ) -> Result<(), GraphError> {
        let from_id = m.vars.get("$from_id").cloned().unwrap_or_default();
        let to_id = m.vars.get("$to_id").cloned().unwrap_or_default();

        // Endpoint guard: both nodes must resolve, otherwise the store
        // rejects the transaction.
        if !state.nodes.contains_key(&from_id) || !state.nodes.contains_key(&to_id) {
            return Err(GraphError::client("guard rejected: endpoint does not exist"));
        }

        let directed = |subject: &str, predicate: &str| {
            if subject == "uid(from)" {
                (from_id.clone(), predicate.to_string(), to_id.clone())
            } else {
                (to_id.clone(), predicate.to_string(), from_id.clone())
            }
        };

        for line in String::from_utf8_lossy(&m.set).lines() {
            if let Some((subject, predicate)) = Self::parse_edge_line(line) {
                let edge = directed(subject, predicate);
                if !state.edges.contains(&edge) {
                    state.edges.push(edge);
                }
            }
        }
        for line in String::from_utf8_lossy(&m.del).lines() {
            if let Some((subject, predicate)) = Self::parse_edge_line(line) {
                let edge = directed(subject, predicate);
                state.edges.retain(|e| *e != edge);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GraphClient for FakeGraphStore {
    async fn query(
        &self,
        query: &str,
        vars: &HashMap<String, String>,
    ) -> Result<Vec<u8>, GraphError> {
        for kind in EdgeKind::ALL {
            for mode in [QueryMode::Page, QueryMode::Lookup, QueryMode::Count] {
                if query == queries::edge_query(kind, mode) {
                    return Ok(self.answer_edge_query(kind, mode, vars));
                }
            }
        }
        for kind in MixedKind::ALL {
            for mode in [QueryMode::Page, QueryMode::Lookup, QueryMode::Count] {
                if query == queries::mixed_query(kind, mode) {
                    return Ok(self.answer_mixed_query(kind, mode, vars));
                }
            }
        }
        if query == queries::count_summary_query() {
            return Ok(self.answer_count_summary(vars));
        }
        if query == queries::edge_summary_query() {
            return Ok(self.answer_edge_summary(vars));
        }
        Err(GraphError::client(format!("unrecognized query: {}", query)))
    }

    async fn mutate(&self, m: &GuardedMutation) -> Result<(), GraphError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mutations {
            return Err(GraphError::client("graph store unavailable"));
        }

        if m.guard == mutation::ABSENT_GUARD {
            // Node create: the guard discards the transaction when the id
            // already exists, so repeated creates leave exactly one node.
            let id = m.vars.get("$id").cloned().unwrap_or_default();
            if state.nodes.contains_key(&id) {
                return Ok(());
            }
            let set = String::from_utf8_lossy(&m.set).to_string();
            let kind = set
                .lines()
                .find(|line| line.contains("<entity.kind>"))
                .and_then(|line| {
                    let start = line.find('"')? + 1;
                    let end = line[start..].find('"')? + start;
                    Some(line[start..end].to_string())
                })
                .unwrap_or_default();
            state.nodes.insert(id, kind);
            Ok(())
        } else if m.guard == mutation::PRESENT_GUARD {
            // Node delete: wildcard-removes the node and incident edges;
            // deleting an absent node is discarded by the guard.
            let id = m.vars.get("$id").cloned().unwrap_or_default();
            if state.nodes.remove(&id).is_some() {
                state.edges.retain(|(f, _, t)| f != &id && t != &id);
            }
            Ok(())
        } else if m.guard == mutation::ENDPOINT_GUARD {
            Self::apply_edge_mutation(&mut state, m)
        } else {
            Err(GraphError::client(format!("unrecognized guard: {}", m.guard)))
        }
    }
}
