//! Edge Types and Pagination
//!
//! `EdgeKind` models the closed set of relationship predicates as a tagged
//! variant so invalid predicates are unrepresentable. Each variant maps to
//! its graph-store predicate name and symmetry; the query templates owned
//! per variant live in [`crate::graph::queries`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of single-node edge predicates
///
/// Symmetric kinds (currently only `Friend`) are always stored as two
/// directed triples created and removed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Friend,
    Follows,
    Blocked,
    Invited,
    Banned,
    LikedBy,
    Confirmed,
}

impl EdgeKind {
    /// Every edge kind, for catalog iteration
    pub const ALL: [EdgeKind; 7] = [
        EdgeKind::Friend,
        EdgeKind::Follows,
        EdgeKind::Blocked,
        EdgeKind::Invited,
        EdgeKind::Banned,
        EdgeKind::LikedBy,
        EdgeKind::Confirmed,
    ];

    /// Predicate name in the graph store's schema
    pub fn predicate(&self) -> &'static str {
        match self {
            EdgeKind::Friend => "friend",
            EdgeKind::Follows => "follows",
            EdgeKind::Blocked => "blocked",
            EdgeKind::Invited => "invited",
            EdgeKind::Banned => "banned",
            EdgeKind::LikedBy => "liked_by",
            EdgeKind::Confirmed => "confirmed",
        }
    }

    /// Whether this edge exists in both directions or in neither
    pub fn is_symmetric(&self) -> bool {
        matches!(self, EdgeKind::Friend)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.predicate())
    }
}

/// Two-node intersection/difference queries
///
/// Mixed queries bind both node parameters and compare their edge sets
/// (e.g. mutual vs. non-mutual friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MixedKind {
    /// Friends present in both nodes' friend sets
    FriendsInCommon,
    /// Friends of the first node absent from the second node's set
    FriendsNotInCommon,
    /// Followers shared by both nodes
    FollowersInCommon,
}

impl MixedKind {
    /// Every mixed kind, for catalog iteration
    pub const ALL: [MixedKind; 3] = [
        MixedKind::FriendsInCommon,
        MixedKind::FriendsNotInCommon,
        MixedKind::FollowersInCommon,
    ];

    /// Stable name used in query template headers and error context
    pub fn name(&self) -> &'static str {
        match self {
            MixedKind::FriendsInCommon => "friends_in_common",
            MixedKind::FriendsNotInCommon => "friends_not_in_common",
            MixedKind::FollowersInCommon => "followers_in_common",
        }
    }
}

impl fmt::Display for MixedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Template selector within the catalog
///
/// `Count` is only ever requested explicitly (through the count
/// operations), never implied by a pagination value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Page,
    Lookup,
    Count,
}

/// Traversal pagination
///
/// - `Page` walks the edge set in traversal order; the cursor for the next
///   page is the external id of the last hydrated entity.
/// - `Lookup` probes for a single target id, bypassing full paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    Page {
        /// Resume after this external id (None = first page)
        cursor: Option<String>,
        /// Page size; clamped to the engine's configured maximum
        limit: Option<u32>,
    },
    Lookup {
        /// External id whose presence in the edge set is probed
        target_id: String,
    },
}

impl Pagination {
    /// First page with the engine's default page size
    pub fn first_page() -> Self {
        Pagination::Page {
            cursor: None,
            limit: None,
        }
    }

    /// Page with an explicit size
    pub fn page(limit: u32) -> Self {
        Pagination::Page {
            cursor: None,
            limit: Some(limit),
        }
    }

    /// Page resuming after a cursor
    pub fn after(cursor: String, limit: u32) -> Self {
        Pagination::Page {
            cursor: Some(cursor),
            limit: Some(limit),
        }
    }

    /// Single-target existence probe
    pub fn lookup(target_id: String) -> Self {
        Pagination::Lookup { target_id }
    }

    /// Pure mode selection: `Lookup` whenever a target id is supplied,
    /// `Page` otherwise
    pub fn mode(&self) -> QueryMode {
        match self {
            Pagination::Page { .. } => QueryMode::Page,
            Pagination::Lookup { .. } => QueryMode::Lookup,
        }
    }
}
