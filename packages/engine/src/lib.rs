//! socialgraph-engine - Dual-Store Relationship Engine
//!
//! Relationship storage split across two stores: a graph store holding
//! the edges (friendships, follows, blocks, ...) behind a line-oriented
//! triple protocol, and a libsql relational store holding every node's
//! descriptive record. The engine keeps the two consistent without a
//! shared transaction and hydrates graph traversal results into full
//! relational records.
//!
//! # Architecture
//!
//! - [`models`] - entity records, the closed edge-kind set, pagination
//! - [`graph`] - wire codec, query template catalog, guarded mutation
//!   builder, and the [`graph::GraphClient`] transport trait
//! - [`db`] - libsql connection management, entity rows, and the durable
//!   reconciliation log
//! - [`services`] - the exposed operations: [`services::EdgeService`]
//!   for traversals and edge mutations, [`services::LifecycleService`]
//!   for cross-store node create/delete
//! - [`config`] - engine tunables (page size bounds)

pub mod config;
pub mod db;
pub mod graph;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use db::{Database, EntityStore};
pub use graph::{GraphClient, GraphError};
pub use models::{
    EdgeKind, Entity, EntityAttributes, Field, MixedKind, NodeKind, Pagination, Projection,
};
pub use services::{EdgeService, EngineError, LifecycleService};
