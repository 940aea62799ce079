//! Data Structures
//!
//! Core model types for the relationship engine:
//!
//! - [`Entity`] - a node's relational record (descriptive attributes)
//! - [`NodeKind`] - the closed set of node kinds shared by both stores
//! - [`EdgeKind`] / [`MixedKind`] - the closed set of edge predicates
//! - [`Pagination`] - traversal pagination modes (page, lookup)
//! - [`Projection`] - relational field selection for hydration

mod edge;
mod entity;

pub use edge::{EdgeKind, MixedKind, Pagination, QueryMode};
pub use entity::{
    new_external_id, Entity, EntityAttributes, Field, NodeKind, Projection, ValidationError,
};
