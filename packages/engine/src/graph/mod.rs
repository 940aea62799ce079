//! Graph Store Layer
//!
//! Everything that touches the graph store's backend-specific surface:
//!
//! - [`codec`] - wire-grammar parsing and triple encoding
//! - [`queries`] - the closed query template catalog
//! - [`mutation`] - existence-guarded mutation building
//! - [`client`] - the `GraphClient` trait the engine consumes
//!
//! Wire-grammar and guard-syntax assumptions are properties of the chosen
//! backend; swapping backends means reimplementing [`codec`] and
//! [`queries`] behind the same [`GraphClient`] interface.

pub mod codec;
pub mod mutation;
pub mod queries;

mod client;
mod error;

pub use client::GraphClient;
pub use error::GraphError;
pub use mutation::GuardedMutation;
