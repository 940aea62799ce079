//! GraphClient Trait - Graph Store Abstraction Layer
//!
//! The seam between the engine and whatever graph backend is wired in.
//! Queries return the raw bytes of the line-oriented response grammar
//! (decoded by [`crate::graph::codec`]); mutations commit or discard
//! atomically within the graph store's own transaction.
//!
//! Implementations must be `Send + Sync`; the engine shares one client
//! across many concurrent callers and relies entirely on the client's own
//! thread-safety contract. The engine performs no internal retries -
//! transient failures propagate to the caller.

use crate::graph::error::GraphError;
use crate::graph::mutation::GuardedMutation;
use async_trait::async_trait;
use std::collections::HashMap;

/// Abstraction over the graph store's query and mutation endpoints
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Execute a read-only catalog query with variable bindings
    ///
    /// Returns the raw response bytes in the store's wire grammar.
    async fn query(
        &self,
        query: &str,
        vars: &HashMap<String, String>,
    ) -> Result<Vec<u8>, GraphError>;

    /// Apply an existence-guarded mutation as one remote transaction
    async fn mutate(&self, mutation: &GuardedMutation) -> Result<(), GraphError>;
}
