//! Graph Layer Error Types
//!
//! Errors raised by the wire codec and by graph store calls. Format
//! violations are fatal for the call and are never silently ignored
//! for count parsing; zero matches in a list response is success, not
//! an error.

use thiserror::Error;

/// Graph-store operation errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Raw response violates the expected wire grammar
    #[error("Wire format violation: {context}")]
    Format { context: String },

    /// Graph store call failed (transport, transaction, guard rejection)
    #[error("Graph store call failed: {0}")]
    Client(String),
}

impl GraphError {
    /// Create a wire-format violation error
    pub fn format(context: impl Into<String>) -> Self {
        Self::Format {
            context: context.into(),
        }
    }

    /// Create a client failure error
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }
}
