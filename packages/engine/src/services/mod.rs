//! Service Layer
//!
//! The engine's exposed surface:
//!
//! - [`EdgeService`] - traversal reads (query catalog + wire codec +
//!   hydration) and guarded edge mutations
//! - [`LifecycleService`] - relational-first node create/delete across
//!   both stores, plus background reconciliation
//!
//! Services are plain structs over shared handles; callers needing
//! cancellation drop the returned futures. The engine itself never
//! retries and holds no locks across store calls.

mod edge_service;
mod error;
mod lifecycle_service;

pub use edge_service::EdgeService;
pub use error::{EngineError, StoreSide};
pub use lifecycle_service::LifecycleService;
