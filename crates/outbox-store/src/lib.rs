//! Durable queue store for outbound chat messages.
//!
//! Messages are appended here synchronously before any network attempt and
//! removed only once the server has acknowledged them. The store holds no
//! network state and performs no retries of its own; durability and
//! liveness fail independently.

mod error;
mod migrations;
mod models;
mod store;

pub use error::{StoreError, StoreResult};
pub use models::PendingMessage;
pub use store::QueueStore;
