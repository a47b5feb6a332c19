//! Storage backends for the commerce core.
//!
//! The [`CommerceStore`] trait is the seam between the HTTP layer and
//! persistence. Two implementations:
//! - [`PostgresCommerceStore`] — production backend; every lifecycle
//!   operation runs in one transaction and stock rows are locked with
//!   `SELECT ... FOR UPDATE`.
//! - [`InMemoryCommerceStore`] — test backend with the same contract,
//!   serialized by a single writer lock.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryCommerceStore;
pub use postgres::PostgresCommerceStore;
pub use store::CommerceStore;
