//! Backing-store collaborators
//!
//! The engine consumes the row store through narrow traits: a streaming
//! row source with a cooperative stop signal, store/type resolution, and
//! node property lookups. [`MemoryStore`] implements all of them (plus
//! [`PermissionLookup`](crate::security::PermissionLookup)) for the CLI
//! and tests.

mod errors;
mod fixture;
mod memory;
mod traits;

pub use errors::{StoreError, StoreResult};
pub use fixture::{Fixture, FixtureNode};
pub use memory::MemoryStore;
pub use traits::{NodeService, RowDecision, RowHandler, RowSource, StoreResolver};
