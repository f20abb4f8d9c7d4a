//! Caches used during query execution
//!
//! - [`IdentityCache`]: shared across executions; maps row identity to a
//!   materialized node with a reverse lookup by external reference.
//! - [`PropertiesCache`]: shared across executions; node aspects and
//!   properties, read through by [`CachedNodeService`].
//! - [`AccessDecisionCache`]: owned by one execution; memoizes ACL read
//!   decisions for the current caller.
//!
//! Shared caches are only ever added to or overwritten during normal
//! execution. `invalidate_all` is administrative and gives no isolation
//! against concurrently running queries; a query observing a cleared cache
//! mid-scan simply pays for the misses.

mod decision;
mod identity;
mod properties;
mod stats;

pub use decision::AccessDecisionCache;
pub use identity::{IdentityCache, IdentityLookup, RegisteredOnly};
pub use properties::{CachedNodeService, PropertiesCache};
pub use stats::{CacheCounters, CacheStats};
