//! Query prepared against one store

use serde::{Deserialize, Serialize};

use super::constraint::PreparedPredicate;
use crate::node::{StoreId, StoreRef};

/// Dictionary identity of a type name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u64);

/// A query bound to a resolved store, ready for the row source
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub store_id: StoreId,
    /// Tenant-qualified store reference
    pub store: StoreRef,
    /// Transaction floor (inclusive)
    pub since_txn: u64,
    /// Type of tombstoned nodes; `None` when the dictionary has no such type
    pub deleted_type: Option<TypeId>,
    pub predicate: PreparedPredicate,
}
