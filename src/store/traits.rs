//! Collaborator traits consumed by the engine

use std::sync::Arc;

use serde_json::Value;

use super::errors::StoreResult;
use crate::node::{ChildAssoc, Node, NodeProperties, QName, StoreId, StoreRef};
use crate::query::{PreparedQuery, TypeId};

/// Answer of a row handler to the row source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDecision {
    /// Deliver the next row
    Continue,
    /// Stop producing rows; no further rows may be delivered
    Stop,
}

/// Receives candidate rows one at a time
pub trait RowHandler {
    fn handle_row(&mut self, node: Node) -> RowDecision;
}

impl<F> RowHandler for F
where
    F: FnMut(Node) -> RowDecision,
{
    fn handle_row(&mut self, node: Node) -> RowDecision {
        self(node)
    }
}

/// Streams candidate rows for a prepared query
pub trait RowSource: Send + Sync {
    /// Deliver matching rows in store order until exhausted or the
    /// handler answers [`RowDecision::Stop`].
    fn select_nodes(&self, query: &PreparedQuery, handler: &mut dyn RowHandler)
        -> StoreResult<()>;
}

/// Store and dictionary resolution
pub trait StoreResolver: Send + Sync {
    fn resolve_store(&self, store: &StoreRef) -> Option<StoreId>;

    /// Tenant-qualified form of the store reference
    fn tenant_store(&self, store: &StoreRef) -> StoreRef {
        store.clone()
    }

    fn resolve_type(&self, name: &QName) -> Option<TypeId>;
}

/// Node property and association lookups
pub trait NodeService: Send + Sync {
    fn get_type(&self, node: &Node) -> QName {
        node.type_name.clone()
    }

    fn get_properties(&self, node: &Node) -> Arc<NodeProperties>;

    fn has_aspect(&self, node: &Node, aspect: &QName) -> bool {
        self.get_properties(node).has_aspect(aspect)
    }

    fn get_property(&self, node: &Node, key: &QName) -> Option<Value> {
        self.get_properties(node).get(key).cloned()
    }

    fn get_child_assocs(&self, node: &Node) -> Vec<ChildAssoc>;

    fn get_primary_parent(&self, node: &Node) -> Option<ChildAssoc>;
}
