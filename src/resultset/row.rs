//! One row of a result set

use std::sync::Arc;

use serde_json::Value;

use crate::node::{ChildAssoc, Node, NodeRef, PropertyMap, QName};
use crate::store::NodeService;

/// A visible node with lookups derived through the node service
#[derive(Clone)]
pub struct ResultRow {
    node: Arc<Node>,
    service: Arc<dyn NodeService>,
}

impl ResultRow {
    pub fn new(node: Arc<Node>, service: Arc<dyn NodeService>) -> Self {
        Self { node, service }
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    pub fn node_ref(&self) -> &NodeRef {
        &self.node.node_ref
    }

    pub fn value(&self, key: &QName) -> Option<Value> {
        self.service.get_property(&self.node, key)
    }

    /// Every property of the node
    pub fn values(&self) -> PropertyMap {
        self.service.get_properties(&self.node).properties.clone()
    }

    pub fn primary_parent(&self) -> Option<ChildAssoc> {
        self.service.get_primary_parent(&self.node)
    }

    /// Relevance score. Always 1.0; rows are not ranked.
    pub fn score(&self) -> f32 {
        1.0
    }
}

impl std::fmt::Debug for ResultRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultRow")
            .field("node_ref", &self.node.node_ref)
            .finish()
    }
}
