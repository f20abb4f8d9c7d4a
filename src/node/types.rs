//! Node identity and record types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::QName;
use crate::security::AclId;

/// Internal row identity of a node, unique within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal identity of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub u64);

/// Logical store reference: `protocol://identifier`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreRef {
    pub protocol: String,
    pub identifier: String,
}

impl StoreRef {
    pub fn new(protocol: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            identifier: identifier.into(),
        }
    }

    /// The default workspace store
    pub fn spaces_store() -> Self {
        Self::new("workspace", "SpacesStore")
    }
}

impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.identifier)
    }
}

/// Stable external reference to a node: store plus UUID-like id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub store: StoreRef,
    pub id: String,
}

impl NodeRef {
    pub fn new(store: StoreRef, id: impl Into<String>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.store, self.id)
    }
}

/// Property values keyed by qualified name
pub type PropertyMap = BTreeMap<QName, Value>;

/// A node record as materialized from the backing store.
///
/// Properties are not part of the record; they are fetched lazily through
/// the node service and cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub store_id: StoreId,
    pub node_ref: NodeRef,
    pub type_name: QName,
    pub acl_id: Option<AclId>,
    /// Transaction that last wrote this node
    pub txn_id: u64,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_ref(&self) -> &NodeRef {
        &self.node_ref
    }

    pub fn acl_id(&self) -> Option<AclId> {
        self.acl_id
    }
}

/// Aspects and property values of one node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    #[serde(default)]
    pub aspects: BTreeSet<QName>,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl NodeProperties {
    pub fn has_aspect(&self, aspect: &QName) -> bool {
        self.aspects.contains(aspect)
    }

    pub fn get(&self, key: &QName) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Parent-child association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildAssoc {
    pub parent: Option<NodeRef>,
    pub child: NodeRef,
    pub assoc_type: QName,
    pub name: QName,
    pub is_primary: bool,
}
