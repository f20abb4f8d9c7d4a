//! In-memory row store
//!
//! Rows are delivered in insertion order. A node may appear as more than
//! one row (join fan-out); see [`MemoryStore::duplicate_row`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::traits::{NodeService, RowDecision, RowHandler, RowSource, StoreResolver};
use crate::node::{
    names, ChildAssoc, Node, NodeId, NodeProperties, NodeRef, QName, StoreId, StoreRef,
};
use crate::query::{PreparedQuery, TypeId};
use crate::security::{AccessControlList, AclId, Authority, PermissionLookup};

struct StoredNode {
    node: Node,
    props: Arc<NodeProperties>,
}

#[derive(Default)]
struct MemoryState {
    stores: BTreeMap<StoreRef, StoreId>,
    types: BTreeMap<QName, TypeId>,
    nodes: HashMap<NodeId, StoredNode>,
    rows: Vec<NodeId>,
    acls: HashMap<AclId, AccessControlList>,
    primary_parents: HashMap<NodeId, ChildAssoc>,
    next_node_id: u64,
}

impl MemoryState {
    fn type_id(&self, name: &QName) -> Option<TypeId> {
        self.types.get(name).copied()
    }

    fn row_matches(&self, stored: &StoredNode, query: &PreparedQuery) -> bool {
        let node = &stored.node;
        if node.store_id != query.store_id || node.txn_id < query.since_txn {
            return false;
        }
        if let Some(deleted) = query.deleted_type {
            if self.type_id(&node.type_name) == Some(deleted) {
                return false;
            }
        }
        query.predicate.matches(node, &stored.props)
    }
}

/// Thread-safe in-memory store implementing every collaborator trait
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    rows_delivered: AtomicU64,
    property_reads: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.register_type(names::deleted_type());
        store
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a store, returning its identity
    pub fn add_store(&self, store: StoreRef) -> StoreId {
        let mut state = self.write();
        let next = StoreId(state.stores.len() as u64 + 1);
        *state.stores.entry(store).or_insert(next)
    }

    /// Register a dictionary type, returning its identity
    pub fn register_type(&self, name: QName) -> TypeId {
        let mut state = self.write();
        let next = TypeId(state.types.len() as u64 + 1);
        *state.types.entry(name).or_insert(next)
    }

    pub fn add_acl(&self, acl: AccessControlList) {
        self.write().acls.insert(acl.id, acl);
    }

    /// Write a node and append it as a row
    pub fn insert_node(
        &self,
        store: &StoreRef,
        type_name: QName,
        acl_id: Option<AclId>,
        props: NodeProperties,
        txn_id: u64,
    ) -> StoreResult<Node> {
        self.insert_node_with_uuid(store, None, type_name, acl_id, props, txn_id)
    }

    pub fn insert_node_with_uuid(
        &self,
        store: &StoreRef,
        uuid: Option<String>,
        type_name: QName,
        acl_id: Option<AclId>,
        props: NodeProperties,
        txn_id: u64,
    ) -> StoreResult<Node> {
        self.register_type(type_name.clone());
        let mut state = self.write();
        let store_id = *state
            .stores
            .get(store)
            .ok_or_else(|| StoreError::InvalidFixture(format!("Unknown store {}", store)))?;

        state.next_node_id += 1;
        let id = NodeId(state.next_node_id);
        let node = Node {
            id,
            store_id,
            node_ref: NodeRef::new(
                store.clone(),
                uuid.unwrap_or_else(|| Uuid::new_v4().to_string()),
            ),
            type_name,
            acl_id,
            txn_id,
        };
        state.nodes.insert(
            id,
            StoredNode {
                node: node.clone(),
                props: Arc::new(props),
            },
        );
        state.rows.push(id);
        Ok(node)
    }

    /// Deliver an existing node a second time
    pub fn duplicate_row(&self, id: NodeId) {
        let mut state = self.write();
        if state.nodes.contains_key(&id) {
            state.rows.push(id);
        }
    }

    /// Record `child` as a primary child of `parent`
    pub fn set_primary_parent(&self, parent: &Node, child: &Node, name: QName) {
        let assoc = ChildAssoc {
            parent: Some(parent.node_ref.clone()),
            child: child.node_ref.clone(),
            assoc_type: QName::new("cm", "contains"),
            name,
            is_primary: true,
        };
        self.write().primary_parents.insert(child.id, assoc);
    }

    /// Rows handed to row handlers so far
    pub fn rows_delivered(&self) -> u64 {
        self.rows_delivered.load(Ordering::Relaxed)
    }

    /// Property fetches served so far
    pub fn property_reads(&self) -> u64 {
        self.property_reads.load(Ordering::Relaxed)
    }

    fn next_matching_row(&self, query: &PreparedQuery, from: usize) -> Option<(usize, Node)> {
        let state = self.read();
        state
            .rows
            .iter()
            .enumerate()
            .skip(from)
            .filter_map(|(pos, id)| state.nodes.get(id).map(|stored| (pos, stored)))
            .find(|(_, stored)| state.row_matches(stored, query))
            .map(|(pos, stored)| (pos, stored.node.clone()))
    }
}

impl RowSource for MemoryStore {
    fn select_nodes(
        &self,
        query: &PreparedQuery,
        handler: &mut dyn RowHandler,
    ) -> StoreResult<()> {
        // The lock is released before each handler call so handlers may
        // consult this store for permissions and properties.
        let mut position = 0;
        while let Some((pos, node)) = self.next_matching_row(query, position) {
            position = pos + 1;
            self.rows_delivered.fetch_add(1, Ordering::Relaxed);
            if handler.handle_row(node) == RowDecision::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl StoreResolver for MemoryStore {
    fn resolve_store(&self, store: &StoreRef) -> Option<StoreId> {
        self.read().stores.get(store).copied()
    }

    fn resolve_type(&self, name: &QName) -> Option<TypeId> {
        self.read().type_id(name)
    }
}

impl NodeService for MemoryStore {
    fn get_properties(&self, node: &Node) -> Arc<NodeProperties> {
        self.property_reads.fetch_add(1, Ordering::Relaxed);
        self.read()
            .nodes
            .get(&node.id)
            .map(|stored| Arc::clone(&stored.props))
            .unwrap_or_default()
    }

    fn get_child_assocs(&self, node: &Node) -> Vec<ChildAssoc> {
        let state = self.read();
        let mut children: Vec<(NodeId, ChildAssoc)> = state
            .primary_parents
            .iter()
            .filter(|(_, assoc)| assoc.parent.as_ref() == Some(&node.node_ref))
            .map(|(id, assoc)| (*id, assoc.clone()))
            .collect();
        children.sort_by_key(|(id, _)| *id);
        children.into_iter().map(|(_, assoc)| assoc).collect()
    }

    fn get_primary_parent(&self, node: &Node) -> Option<ChildAssoc> {
        self.read().primary_parents.get(&node.id).cloned()
    }
}

impl PermissionLookup for MemoryStore {
    fn readers(&self, acl: AclId) -> BTreeSet<Authority> {
        self.read()
            .acls
            .get(&acl)
            .map(|acl| acl.readers.clone())
            .unwrap_or_default()
    }

    fn denied_readers(&self, acl: AclId) -> BTreeSet<Authority> {
        self.read()
            .acls
            .get(&acl)
            .map(|acl| acl.denied_readers.clone())
            .unwrap_or_default()
    }
}
