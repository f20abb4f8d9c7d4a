//! Shared node identity cache
//!
//! Nodes enter the cache by registration ([`IdentityCache::set_value`])
//! when the backing store produces a row. The lookup callback is consulted
//! on misses; the engine's callback, [`RegisteredOnly`], never finds
//! anything and refuses to create nodes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::stats::{CacheCounters, CacheStats};
use crate::node::{Node, NodeId, NodeRef};

/// Callback consulted on cache misses
pub trait IdentityLookup: Send + Sync {
    fn find_by_key(&self, id: NodeId) -> Option<Node>;

    fn find_by_value(&self, node_ref: &NodeRef) -> Option<Node>;

    /// Persist a node that is not yet known
    fn create_value(&self, node: Node) -> Node;
}

/// Lookup callback for caches populated only by registration.
///
/// Nodes are produced by the backing store, never by the engine, so a
/// request to create one means the registration discipline is broken.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisteredOnly;

impl IdentityLookup for RegisteredOnly {
    fn find_by_key(&self, _id: NodeId) -> Option<Node> {
        None
    }

    fn find_by_value(&self, _node_ref: &NodeRef) -> Option<Node> {
        None
    }

    fn create_value(&self, node: Node) -> Node {
        panic!("Node creation is not supported: {}", node.node_ref);
    }
}

#[derive(Default)]
struct Entries {
    by_id: HashMap<NodeId, Arc<Node>>,
    by_ref: HashMap<NodeRef, NodeId>,
}

impl Entries {
    fn put(&mut self, node: Node) -> Arc<Node> {
        let node = Arc::new(node);
        if let Some(previous) = self.by_id.insert(node.id, Arc::clone(&node)) {
            if previous.node_ref != node.node_ref {
                self.by_ref.remove(&previous.node_ref);
            }
        }
        self.by_ref.insert(node.node_ref.clone(), node.id);
        node
    }
}

/// Process-wide read-through cache of nodes by row identity
pub struct IdentityCache<L: IdentityLookup = RegisteredOnly> {
    entries: RwLock<Entries>,
    lookup: L,
    counters: CacheCounters,
}

impl IdentityCache<RegisteredOnly> {
    pub fn new() -> Self {
        Self::with_lookup(RegisteredOnly)
    }
}

impl Default for IdentityCache<RegisteredOnly> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: IdentityLookup> IdentityCache<L> {
    pub fn with_lookup(lookup: L) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            lookup,
            counters: CacheCounters::default(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or re-register) a node under its identity
    pub fn set_value(&self, node: Node) -> Arc<Node> {
        self.write().put(node)
    }

    /// Cached node by identity, falling back to the lookup callback
    pub fn get(&self, id: NodeId) -> Option<Arc<Node>> {
        if let Some(node) = self.read().by_id.get(&id) {
            self.counters.hit();
            return Some(Arc::clone(node));
        }
        self.counters.miss();
        self.lookup
            .find_by_key(id)
            .map(|node| self.set_value(node))
    }

    /// Cached node by external reference, falling back to the callback
    pub fn get_by_ref(&self, node_ref: &NodeRef) -> Option<Arc<Node>> {
        {
            let entries = self.read();
            if let Some(node) = entries
                .by_ref
                .get(node_ref)
                .and_then(|id| entries.by_id.get(id))
            {
                self.counters.hit();
                return Some(Arc::clone(node));
            }
        }
        self.counters.miss();
        self.lookup
            .find_by_value(node_ref)
            .map(|node| self.set_value(node))
    }

    /// Cached node for the value's reference, creating it when unknown.
    ///
    /// # Panics
    ///
    /// With [`RegisteredOnly`], panics when the node is not cached.
    pub fn get_or_create(&self, node: Node) -> Arc<Node> {
        if let Some(existing) = self.get_by_ref(&node.node_ref) {
            return existing;
        }
        let created = self.lookup.create_value(node);
        self.set_value(created)
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        let mut entries = self.write();
        entries.by_id.clear();
        entries.by_ref.clear();
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().by_id.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{QName, StoreId, StoreRef};

    fn node(id: u64, uuid: &str) -> Node {
        Node {
            id: NodeId(id),
            store_id: StoreId(1),
            node_ref: NodeRef::new(StoreRef::spaces_store(), uuid),
            type_name: QName::new("cm", "content"),
            acl_id: None,
            txn_id: 1,
        }
    }

    #[test]
    fn test_set_then_get() {
        let cache = IdentityCache::new();
        cache.set_value(node(1, "a"));

        assert_eq!(cache.get(NodeId(1)).unwrap().node_ref.id, "a");
        let by_ref = cache
            .get_by_ref(&NodeRef::new(StoreRef::spaces_store(), "a"))
            .unwrap();
        assert_eq!(by_ref.id, NodeId(1));
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_miss_returns_none_with_registered_only() {
        let cache = IdentityCache::new();
        assert!(cache.get(NodeId(9)).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_reregistration_is_idempotent() {
        let cache = IdentityCache::new();
        cache.set_value(node(1, "a"));
        let first = cache.get(NodeId(1)).unwrap();
        cache.set_value(node(1, "a"));
        let second = cache.get(NodeId(1)).unwrap();

        assert_eq!(*first, *second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reregistration_replaces_stale_reference() {
        let cache = IdentityCache::new();
        cache.set_value(node(1, "a"));
        cache.set_value(node(1, "b"));

        assert!(cache
            .get_by_ref(&NodeRef::new(StoreRef::spaces_store(), "a"))
            .is_none());
        assert!(cache
            .get_by_ref(&NodeRef::new(StoreRef::spaces_store(), "b"))
            .is_some());
    }

    #[test]
    fn test_invalidate_all() {
        let cache = IdentityCache::new();
        cache.set_value(node(1, "a"));
        cache.set_value(node(2, "b"));
        cache.invalidate_all();

        assert!(cache.is_empty());
        assert!(cache.get(NodeId(1)).is_none());
    }

    #[test]
    fn test_get_or_create_returns_registered_node() {
        let cache = IdentityCache::new();
        cache.set_value(node(1, "a"));
        let found = cache.get_or_create(node(1, "a"));
        assert_eq!(found.id, NodeId(1));
    }

    #[test]
    #[should_panic(expected = "Node creation is not supported")]
    fn test_creating_unknown_node_panics() {
        let cache = IdentityCache::new();
        cache.get_or_create(node(5, "never-registered"));
    }

    struct Backfill;

    impl IdentityLookup for Backfill {
        fn find_by_key(&self, id: NodeId) -> Option<Node> {
            Some(node(id.0, "backfilled"))
        }

        fn find_by_value(&self, _node_ref: &NodeRef) -> Option<Node> {
            None
        }

        fn create_value(&self, node: Node) -> Node {
            node
        }
    }

    #[test]
    fn test_lookup_callback_populates_on_miss() {
        let cache = IdentityCache::with_lookup(Backfill);
        assert_eq!(cache.get(NodeId(3)).unwrap().node_ref.id, "backfilled");
        assert_eq!(cache.len(), 1);
    }
}
