//! Shared node properties cache

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::stats::{CacheCounters, CacheStats};
use crate::node::{ChildAssoc, Node, NodeId, NodeProperties};
use crate::store::NodeService;

/// Aspects and properties keyed by row identity
#[derive(Default)]
pub struct PropertiesCache {
    entries: RwLock<HashMap<NodeId, Arc<NodeProperties>>>,
    counters: CacheCounters,
}

impl PropertiesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<Arc<NodeProperties>> {
        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned();
        match found {
            Some(_) => self.counters.hit(),
            None => self.counters.miss(),
        }
        found
    }

    pub fn set_value(&self, id: NodeId, props: Arc<NodeProperties>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, props);
    }

    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

/// Node service that serves properties from a [`PropertiesCache`],
/// reading through to the wrapped service on a miss
pub struct CachedNodeService {
    inner: Arc<dyn NodeService>,
    cache: Arc<PropertiesCache>,
}

impl CachedNodeService {
    pub fn new(inner: Arc<dyn NodeService>, cache: Arc<PropertiesCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<PropertiesCache> {
        &self.cache
    }
}

impl NodeService for CachedNodeService {
    fn get_properties(&self, node: &Node) -> Arc<NodeProperties> {
        if let Some(props) = self.cache.get(node.id) {
            return props;
        }
        let props = self.inner.get_properties(node);
        self.cache.set_value(node.id, Arc::clone(&props));
        props
    }

    fn get_child_assocs(&self, node: &Node) -> Vec<ChildAssoc> {
        self.inner.get_child_assocs(node)
    }

    fn get_primary_parent(&self, node: &Node) -> Option<ChildAssoc> {
        self.inner.get_primary_parent(node)
    }
}
