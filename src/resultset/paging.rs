//! Skip/max window over an inner result set

use std::sync::Arc;

use super::{ResultSet, ResultSetMetaData};
use crate::node::Node;
use crate::store::NodeService;

pub struct PagingResultSet {
    inner: Box<dyn ResultSet>,
    start: usize,
    length: usize,
    metadata: ResultSetMetaData,
}

impl PagingResultSet {
    /// Window of at most `max_items` rows starting at `skip_count`.
    /// `number_found` stays the inner set's total.
    pub fn new(
        inner: Box<dyn ResultSet>,
        skip_count: usize,
        max_items: Option<usize>,
        metadata: ResultSetMetaData,
    ) -> Self {
        let available = inner.length().saturating_sub(skip_count);
        let length = max_items.map_or(available, |max| available.min(max));
        Self {
            inner,
            start: skip_count,
            length,
            metadata,
        }
    }
}

impl ResultSet for PagingResultSet {
    fn length(&self) -> usize {
        self.length
    }

    fn number_found(&self) -> usize {
        self.inner.number_found()
    }

    fn node(&self, index: usize) -> Option<Arc<Node>> {
        if index >= self.length {
            return None;
        }
        self.inner.node(self.start + index)
    }

    fn metadata(&self) -> &ResultSetMetaData {
        &self.metadata
    }

    fn node_service(&self) -> &Arc<dyn NodeService> {
        self.inner.node_service()
    }
}
