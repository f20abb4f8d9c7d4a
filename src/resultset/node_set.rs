//! Result set over a materialized node list

use std::sync::Arc;

use super::{ResultSet, ResultSetMetaData};
use crate::node::Node;
use crate::store::NodeService;

pub struct NodeResultSet {
    nodes: Vec<Arc<Node>>,
    number_found: usize,
    service: Arc<dyn NodeService>,
    metadata: ResultSetMetaData,
}

impl NodeResultSet {
    /// Set whose `number_found` is its own length
    pub fn new(
        nodes: Vec<Arc<Node>>,
        service: Arc<dyn NodeService>,
        metadata: ResultSetMetaData,
    ) -> Self {
        let number_found = nodes.len();
        Self {
            nodes,
            number_found,
            service,
            metadata,
        }
    }

    pub fn empty(service: Arc<dyn NodeService>, metadata: ResultSetMetaData) -> Self {
        Self::new(Vec::new(), service, metadata)
    }

    pub fn with_number_found(mut self, number_found: usize) -> Self {
        self.number_found = number_found;
        self
    }
}

impl ResultSet for NodeResultSet {
    fn length(&self) -> usize {
        self.nodes.len()
    }

    fn number_found(&self) -> usize {
        self.number_found
    }

    fn node(&self, index: usize) -> Option<Arc<Node>> {
        self.nodes.get(index).cloned()
    }

    fn metadata(&self) -> &ResultSetMetaData {
        &self.metadata
    }

    fn node_service(&self) -> &Arc<dyn NodeService> {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resultset::test_support::{nodes, service};

    #[test]
    fn test_accessors() {
        let set = NodeResultSet::new(nodes(&[4, 8]), service(), ResultSetMetaData::unlimited());
        assert_eq!(set.length(), 2);
        assert_eq!(set.number_found(), 2);
        assert_eq!(set.node_ref(1).unwrap().id, "n8");
        assert!(set.node(2).is_none());
        assert!(!set.has_more());

        let row = set.row(0).unwrap();
        assert_eq!(row.score(), 1.0);
        assert!(row.values().is_empty());
        assert!(row.primary_parent().is_none());
    }

    #[test]
    fn test_number_found_may_exceed_length() {
        let set = NodeResultSet::new(nodes(&[1]), service(), ResultSetMetaData::unlimited())
            .with_number_found(3);
        assert_eq!(set.length(), 1);
        assert_eq!(set.number_found(), 3);
    }
}
