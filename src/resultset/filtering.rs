//! Result set exposing the rows of an inner set selected by a mask

use std::sync::Arc;

use super::{ResultSet, ResultSetMetaData};
use crate::node::Node;
use crate::store::NodeService;

pub struct FilteringResultSet {
    inner: Box<dyn ResultSet>,
    /// Inner positions of the included rows, ascending
    included: Vec<usize>,
    metadata: ResultSetMetaData,
}

impl FilteringResultSet {
    /// `mask[i]` says whether inner row `i` is visible. Positions past the
    /// end of the mask are excluded.
    pub fn new(inner: Box<dyn ResultSet>, mask: &[bool], metadata: ResultSetMetaData) -> Self {
        let included = mask
            .iter()
            .enumerate()
            .take(inner.length())
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Self {
            inner,
            included,
            metadata,
        }
    }

    /// Whether inner row `index` is visible
    pub fn is_included(&self, index: usize) -> bool {
        self.included.binary_search(&index).is_ok()
    }

    pub fn inner(&self) -> &dyn ResultSet {
        self.inner.as_ref()
    }
}

impl ResultSet for FilteringResultSet {
    fn length(&self) -> usize {
        self.included.len()
    }

    fn number_found(&self) -> usize {
        self.inner.number_found()
    }

    fn node(&self, index: usize) -> Option<Arc<Node>> {
        self.included
            .get(index)
            .and_then(|&inner_index| self.inner.node(inner_index))
    }

    fn metadata(&self) -> &ResultSetMetaData {
        &self.metadata
    }

    fn node_service(&self) -> &Arc<dyn NodeService> {
        self.inner.node_service()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::resultset::test_support::{nodes, service};
    use crate::resultset::{NodeResultSet, PermissionEvaluationMode};

    #[test]
    fn test_mask_selects_rows() {
        let inner = NodeResultSet::new(nodes(&[1, 2, 3, 4]), service(), ResultSetMetaData::unlimited());
        let metadata = ResultSetMetaData::unlimited();
        let set = FilteringResultSet::new(Box::new(inner), &[true, false, true], metadata);

        assert_eq!(set.length(), 2);
        assert_eq!(set.node(0).unwrap().id, NodeId(1));
        assert_eq!(set.node(1).unwrap().id, NodeId(3));
        assert!(set.node(2).is_none());
        assert!(set.is_included(2));
        assert!(!set.is_included(3));
        assert_eq!(set.number_found(), 4);
    }

    #[test]
    fn test_metadata_is_its_own() {
        let inner = NodeResultSet::new(nodes(&[1]), service(), ResultSetMetaData::unlimited());
        let metadata = ResultSetMetaData {
            evaluation_mode: PermissionEvaluationMode::Eager,
            ..ResultSetMetaData::unlimited()
        };
        let set = FilteringResultSet::new(Box::new(inner), &[true], metadata);
        assert_eq!(set.metadata().evaluation_mode, PermissionEvaluationMode::Eager);
    }
}
