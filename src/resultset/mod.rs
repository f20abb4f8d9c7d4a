//! Result sets produced by the query executor
//!
//! A result set is an ordered sequence of visible nodes plus:
//! - `number_found`: rows scanned and matched, which may exceed `length`
//! - paging metadata saying whether the size is exact or capped
//!
//! Result sets never resume a cursor; `has_more` is always false.

mod filtering;
mod metadata;
mod node_set;
mod paging;
mod results;
mod row;

pub use filtering::FilteringResultSet;
pub use metadata::{LimitBy, PermissionEvaluationMode, ResultSetMetaData};
pub use node_set::NodeResultSet;
pub use paging::PagingResultSet;
pub use results::QueryEngineResults;
pub use row::ResultRow;

use std::sync::Arc;

use crate::node::{Node, NodeRef};
use crate::store::NodeService;

/// Read-only view over the rows of one query
pub trait ResultSet: Send + Sync {
    /// Visible rows
    fn length(&self) -> usize;

    /// Rows scanned and matched up to the point scanning stopped
    fn number_found(&self) -> usize;

    fn node(&self, index: usize) -> Option<Arc<Node>>;

    fn metadata(&self) -> &ResultSetMetaData;

    /// Service that answers row property lookups
    fn node_service(&self) -> &Arc<dyn NodeService>;

    fn node_ref(&self, index: usize) -> Option<NodeRef> {
        self.node(index).map(|node| node.node_ref.clone())
    }

    fn row(&self, index: usize) -> Option<ResultRow> {
        self.node(index)
            .map(|node| ResultRow::new(node, Arc::clone(self.node_service())))
    }

    fn has_more(&self) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.length() == 0
    }

    fn nodes(&self) -> Vec<Arc<Node>> {
        (0..self.length()).filter_map(|i| self.node(i)).collect()
    }

    fn rows(&self) -> Vec<ResultRow> {
        (0..self.length()).filter_map(|i| self.row(i)).collect()
    }
}
