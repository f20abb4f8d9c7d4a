//! Content-store node model
//!
//! Nodes are produced by the backing store and are read-only from the
//! engine's point of view. The engine never fabricates a node.

mod qname;
mod types;

pub mod names;

pub use qname::{QName, QNameError};
pub use types::{ChildAssoc, Node, NodeId, NodeProperties, NodeRef, PropertyMap, StoreId, StoreRef};
