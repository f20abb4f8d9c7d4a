//! Security context and ACL lookups
//!
//! The engine never mutates ACLs. It only reads reader and denied-reader
//! authority sets through [`PermissionLookup`].

mod acl;
mod context;

pub use acl::{AccessControlList, AclId, PermissionLookup};
pub use context::{Authority, SecurityContext};
