//! Access control lists and the permission lookup collaborator

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{Authority, SecurityContext};

/// Identity of an access control list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AclId(pub u64);

impl fmt::Display for AclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read grants of one ACL. Denied readers take precedence over readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlList {
    pub id: AclId,
    #[serde(default)]
    pub readers: BTreeSet<Authority>,
    #[serde(default)]
    pub denied_readers: BTreeSet<Authority>,
}

/// Permission service as consumed by the engine
pub trait PermissionLookup: Send + Sync {
    /// Authorities the caller acts as
    fn authorities(&self, ctx: &SecurityContext) -> BTreeSet<Authority> {
        ctx.effective_authorities()
    }

    /// Authorities granted read on the ACL
    fn readers(&self, acl: AclId) -> BTreeSet<Authority>;

    /// Authorities explicitly denied read on the ACL
    fn denied_readers(&self, acl: AclId) -> BTreeSet<Authority>;
}
