//! Caller security context

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A principal (user or group) that can be granted or denied read access
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(pub String);

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Group every authenticated caller belongs to
    pub fn everyone() -> Self {
        Self::new("GROUP_EVERYONE")
    }

    /// Privileged administrator role
    pub fn administrator() -> Self {
        Self::new("ROLE_ADMINISTRATOR")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authorities and identity of the current caller.
///
/// The default context is anonymous. A non-admin context without a user
/// is treated the same way, see [`SecurityContext::is_absent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityContext {
    /// Caller identity, used for the owner override
    #[serde(default)]
    pub user: Option<String>,

    /// Authorities held by the caller (groups, roles)
    #[serde(default)]
    pub authorities: BTreeSet<Authority>,

    /// Whether the administrator role is held
    #[serde(default)]
    pub is_admin: bool,

    /// Whether there is no authenticated caller
    #[serde(default)]
    pub is_anonymous: bool,
}

impl Default for SecurityContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl SecurityContext {
    /// Context for an authenticated, non-privileged user
    pub fn authenticated<I>(user: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = Authority>,
    {
        Self {
            user: Some(user.into()),
            authorities: authorities.into_iter().collect(),
            is_admin: false,
            is_anonymous: false,
        }
    }

    /// Context for a caller holding the administrator role
    pub fn administrator(user: impl Into<String>) -> Self {
        let mut authorities = BTreeSet::new();
        authorities.insert(Authority::administrator());
        Self {
            user: Some(user.into()),
            authorities,
            is_admin: true,
            is_anonymous: false,
        }
    }

    /// Context with no caller at all
    pub fn anonymous() -> Self {
        Self {
            user: None,
            authorities: BTreeSet::new(),
            is_admin: false,
            is_anonymous: true,
        }
    }

    /// True for the anonymous context and for a non-admin context that
    /// names no user
    pub fn is_absent(&self) -> bool {
        self.is_anonymous || (self.user.is_none() && !self.is_admin)
    }

    /// Every authority the caller acts as: its explicit authorities, its
    /// own user name, and the everyone group when authenticated.
    pub fn effective_authorities(&self) -> BTreeSet<Authority> {
        let mut all = self.authorities.clone();
        if self.is_absent() {
            return all;
        }
        if let Some(user) = &self.user {
            all.insert(Authority::new(user.clone()));
        }
        all.insert(Authority::everyone());
        all
    }
}
