//! Per-row read decisions under a check budget

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::budget::CheckBudget;
use crate::cache::{AccessDecisionCache, IdentityCache};
use crate::node::{names, Node};
use crate::security::{AclId, Authority, PermissionLookup, SecurityContext};
use crate::store::NodeService;

/// Mutable state of one query execution's assessment.
///
/// Never shared between executions.
#[derive(Debug, Default)]
pub struct AssessmentState {
    checks: u64,
    started: Option<Instant>,
    decisions: AccessDecisionCache,
}

impl AssessmentState {
    /// Rows assessed so far, included or not
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Time of the first assessment
    pub fn started(&self) -> Option<Instant> {
        self.started
    }

    pub fn decisions(&self) -> &AccessDecisionCache {
        &self.decisions
    }

    fn elapsed(&self) -> Duration {
        self.started.map(|t| t.elapsed()).unwrap_or_default()
    }
}

/// Decides row visibility for one security context
pub struct PermissionAssessor {
    context: SecurityContext,
    authorities: BTreeSet<Authority>,
    permissions: Arc<dyn PermissionLookup>,
    nodes: Arc<dyn NodeService>,
    identity: Arc<IdentityCache>,
    budget: CheckBudget,
    state: AssessmentState,
}

impl PermissionAssessor {
    pub fn new(
        context: SecurityContext,
        permissions: Arc<dyn PermissionLookup>,
        nodes: Arc<dyn NodeService>,
        identity: Arc<IdentityCache>,
        budget: CheckBudget,
    ) -> Self {
        let authorities = permissions.authorities(&context);
        Self {
            context,
            authorities,
            permissions,
            nodes,
            identity,
            budget,
            state: AssessmentState::default(),
        }
    }

    /// Whether the caller may see `node`. Every call counts against the
    /// budget.
    pub fn is_included(&mut self, node: &Node) -> bool {
        if self.state.started.is_none() {
            self.state.started = Some(Instant::now());
        }
        self.state.checks += 1;

        if self.context.is_absent() {
            return false;
        }
        if self.context.is_admin {
            return true;
        }
        if let Some(acl) = node.acl_id {
            if self.can_read(acl) {
                return true;
            }
        }
        self.is_owner(node)
    }

    /// Whether the caller's authorities grant read on the ACL. Memoized
    /// for the lifetime of this assessor.
    pub fn can_read(&mut self, acl: AclId) -> bool {
        let permissions = &self.permissions;
        let authorities = &self.authorities;
        self.state.decisions.get_or_decide(acl, || {
            let denied = permissions.denied_readers(acl);
            if denied.iter().any(|a| authorities.contains(a)) {
                return false;
            }
            permissions
                .readers(acl)
                .iter()
                .any(|a| authorities.contains(a))
        })
    }

    fn is_owner(&self, node: &Node) -> bool {
        let Some(user) = self.context.user.as_deref() else {
            return false;
        };

        // Register before the property lookups so they are served from
        // the shared caches.
        let node = match self.identity.get(node.id) {
            Some(cached) => cached,
            None => self.identity.set_value(node.clone()),
        };

        let owner_key = if self.nodes.has_aspect(&node, &names::auditable_aspect()) {
            names::creator_property()
        } else if self.nodes.has_aspect(&node, &names::ownable_aspect()) {
            names::owner_property()
        } else {
            return false;
        };

        matches!(
            self.nodes.get_property(&node, &owner_key),
            Some(Value::String(owner)) if owner == user
        )
    }

    /// True once the check count or time budget is spent
    pub fn should_quit_checks(&self) -> bool {
        self.budget.is_exhausted(self.state.checks, self.state.elapsed())
    }

    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub fn budget(&self) -> CheckBudget {
        self.budget
    }
}
