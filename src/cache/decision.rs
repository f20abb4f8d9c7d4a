//! Per-execution ACL decision cache
//!
//! - Valid only for one query execution and one security context
//! - Discarded when the execution ends
//! - Entries are never updated once recorded

use std::collections::HashMap;

use super::stats::CacheStats;
use crate::security::AclId;

/// Memoized "can the caller read this ACL" decisions
#[derive(Debug, Default)]
pub struct AccessDecisionCache {
    decisions: HashMap<AclId, bool>,
    stats: CacheStats,
}

impl AccessDecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a recorded decision
    pub fn get(&mut self, acl: AclId) -> Option<bool> {
        match self.decisions.get(&acl) {
            Some(decision) => {
                self.stats.hits += 1;
                Some(*decision)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Record a decision; an existing entry is kept as is
    pub fn insert(&mut self, acl: AclId, decision: bool) {
        self.decisions.entry(acl).or_insert(decision);
    }

    /// Return the recorded decision or compute and record it
    pub fn get_or_decide(&mut self, acl: AclId, decide: impl FnOnce() -> bool) -> bool {
        if let Some(decision) = self.get(acl) {
            return decision;
        }
        let decision = decide();
        self.insert(acl, decision);
        decision
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
