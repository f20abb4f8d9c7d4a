//! Permission filter applied to a result set after the query ran
//!
//! Used downstream of the standard path, whose result sets carry no
//! permission evaluation.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::assessor::PermissionAssessor;
use super::budget::CheckBudget;
use crate::cache::IdentityCache;
use crate::node::{names, Node, QName};
use crate::observability::{log_event_with_fields, Event, Timer};
use crate::query::QueryOptions;
use crate::resultset::{
    FilteringResultSet, LimitBy, PermissionEvaluationMode, ResultSet, ResultSetMetaData,
};
use crate::security::{PermissionLookup, SecurityContext};
use crate::store::NodeService;

pub struct AfterInvocationFilter {
    permissions: Arc<dyn PermissionLookup>,
    identity: Arc<IdentityCache>,
    unfiltered_types: BTreeSet<QName>,
    budget: CheckBudget,
}

impl AfterInvocationFilter {
    pub fn new(permissions: Arc<dyn PermissionLookup>, identity: Arc<IdentityCache>) -> Self {
        Self {
            permissions,
            identity,
            unfiltered_types: BTreeSet::new(),
            budget: CheckBudget::unbounded(),
        }
    }

    /// Types and aspects passed through without a read check
    pub fn with_unfiltered_types(mut self, types: BTreeSet<QName>) -> Self {
        self.unfiltered_types = types;
        self
    }

    /// Server default budget; per-call overrides still apply
    pub fn with_budget(mut self, budget: CheckBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Keep the rows the caller may read.
    ///
    /// Rows are checked in order. Missing and deleted nodes, and nodes whose
    /// type or any aspect is unfiltered, pass without a check. Once
    /// `max_checks` rows were checked or the time budget is exceeded, the
    /// row at the cutoff is kept unchecked, the rows after it are dropped,
    /// and the set is marked as capped by permission evaluations. With an
    /// item limit, at most `max_items + skip_count` included rows are kept.
    pub fn filter(
        &self,
        results: Box<dyn ResultSet>,
        context: &SecurityContext,
        options: &QueryOptions,
    ) -> FilteringResultSet {
        let budget = self.budget.with_overrides(options);
        let nodes = Arc::clone(results.node_service());
        let mut assessor = PermissionAssessor::new(
            context.clone(),
            Arc::clone(&self.permissions),
            Arc::clone(&nodes),
            Arc::clone(&self.identity),
            CheckBudget::unbounded(),
        );

        let timer = Timer::new();
        let mut mask = vec![false; results.length()];
        let mut limit_by = LimitBy::Unlimited;

        for (i, keep) in mask.iter_mut().enumerate() {
            let count_spent = budget.max_checks().is_some_and(|max| i as u64 >= max);
            let time_spent = budget.max_time().is_some_and(|max| timer.elapsed() > max);
            if count_spent || time_spent {
                *keep = true;
                limit_by = LimitBy::NumberOfPermissionEvaluations;
                log_event_with_fields(
                    Event::PostFilterCutoff,
                    &[
                        ("checked", &i.to_string()),
                        ("elapsed_ms", &timer.elapsed_ms().to_string()),
                    ],
                );
                break;
            }

            *keep = match results.node(i) {
                Some(node) => {
                    self.is_unfiltered(nodes.as_ref(), &node) || assessor.is_included(&node)
                }
                None => true,
            };
        }

        if let Some(max_items) = options.max_items() {
            let allowed = max_items.saturating_add(options.skip_count);
            let mut kept = 0;
            for keep in mask.iter_mut().filter(|keep| **keep) {
                if kept < allowed {
                    kept += 1;
                } else {
                    *keep = false;
                    if limit_by == LimitBy::Unlimited {
                        limit_by = LimitBy::FinalSize;
                    }
                }
            }
        }

        let metadata = ResultSetMetaData::new(
            limit_by,
            PermissionEvaluationMode::Eager,
            options.max_items(),
            options.skip_count,
        );
        FilteringResultSet::new(results, &mask, metadata)
    }

    fn is_unfiltered(&self, nodes: &dyn NodeService, node: &Node) -> bool {
        let type_name = nodes.get_type(node);
        if type_name == names::deleted_type() || self.unfiltered_types.contains(&type_name) {
            return true;
        }
        if self.unfiltered_types.is_empty() {
            return false;
        }
        nodes
            .get_properties(node)
            .aspects
            .iter()
            .any(|aspect| self.unfiltered_types.contains(aspect))
    }
}
