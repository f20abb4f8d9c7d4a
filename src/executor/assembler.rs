//! Streaming, permission-filtered result assembly
//!
//! Consumes candidate rows one at a time from the row source:
//! 1. Stop once `required_count` included rows were accumulated
//! 2. Register the row in the identity cache
//! 3. Assess the row; rows before the skip offset are assessed but kept
//!    only as placeholders
//! 4. Stop once the permission budget or the caller's deadline is spent
//!
//! `number_found` counts accumulated rows before placeholders are dropped.

use std::sync::Arc;

use super::context::ExecutionContext;
use crate::cache::IdentityCache;
use crate::node::Node;
use crate::permission::PermissionAssessor;
use crate::store::{RowDecision, RowHandler};

/// Why the assembler stopped the cursor early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enough included rows for the requested page
    RequiredCount,
    /// Permission check count or time budget spent
    PermissionBudget,
    /// Caller deadline passed
    Deadline,
}

/// Output of one assembly run
#[derive(Debug, Clone)]
pub struct AssembledRows {
    /// Visible rows, in cursor order
    pub nodes: Vec<Arc<Node>>,
    /// Included rows accumulated, skipped ones counted
    pub number_found: usize,
    /// Set when the cursor was stopped before it ran out
    pub stopped: Option<StopReason>,
    /// Rows delivered by the cursor
    pub rows_scanned: u64,
    /// Rows assessed for permission
    pub permission_checks: u64,
}

impl AssembledRows {
    pub fn stopped_early(&self) -> bool {
        self.stopped.is_some()
    }
}

pub struct ResultAssembler<'a> {
    assessor: PermissionAssessor,
    identity: &'a IdentityCache,
    context: &'a ExecutionContext,
    max_items: Option<usize>,
    skip_count: usize,
    required_count: Option<usize>,
    /// `None` marks an included row before the skip offset
    accumulated: Vec<Option<Arc<Node>>>,
    stopped: Option<StopReason>,
    rows_scanned: u64,
}

impl<'a> ResultAssembler<'a> {
    pub fn new(
        assessor: PermissionAssessor,
        identity: &'a IdentityCache,
        context: &'a ExecutionContext,
        max_items: Option<usize>,
        skip_count: usize,
    ) -> Self {
        let required_count =
            max_items.map(|max| max.saturating_add(skip_count).saturating_add(1));
        Self {
            assessor,
            identity,
            context,
            max_items,
            skip_count,
            required_count,
            accumulated: Vec::new(),
            stopped: None,
            rows_scanned: 0,
        }
    }

    /// Included rows needed before the cursor is stopped
    pub fn required_count(&self) -> Option<usize> {
        self.required_count
    }

    pub fn finish(self) -> AssembledRows {
        let number_found = self.accumulated.len();
        let mut nodes: Vec<Arc<Node>> = self.accumulated.into_iter().flatten().collect();
        if let Some(max) = self.max_items {
            nodes.truncate(max);
        }
        AssembledRows {
            nodes,
            number_found,
            stopped: self.stopped,
            rows_scanned: self.rows_scanned,
            permission_checks: self.assessor.state().checks(),
        }
    }

    fn stop(&mut self, reason: StopReason) -> RowDecision {
        self.stopped = Some(reason);
        RowDecision::Stop
    }
}

impl RowHandler for ResultAssembler<'_> {
    fn handle_row(&mut self, node: Node) -> RowDecision {
        self.rows_scanned += 1;

        if let Some(required) = self.required_count {
            if self.accumulated.len() >= required {
                return self.stop(StopReason::RequiredCount);
            }
        }

        let node = self.identity.set_value(node);
        let past_skip = self.accumulated.len() >= self.skip_count;

        if self.assessor.is_included(&node) {
            self.accumulated.push(past_skip.then_some(node));
        }

        if self.assessor.should_quit_checks() {
            return self.stop(StopReason::PermissionBudget);
        }
        if self.context.deadline_reached() {
            return self.stop(StopReason::Deadline);
        }
        RowDecision::Continue
    }
}
