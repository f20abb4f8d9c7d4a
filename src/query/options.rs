//! Per-call query options

use serde::{Deserialize, Serialize};

use crate::node::StoreRef;

/// Which execution path a query takes.
///
/// `CacheClear` is an administrative escape hatch. It cannot be
/// deserialized from a request and is only reachable through
/// [`QueryOptions::administrative_cache_clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Permission-filter rows while streaming; stop once enough are visible
    Accelerated,
    /// Materialize every match; permission filtering happens downstream
    Standard,
    #[serde(skip)]
    CacheClear,
}

/// Read-only parameters of one query execution.
///
/// Numeric limits use a negative sentinel for "not set", so requests can
/// carry them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Target stores; exactly one is supported
    #[serde(default)]
    pub stores: Vec<StoreRef>,

    /// Maximum visible items (negative = unlimited)
    #[serde(default = "unset")]
    pub max_items: i64,

    /// Visible items to skip
    #[serde(default)]
    pub skip_count: usize,

    /// Only nodes written in this transaction or later are eligible
    #[serde(default)]
    pub since_txn: Option<u64>,

    #[serde(default)]
    pub locales: Vec<String>,

    /// Permission check count override (negative = server default)
    #[serde(default = "unset")]
    pub max_permission_checks: i64,

    /// Permission check time override in ms (negative = server default)
    #[serde(default = "unset")]
    pub max_permission_check_time_ms: i64,

    /// Execution path; `None` uses the server default
    #[serde(default)]
    pub execution_mode: Option<ExecutionMode>,
}

fn unset() -> i64 {
    -1
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stores: Vec::new(),
            max_items: unset(),
            skip_count: 0,
            since_txn: None,
            locales: Vec::new(),
            max_permission_checks: unset(),
            max_permission_check_time_ms: unset(),
            execution_mode: None,
        }
    }
}

impl QueryOptions {
    /// Options targeting a single store
    pub fn for_store(store: StoreRef) -> Self {
        Self {
            stores: vec![store],
            ..Default::default()
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = i64::try_from(max_items).unwrap_or(i64::MAX);
        self
    }

    pub fn with_skip_count(mut self, skip_count: usize) -> Self {
        self.skip_count = skip_count;
        self
    }

    pub fn with_since_txn(mut self, txn: u64) -> Self {
        self.since_txn = Some(txn);
        self
    }

    pub fn with_max_permission_checks(mut self, checks: u64) -> Self {
        self.max_permission_checks = i64::try_from(checks).unwrap_or(i64::MAX);
        self
    }

    pub fn with_max_permission_check_time_ms(mut self, millis: u64) -> Self {
        self.max_permission_check_time_ms = i64::try_from(millis).unwrap_or(i64::MAX);
        self
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = Some(mode);
        self
    }

    /// Turn these options into an administrative cache-clear request
    pub fn administrative_cache_clear(mut self) -> Self {
        self.execution_mode = Some(ExecutionMode::CacheClear);
        self
    }

    /// Item limit, if one was requested
    pub fn max_items(&self) -> Option<usize> {
        usize::try_from(self.max_items).ok()
    }

    /// Transaction floor; zero admits every transaction
    pub fn since_txn_floor(&self) -> u64 {
        self.since_txn.unwrap_or(0)
    }

    /// Per-call check count override, if set
    pub fn permission_check_override(&self) -> Option<u64> {
        u64::try_from(self.max_permission_checks).ok()
    }

    /// Per-call time override in ms, if set
    pub fn permission_time_override_ms(&self) -> Option<u64> {
        u64::try_from(self.max_permission_check_time_ms).ok()
    }
}
