//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, `Relaxed` ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of the query engine
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Queries that produced results
    queries_executed: AtomicU64,
    /// Queries rejected during validation
    queries_rejected: AtomicU64,
    /// Executions on the accelerated path
    accelerated_executions: AtomicU64,
    /// Executions on the standard path
    standard_executions: AtomicU64,
    /// Administrative cache clears
    cache_clears: AtomicU64,
    /// Rows delivered by the backing store
    rows_scanned: AtomicU64,
    /// Rows assessed for permission
    permission_checks: AtomicU64,
    /// Executions truncated by the permission budget or a deadline
    budget_exhaustions: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_accelerated(&self) {
        self.accelerated_executions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_standard(&self) {
        self.standard_executions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_clears(&self) {
        self.cache_clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_scanned(&self, rows: u64) {
        self.rows_scanned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_permission_checks(&self, checks: u64) {
        self.permission_checks.fetch_add(checks, Ordering::Relaxed);
    }

    pub fn increment_budget_exhaustions(&self) {
        self.budget_exhaustions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            accelerated_executions: self.accelerated_executions.load(Ordering::Relaxed),
            standard_executions: self.standard_executions.load(Ordering::Relaxed),
            cache_clears: self.cache_clears.load(Ordering::Relaxed),
            rows_scanned: self.rows_scanned.load(Ordering::Relaxed),
            permission_checks: self.permission_checks.load(Ordering::Relaxed),
            budget_exhaustions: self.budget_exhaustions.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub accelerated_executions: u64,
    pub standard_executions: u64,
    pub cache_clears: u64,
    pub rows_scanned: u64,
    pub permission_checks: u64,
    pub budget_exhaustions: u64,
}
