//! Permission check budget

use std::time::Duration;

use crate::config::EngineConfig;
use crate::query::QueryOptions;

/// Count and wall-clock limits on permission evaluation for one execution.
///
/// Per-call overrides from [`QueryOptions`] replace the server defaults;
/// absent both, a limit is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckBudget {
    max_checks: Option<u64>,
    max_time: Option<Duration>,
}

impl CheckBudget {
    pub fn new(max_checks: Option<u64>, max_time: Option<Duration>) -> Self {
        Self {
            max_checks,
            max_time,
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Server defaults from the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.max_permission_checks,
            config.max_permission_check_time_ms.map(Duration::from_millis),
        )
    }

    /// Apply the per-call overrides carried by the options
    pub fn with_overrides(self, options: &QueryOptions) -> Self {
        Self {
            max_checks: options.permission_check_override().or(self.max_checks),
            max_time: options
                .permission_time_override_ms()
                .map(Duration::from_millis)
                .or(self.max_time),
        }
    }

    /// Configured check count, as supplied
    pub fn max_checks(&self) -> Option<u64> {
        self.max_checks
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    /// Check count at which the streaming assessor quits.
    ///
    /// One past the configured count: the quit signal is read after a row
    /// has been assessed, so the row that crosses the limit is still
    /// assessed.
    pub fn check_threshold(&self) -> Option<u64> {
        self.max_checks.map(|n| n.saturating_add(1))
    }

    /// True once `checks` reached the threshold or `elapsed` reached the
    /// time limit
    pub fn is_exhausted(&self, checks: u64, elapsed: Duration) -> bool {
        let count_spent = self.check_threshold().is_some_and(|max| checks >= max);
        let time_spent = self.max_time.is_some_and(|max| elapsed >= max);
        count_spent || time_spent
    }
}
