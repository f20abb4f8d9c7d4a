//! Observable events
//!
//! Events are explicit and typed. Each carries the severity it is logged
//! at by default.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Engine configuration loaded
    ConfigLoaded,
    /// Store fixture loaded
    FixtureLoaded,

    // Query execution
    /// Query rejected during validation or store resolution
    QueryRejected,

    // Permission evaluation
    /// Check count or time budget exhausted; result truncated
    PermissionBudgetExhausted,
    /// Caller deadline reached; result truncated
    QueryDeadlineReached,
    /// Downstream post-filter cut off by its budget
    PostFilterCutoff,

    // Administration
    /// Identity and properties caches cleared
    CachesCleared,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::FixtureLoaded => "FIXTURE_LOADED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::PermissionBudgetExhausted => "PERMISSION_BUDGET_EXHAUSTED",
            Event::QueryDeadlineReached => "QUERY_DEADLINE_REACHED",
            Event::PostFilterCutoff => "POST_FILTER_CUTOFF",
            Event::CachesCleared => "NODE_CACHES_CLEARED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryRejected
            | Event::PermissionBudgetExhausted
            | Event::QueryDeadlineReached
            | Event::PostFilterCutoff
            | Event::CachesCleared => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::FixtureLoaded,
            Event::QueryRejected,
            Event::PermissionBudgetExhausted,
            Event::QueryDeadlineReached,
            Event::PostFilterCutoff,
            Event::CachesCleared,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_degraded_results_are_warnings() {
        assert_eq!(Event::PermissionBudgetExhausted.severity(), Severity::Warn);
        assert_eq!(Event::CachesCleared.severity(), Severity::Warn);
        assert_eq!(Event::ConfigLoaded.severity(), Severity::Info);
    }
}
