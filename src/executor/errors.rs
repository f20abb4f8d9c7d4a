//! Executor error types
//!
//! Error codes:
//! - ACLQ_NO_SELECTORS (ERROR)
//! - ACLQ_ADVANCED_JOIN (ERROR)
//! - ACLQ_MULTI_STORE (ERROR)
//! - ACLQ_UNKNOWN_STORE (ERROR)
//! - ACLQ_STORE_FAILURE (ERROR)
//!
//! Budget exhaustion is not an error; it shows up in result set metadata.

use std::fmt;

use crate::observability::Severity;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Query has no selector group
    AclqNoSelectors,
    /// Query has more than one selector group
    AclqAdvancedJoin,
    /// Options do not name exactly one store
    AclqMultiStore,
    /// Store reference does not resolve
    AclqUnknownStore,
    /// Backing store failed while delivering rows
    AclqStoreFailure,
}

impl ExecutorErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::AclqNoSelectors => "ACLQ_NO_SELECTORS",
            ExecutorErrorCode::AclqAdvancedJoin => "ACLQ_ADVANCED_JOIN",
            ExecutorErrorCode::AclqMultiStore => "ACLQ_MULTI_STORE",
            ExecutorErrorCode::AclqUnknownStore => "ACLQ_UNKNOWN_STORE",
            ExecutorErrorCode::AclqStoreFailure => "ACLQ_STORE_FAILURE",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether the query was rejected before any row was touched
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ExecutorErrorCode::AclqStoreFailure)
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    source: Option<StoreError>,
}

impl ExecutorError {
    fn new(code: ExecutorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn no_selectors() -> Self {
        Self::new(ExecutorErrorCode::AclqNoSelectors, "No selectors")
    }

    pub fn advanced_join(groups: usize) -> Self {
        Self::new(
            ExecutorErrorCode::AclqAdvancedJoin,
            format!("Advanced join is not supported ({} selector groups)", groups),
        )
    }

    pub fn multi_store(stores: usize) -> Self {
        Self::new(
            ExecutorErrorCode::AclqMultiStore,
            format!("Multi-store queries are not supported ({} stores)", stores),
        )
    }

    pub fn unknown_store(store: impl fmt::Display) -> Self {
        Self::new(
            ExecutorErrorCode::AclqUnknownStore,
            format!("Unknown store: {}", store),
        )
    }

    pub fn store_failure(source: StoreError) -> Self {
        Self {
            code: ExecutorErrorCode::AclqStoreFailure,
            message: "Row source failed".to_string(),
            source: Some(source),
        }
    }

    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
