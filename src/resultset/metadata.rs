//! Paging metadata of a result set

use serde::{Deserialize, Serialize};

/// What, if anything, capped the size of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitBy {
    /// Every match was considered; the size is exact
    Unlimited,
    /// Capped by the requested item count
    FinalSize,
    /// Capped by the permission check budget or a deadline
    NumberOfPermissionEvaluations,
}

/// How permissions were applied to the rows of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionEvaluationMode {
    /// Every visible row was positively assessed
    Eager,
    /// Not evaluated; the consumer filters downstream
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSetMetaData {
    pub limit_by: LimitBy,
    pub evaluation_mode: PermissionEvaluationMode,
    /// Item limit the set was built for
    pub max_items: Option<usize>,
    pub skip_count: usize,
}

impl ResultSetMetaData {
    pub fn new(
        limit_by: LimitBy,
        evaluation_mode: PermissionEvaluationMode,
        max_items: Option<usize>,
        skip_count: usize,
    ) -> Self {
        Self {
            limit_by,
            evaluation_mode,
            max_items,
            skip_count,
        }
    }

    /// Metadata of an unfiltered, uncapped set
    pub fn unlimited() -> Self {
        Self::new(LimitBy::Unlimited, PermissionEvaluationMode::None, None, 0)
    }

    pub fn with_limit_by(mut self, limit_by: LimitBy) -> Self {
        self.limit_by = limit_by;
        self
    }

    pub fn is_exact(&self) -> bool {
        self.limit_by == LimitBy::Unlimited
    }
}
