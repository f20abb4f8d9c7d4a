//! Permission evaluation
//!
//! - [`PermissionAssessor`]: per-row decisions while a query streams,
//!   bounded by a [`CheckBudget`]
//! - [`AfterInvocationFilter`]: the same decisions applied to a finished
//!   result set
//!
//! A row is visible when the caller holds the administrator role, can read
//! the row's ACL, or owns the row. Anonymous callers see nothing. Denied
//! readers take precedence over readers.

mod assessor;
mod budget;
mod post_filter;

pub use assessor::{AssessmentState, PermissionAssessor};
pub use budget::CheckBudget;
pub use post_filter::AfterInvocationFilter;
