//! Query executor subsystem
//!
//! The executor validates a query, resolves its store, and runs one of
//! three paths:
//!
//! - **Accelerated**: rows are permission-filtered while streaming and the
//!   cursor is stopped once the page is full or the budget is spent
//! - **Standard**: every match is materialized and deduplicated; permission
//!   filtering is left to the consumer
//! - **Cache clear**: administrative; empties the shared caches
//!
//! Each execution carries its own [`ExecutionContext`]; the identity and
//! properties caches are the only state shared between executions.

mod assembler;
mod context;
mod errors;
mod executor;

pub use assembler::{AssembledRows, ResultAssembler, StopReason};
pub use context::ExecutionContext;
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::{Collaborators, QueryExecutor};
