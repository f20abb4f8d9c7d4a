//! Structured query model
//!
//! Queries arrive already parsed. This module only carries their shape:
//! a source (selectors and joins), an optional constraint tree, and the
//! per-call options. Preparing a query turns the constraint tree into a
//! [`PreparedPredicate`] the backing store can evaluate.

mod constraint;
mod model;
mod options;
mod prepared;

pub use constraint::{
    AspectFilter, Conjunction, Constraint, Disjunction, Negation, PreparedPredicate,
    PropertyEquals, QueryBuilderComponent, TypeFilter,
};
pub use model::{Join, JoinCondition, JoinKind, Query, Selector, SelectorGroup, SelectorKind, Source};
pub use options::{ExecutionMode, QueryOptions};
pub use prepared::{PreparedQuery, TypeId};
