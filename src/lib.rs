//! aclquery - permission-filtered query result assembly
//!
//! Executes typed node queries against a content store and assembles
//! result sets containing only rows the caller may read, within a
//! configurable permission check budget.

pub mod cache;
pub mod cli;
pub mod config;
pub mod executor;
pub mod node;
pub mod observability;
pub mod permission;
pub mod query;
pub mod resultset;
pub mod security;
pub mod store;
