//! CLI module for aclquery
//!
//! Provides command-line interface for:
//! - query: One-shot request execution
//! - serve: Line-delimited request loop sharing caches across requests

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{query, run, run_command, serve, Engine, QueryRequest, Request};
pub use errors::{CliError, CliResult};
pub use io::{error_response, ok_response, read_request, read_requests, write_json};
