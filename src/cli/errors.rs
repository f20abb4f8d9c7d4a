//! CLI error types
//!
//! All CLI errors end the process with a non-zero exit code. Query
//! failures are not CLI errors; they are written as error responses.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("ACLQ_CLI_CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    #[error("ACLQ_CLI_DATASET_ERROR: {0}")]
    Dataset(#[from] StoreError),

    #[error("ACLQ_CLI_IO_ERROR: {0}")]
    Io(String),

    #[error("ACLQ_CLI_REQUEST_ERROR: {0}")]
    Request(String),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "ACLQ_CLI_CONFIG_ERROR",
            CliError::Dataset(_) => "ACLQ_CLI_DATASET_ERROR",
            CliError::Io(_) => "ACLQ_CLI_IO_ERROR",
            CliError::Request(_) => "ACLQ_CLI_REQUEST_ERROR",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Request(format!("JSON error: {}", e))
    }
}

pub type CliResult<T> = Result<T, CliError>;
