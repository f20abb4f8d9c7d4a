//! CLI argument definitions using clap
//!
//! Commands:
//! - aclquery query --config <path> --dataset <path>
//! - aclquery serve --config <path> --dataset <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Permission-filtered query execution over a node store
#[derive(Parser, Debug)]
#[command(name = "aclquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single request from stdin and exit
    Query {
        /// Path to engine configuration file
        #[arg(long, default_value = "./aclquery.json")]
        config: PathBuf,

        /// Path to the node store fixture
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Execute one request per stdin line until EOF, sharing caches
    Serve {
        /// Path to engine configuration file
        #[arg(long, default_value = "./aclquery.json")]
        config: PathBuf,

        /// Path to the node store fixture
        #[arg(long)]
        dataset: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
