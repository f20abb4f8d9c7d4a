//! CLI command implementations
//!
//! Requests are JSON objects tagged by `op`:
//! - `query` (default when `op` is absent): run a query
//! - `clear_caches`: administrative cache clear
//! - `metrics`: executor counters and cache statistics

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::executor::{Collaborators, QueryExecutor};
use crate::node::{QName, StoreRef};
use crate::observability::{init_logging, log_event_with_fields, Event};
use crate::query::{Query, QueryOptions};
use crate::resultset::{QueryEngineResults, ResultRow, ResultSet};
use crate::security::SecurityContext;
use crate::store::{Fixture, MemoryStore};

use super::args::Command;
use super::errors::CliResult;
use super::io::{error_response, ok_response, read_request, read_requests, write_json};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: Query,
    #[serde(default)]
    pub options: QueryOptions,
    #[serde(default)]
    pub security: SecurityContext,
    /// Apply the downstream permission filter to every result set
    #[serde(default)]
    pub post_filter: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Query(QueryRequest),
    ClearCaches {
        #[serde(default = "StoreRef::spaces_store")]
        store: StoreRef,
    },
    Metrics,
}

impl Request {
    /// Parse a request object; `op` defaults to `query`
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(obj) = value.as_object_mut() {
            if !obj.contains_key("op") {
                obj.insert("op".to_string(), json!("query"));
            }
        }
        serde_json::from_value(value)
    }
}

/// Executor over a fixture-backed store
pub struct Engine {
    executor: QueryExecutor,
    store: Arc<MemoryStore>,
}

impl Engine {
    /// Load configuration and dataset, installing the log subscriber
    pub fn open(config_path: &Path, dataset_path: &Path) -> CliResult<Self> {
        let config = EngineConfig::load(config_path)?;
        init_logging(&config.log_level);
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", &config_path.display().to_string())],
        );

        let fixture = Fixture::load(dataset_path)?;
        let nodes = fixture.nodes.len();
        let store = Arc::new(fixture.into_store()?);
        log_event_with_fields(
            Event::FixtureLoaded,
            &[
                ("path", &dataset_path.display().to_string()),
                ("nodes", &nodes.to_string()),
            ],
        );

        Ok(Self::new(config, store))
    }

    pub fn new(config: EngineConfig, store: Arc<MemoryStore>) -> Self {
        let executor = QueryExecutor::new(config, Collaborators::from_store(Arc::clone(&store)));
        Self { executor, store }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Answer one request. Failures become error responses.
    pub fn handle(&self, request: Value) -> Value {
        let request = match Request::from_value(request) {
            Ok(request) => request,
            Err(e) => return error_response("ACLQ_CLI_REQUEST_ERROR", &e.to_string()),
        };

        match request {
            Request::Query(request) => self.handle_query(request),
            Request::ClearCaches { store } => self.handle_clear_caches(store),
            Request::Metrics => ok_response(self.metrics()),
        }
    }

    fn handle_query(&self, request: QueryRequest) -> Value {
        let results =
            match self
                .executor
                .execute_query(&request.query, &request.options, &request.security)
            {
                Ok(results) => results,
                Err(e) => return error_response(e.code().code(), e.message()),
            };

        let results = if request.post_filter {
            let filter = self.executor.post_filter();
            let mut filtered = QueryEngineResults::new();
            for (group, set) in results {
                let set = filter.filter(set, &request.security, &request.options);
                filtered.insert(group, Box::new(set));
            }
            filtered
        } else {
            results
        };

        ok_response(render_results(results))
    }

    fn handle_clear_caches(&self, store: StoreRef) -> Value {
        let query = Query::select("node", QName::new("sys", "base"));
        let options = QueryOptions::for_store(store).administrative_cache_clear();
        match self
            .executor
            .execute_query(&query, &options, &SecurityContext::default())
        {
            Ok(_) => ok_response(json!({ "cleared": true })),
            Err(e) => error_response(e.code().code(), e.message()),
        }
    }

    fn metrics(&self) -> Value {
        let identity = self.executor.identity_cache().stats();
        let properties = self.executor.properties_cache().stats();
        json!({
            "executor": self.executor.metrics().snapshot(),
            "identity_cache": {
                "entries": self.executor.identity_cache().len(),
                "hits": identity.hits,
                "misses": identity.misses,
            },
            "properties_cache": {
                "entries": self.executor.properties_cache().len(),
                "hits": properties.hits,
                "misses": properties.misses,
            },
            "store": {
                "rows_delivered": self.store.rows_delivered(),
                "property_reads": self.store.property_reads(),
            },
        })
    }
}

fn render_results(results: QueryEngineResults) -> Value {
    let sets: Vec<Value> = results
        .into_iter()
        .map(|(group, set)| {
            json!({
                "selectors": group,
                "length": set.length(),
                "number_found": set.number_found(),
                "has_more": set.has_more(),
                "metadata": set.metadata(),
                "rows": set.rows().iter().map(render_row).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "results": sets })
}

fn render_row(row: &ResultRow) -> Value {
    json!({
        "node_ref": row.node_ref().to_string(),
        "type": row.node().type_name,
        "score": row.score(),
        "values": row.values(),
        "primary_parent": row
            .primary_parent()
            .and_then(|assoc| assoc.parent)
            .map(|parent| parent.to_string()),
    })
}

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { config, dataset } => query(&config, &dataset),
        Command::Serve { config, dataset } => serve(&config, &dataset),
    }
}

/// Answer a single stdin request
pub fn query(config_path: &Path, dataset_path: &Path) -> CliResult<()> {
    let engine = Engine::open(config_path, dataset_path)?;
    let request = read_request()?;
    write_json(&engine.handle(request))
}

/// Answer stdin requests until EOF; caches persist between requests
pub fn serve(config_path: &Path, dataset_path: &Path) -> CliResult<()> {
    let engine = Engine::open(config_path, dataset_path)?;
    for request in read_requests() {
        let response = match request {
            Ok(request) => engine.handle(request),
            Err(e) => error_response(e.code(), &e.to_string()),
        };
        write_json(&response)?;
    }
    Ok(())
}
