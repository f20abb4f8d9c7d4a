//! Query executor
//!
//! Execution flow (strict order):
//! 1. Validate: exactly one selector group, exactly one store
//! 2. Resolve the store and its tenant-qualified reference
//! 3. Resolve the deleted type (absent is not an error)
//! 4. Apply the since-transaction floor
//! 5. Prepare the query
//! 6. Run the chosen path: cache clear, accelerated or standard
//! 7. Return the result set keyed by its selector group

use std::collections::HashSet;
use std::sync::Arc;

use super::assembler::{ResultAssembler, StopReason};
use super::context::ExecutionContext;
use super::errors::{ExecutorError, ExecutorResult};
use crate::cache::{CachedNodeService, IdentityCache, PropertiesCache};
use crate::config::EngineConfig;
use crate::node::{names, Node, StoreRef};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};
use crate::permission::{AfterInvocationFilter, CheckBudget, PermissionAssessor};
use crate::query::{ExecutionMode, PreparedQuery, Query, QueryOptions, SelectorGroup};
use crate::resultset::{
    FilteringResultSet, LimitBy, NodeResultSet, PagingResultSet, PermissionEvaluationMode,
    QueryEngineResults, ResultSet, ResultSetMetaData,
};
use crate::security::{PermissionLookup, SecurityContext};
use crate::store::{NodeService, RowDecision, RowSource, StoreResolver};

/// Collaborators the executor reads through
#[derive(Clone)]
pub struct Collaborators {
    pub rows: Arc<dyn RowSource>,
    pub resolver: Arc<dyn StoreResolver>,
    pub permissions: Arc<dyn PermissionLookup>,
    pub nodes: Arc<dyn NodeService>,
}

impl Collaborators {
    /// Every collaborator served by one store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: RowSource + StoreResolver + PermissionLookup + NodeService + 'static,
    {
        Self {
            rows: store.clone(),
            resolver: store.clone(),
            permissions: store.clone(),
            nodes: store,
        }
    }
}

pub struct QueryExecutor {
    config: EngineConfig,
    collaborators: Collaborators,
    /// Node service reading through the shared properties cache
    nodes: Arc<dyn NodeService>,
    identity: Arc<IdentityCache>,
    properties: Arc<PropertiesCache>,
    metrics: Arc<MetricsRegistry>,
}

impl QueryExecutor {
    /// Executor with its own caches and metrics
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Self {
        Self::with_shared_caches(
            config,
            collaborators,
            Arc::new(IdentityCache::new()),
            Arc::new(PropertiesCache::new()),
        )
    }

    /// Executor sharing caches with other executors
    pub fn with_shared_caches(
        config: EngineConfig,
        collaborators: Collaborators,
        identity: Arc<IdentityCache>,
        properties: Arc<PropertiesCache>,
    ) -> Self {
        let nodes: Arc<dyn NodeService> = Arc::new(CachedNodeService::new(
            Arc::clone(&collaborators.nodes),
            Arc::clone(&properties),
        ));
        Self {
            config,
            collaborators,
            nodes,
            identity,
            properties,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn identity_cache(&self) -> &Arc<IdentityCache> {
        &self.identity
    }

    pub fn properties_cache(&self) -> &Arc<PropertiesCache> {
        &self.properties
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Downstream filter for standard-path results, configured with the
    /// server's budget and unfiltered types
    pub fn post_filter(&self) -> AfterInvocationFilter {
        AfterInvocationFilter::new(
            Arc::clone(&self.collaborators.permissions),
            Arc::clone(&self.identity),
        )
        .with_budget(CheckBudget::from_config(&self.config))
        .with_unfiltered_types(self.config.unfiltered_type_names().unwrap_or_default())
    }

    /// Execute with a fresh execution context
    pub fn execute_query(
        &self,
        query: &Query,
        options: &QueryOptions,
        security: &SecurityContext,
    ) -> ExecutorResult<QueryEngineResults> {
        self.execute_query_in(query, options, security, &mut ExecutionContext::new())
    }

    /// Execute within the caller's context (deadline, timings)
    pub fn execute_query_in(
        &self,
        query: &Query,
        options: &QueryOptions,
        security: &SecurityContext,
        ctx: &mut ExecutionContext,
    ) -> ExecutorResult<QueryEngineResults> {
        let query_id = ctx.query_id().to_string();

        let (group, store) = match Self::validate(query, options) {
            Ok(valid) => valid,
            Err(err) => return Err(self.reject(&query_id, err)),
        };

        let store_id = match self.collaborators.resolver.resolve_store(store) {
            Some(id) => id,
            None => return Err(self.reject(&query_id, ExecutorError::unknown_store(store))),
        };

        let mode = options
            .execution_mode
            .unwrap_or(self.config.default_execution_mode);
        let scope = ObservationScope::with_fields(
            "QUERY",
            &[("query_id", &query_id), ("mode", mode_name(mode))],
        );

        let prepared = ctx.time_phase("prepare", |_| PreparedQuery {
            store_id,
            store: self.collaborators.resolver.tenant_store(store),
            since_txn: options.since_txn_floor(),
            deleted_type: self.collaborators.resolver.resolve_type(&names::deleted_type()),
            predicate: query.predicate(),
        });

        let result = match mode {
            ExecutionMode::CacheClear => Ok(self.clear_caches(&query_id)),
            ExecutionMode::Accelerated => self.execute_accelerated(&prepared, options, security, ctx),
            ExecutionMode::Standard => self.execute_standard(&prepared, options, ctx),
        };

        match result {
            Ok(set) => {
                self.metrics.increment_queries_executed();
                scope.complete_with_fields(&[
                    ("rows", &set.length().to_string()),
                    ("number_found", &set.number_found().to_string()),
                    ("limit_by", limit_by_name(set.metadata().limit_by)),
                    ("elapsed_ms", &ctx.elapsed_ms().to_string()),
                ]);
                Ok(QueryEngineResults::single(group, set))
            }
            Err(err) => {
                scope.fail(&err.to_string());
                Err(err)
            }
        }
    }

    fn validate<'q>(
        query: &Query,
        options: &'q QueryOptions,
    ) -> ExecutorResult<(SelectorGroup, &'q StoreRef)> {
        let mut groups = query.selector_groups();
        if groups.is_empty() {
            return Err(ExecutorError::no_selectors());
        }
        if groups.len() > 1 {
            return Err(ExecutorError::advanced_join(groups.len()));
        }
        let store = match options.stores.as_slice() {
            [store] => store,
            stores => return Err(ExecutorError::multi_store(stores.len())),
        };
        Ok((groups.remove(0), store))
    }

    fn reject(&self, query_id: &str, err: ExecutorError) -> ExecutorError {
        self.metrics.increment_queries_rejected();
        log_event_with_fields(
            Event::QueryRejected,
            &[("query_id", query_id), ("code", err.code().code())],
        );
        err
    }

    fn clear_caches(&self, query_id: &str) -> Box<dyn ResultSet> {
        self.identity.invalidate_all();
        self.properties.invalidate_all();
        self.metrics.increment_cache_clears();
        log_event_with_fields(Event::CachesCleared, &[("query_id", query_id)]);

        let metadata = ResultSetMetaData::unlimited().with_limit_by(LimitBy::FinalSize);
        Box::new(NodeResultSet::empty(Arc::clone(&self.nodes), metadata))
    }

    fn execute_accelerated(
        &self,
        prepared: &PreparedQuery,
        options: &QueryOptions,
        security: &SecurityContext,
        ctx: &mut ExecutionContext,
    ) -> ExecutorResult<Box<dyn ResultSet>> {
        self.metrics.increment_accelerated();
        let budget = CheckBudget::from_config(&self.config).with_overrides(options);
        let assessor = PermissionAssessor::new(
            security.clone(),
            Arc::clone(&self.collaborators.permissions),
            Arc::clone(&self.nodes),
            Arc::clone(&self.identity),
            budget,
        );

        let assembled = ctx.time_phase("assemble", |ctx| {
            let mut assembler = ResultAssembler::new(
                assessor,
                &self.identity,
                ctx,
                options.max_items(),
                options.skip_count,
            );
            self.collaborators
                .rows
                .select_nodes(prepared, &mut assembler)
                .map(|()| assembler.finish())
        });
        let assembled = assembled.map_err(ExecutorError::store_failure)?;

        self.metrics.add_rows_scanned(assembled.rows_scanned);
        self.metrics.add_permission_checks(assembled.permission_checks);
        match assembled.stopped {
            Some(StopReason::PermissionBudget) => {
                self.metrics.increment_budget_exhaustions();
                log_event_with_fields(
                    Event::PermissionBudgetExhausted,
                    &[
                        ("query_id", &ctx.query_id().to_string()),
                        ("checks", &assembled.permission_checks.to_string()),
                    ],
                );
            }
            Some(StopReason::Deadline) => {
                self.metrics.increment_budget_exhaustions();
                log_event_with_fields(
                    Event::QueryDeadlineReached,
                    &[
                        ("query_id", &ctx.query_id().to_string()),
                        ("checks", &assembled.permission_checks.to_string()),
                    ],
                );
            }
            Some(StopReason::RequiredCount) | None => {}
        }

        let limit_by = if assembled.stopped_early() {
            LimitBy::NumberOfPermissionEvaluations
        } else {
            LimitBy::Unlimited
        };
        let metadata = ResultSetMetaData::new(
            limit_by,
            PermissionEvaluationMode::Eager,
            options.max_items(),
            options.skip_count,
        );

        let mask = vec![true; assembled.nodes.len()];
        let visible = NodeResultSet::new(assembled.nodes, Arc::clone(&self.nodes), metadata.clone())
            .with_number_found(assembled.number_found);
        Ok(Box::new(FilteringResultSet::new(
            Box::new(visible),
            &mask,
            metadata,
        )))
    }

    fn execute_standard(
        &self,
        prepared: &PreparedQuery,
        options: &QueryOptions,
        ctx: &mut ExecutionContext,
    ) -> ExecutorResult<Box<dyn ResultSet>> {
        self.metrics.increment_standard();

        let rows = ctx.time_phase("scan", |_| {
            let mut seen = HashSet::new();
            let mut rows: Vec<Arc<Node>> = Vec::new();
            let mut scanned = 0u64;
            let mut collect = |node: Node| {
                scanned += 1;
                if seen.insert(node.id) {
                    rows.push(self.identity.set_value(node));
                }
                RowDecision::Continue
            };
            let status = self.collaborators.rows.select_nodes(prepared, &mut collect);
            status.map(|()| (rows, scanned))
        });
        let (rows, scanned) = rows.map_err(ExecutorError::store_failure)?;
        self.metrics.add_rows_scanned(scanned);

        let total = rows.len();
        let window_end = options
            .max_items()
            .map(|max| max.saturating_add(options.skip_count));
        let limit_by = match window_end {
            Some(end) if total > end => LimitBy::FinalSize,
            _ => LimitBy::Unlimited,
        };
        let metadata = ResultSetMetaData::new(
            limit_by,
            PermissionEvaluationMode::None,
            options.max_items(),
            options.skip_count,
        );

        let all = NodeResultSet::new(rows, Arc::clone(&self.nodes), ResultSetMetaData::unlimited());
        Ok(Box::new(PagingResultSet::new(
            Box::new(all),
            options.skip_count,
            options.max_items(),
            metadata,
        )))
    }
}

fn mode_name(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::Accelerated => "accelerated",
        ExecutionMode::Standard => "standard",
        ExecutionMode::CacheClear => "cache_clear",
    }
}

fn limit_by_name(limit_by: LimitBy) -> &'static str {
    match limit_by {
        LimitBy::Unlimited => "UNLIMITED",
        LimitBy::FinalSize => "FINAL_SIZE",
        LimitBy::NumberOfPermissionEvaluations => "NUMBER_OF_PERMISSION_EVALUATIONS",
    }
}
