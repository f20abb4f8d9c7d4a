//! Result Assembly Tests
//!
//! Tests for accelerated-path assembly through the public executor:
//! - Only readable rows are returned, in cursor order
//! - Paging counts visible rows, not scanned rows
//! - The cursor stops once a page plus one row is known
//! - Budget and deadline stops mark the set as capped

use std::sync::Arc;
use std::time::{Duration, Instant};

use aclquery::config::EngineConfig;
use aclquery::executor::{Collaborators, ExecutionContext, QueryExecutor};
use aclquery::node::{Node, NodeProperties, QName, StoreRef};
use aclquery::query::{Query, QueryOptions};
use aclquery::resultset::{LimitBy, PermissionEvaluationMode, ResultSet};
use aclquery::security::{AccessControlList, AclId, Authority, SecurityContext};
use aclquery::store::MemoryStore;

const OPEN: AclId = AclId(1);
const CLOSED: AclId = AclId(2);

fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_store(StoreRef::spaces_store());
    store.add_acl(AccessControlList {
        id: OPEN,
        readers: [Authority::everyone()].into_iter().collect(),
        ..Default::default()
    });
    store.add_acl(AccessControlList {
        id: CLOSED,
        ..Default::default()
    });
    store
}

/// Insert one row per pattern entry; `true` rows are readable
fn populate(store: &MemoryStore, pattern: &[bool]) -> Vec<Node> {
    pattern
        .iter()
        .map(|&open| {
            store
                .insert_node(
                    &StoreRef::spaces_store(),
                    QName::new("cm", "content"),
                    Some(if open { OPEN } else { CLOSED }),
                    NodeProperties::default(),
                    1,
                )
                .unwrap()
        })
        .collect()
}

fn executor(store: &Arc<MemoryStore>, config: EngineConfig) -> QueryExecutor {
    QueryExecutor::new(config, Collaborators::from_store(Arc::clone(store)))
}

fn query() -> Query {
    Query::select("doc", QName::new("cm", "content"))
}

fn options() -> QueryOptions {
    QueryOptions::for_store(StoreRef::spaces_store())
}

fn user() -> SecurityContext {
    SecurityContext::authenticated("carol", [])
}

fn run(executor: &QueryExecutor, options: &QueryOptions) -> Box<dyn ResultSet> {
    executor
        .execute_query(&query(), options, &user())
        .unwrap()
        .into_only()
        .unwrap()
}

fn ids(set: &dyn ResultSet) -> Vec<u64> {
    set.nodes().iter().map(|n| n.id.0).collect()
}

fn expected(nodes: &[Node], picks: &[usize]) -> Vec<u64> {
    picks.iter().map(|&i| nodes[i].id.0).collect()
}

// =============================================================================
// Visibility Tests
// =============================================================================

/// Unreadable rows never appear; readable ones keep cursor order.
#[test]
fn test_only_readable_rows_in_cursor_order() {
    let store = store();
    let nodes = populate(&store, &[false, true, true, false, true]);

    let set = run(&executor(&store, EngineConfig::default()), &options());

    assert_eq!(ids(set.as_ref()), expected(&nodes, &[1, 2, 4]));
    assert_eq!(set.number_found(), 3);
    assert_eq!(set.metadata().limit_by, LimitBy::Unlimited);
    assert_eq!(set.metadata().evaluation_mode, PermissionEvaluationMode::Eager);
    assert_eq!(store.rows_delivered(), 5);
}

/// A caller with no readable rows gets an empty, exact set.
#[test]
fn test_nothing_readable() {
    let store = store();
    populate(&store, &[false, false, false]);

    let set = run(&executor(&store, EngineConfig::default()), &options());

    assert!(set.is_empty());
    assert_eq!(set.number_found(), 0);
    assert!(set.metadata().is_exact());
}

// =============================================================================
// Paging Tests
// =============================================================================

/// Skip applies to visible rows, so hidden rows do not shift the page.
#[test]
fn test_skip_counts_visible_rows() {
    let store = store();
    let nodes = populate(&store, &[false, true, false, true, true, false, true]);

    let set = run(
        &executor(&store, EngineConfig::default()),
        &options().with_skip_count(2).with_max_items(5),
    );

    assert_eq!(ids(set.as_ref()), expected(&nodes, &[4, 6]));
    assert_eq!(set.number_found(), 4);
    assert_eq!(set.metadata().limit_by, LimitBy::Unlimited);
}

/// Skipping past every visible row yields an empty page.
#[test]
fn test_skip_beyond_visible_rows() {
    let store = store();
    populate(&store, &[true, true]);

    let set = run(
        &executor(&store, EngineConfig::default()),
        &options().with_skip_count(5).with_max_items(3),
    );

    assert!(set.is_empty());
    assert_eq!(set.number_found(), 2);
}

/// The cursor stops after `max + skip + 1` included rows.
#[test]
fn test_cursor_stops_after_page_plus_one() {
    let store = store();
    let nodes = populate(&store, &[true; 10]);

    let set = run(
        &executor(&store, EngineConfig::default()),
        &options().with_skip_count(1).with_max_items(3),
    );

    assert_eq!(ids(set.as_ref()), expected(&nodes, &[1, 2, 3]));
    assert_eq!(set.number_found(), 5);
    assert_eq!(store.rows_delivered(), 6);
    assert_eq!(
        set.metadata().limit_by,
        LimitBy::NumberOfPermissionEvaluations
    );
}

/// A zero item limit still assesses one row to learn whether more exist.
#[test]
fn test_zero_max_items() {
    let store = store();
    populate(&store, &[true, true, true]);

    let set = run(
        &executor(&store, EngineConfig::default()),
        &options().with_max_items(0),
    );

    assert!(set.is_empty());
    assert_eq!(set.number_found(), 1);
    assert_eq!(store.rows_delivered(), 2);
}

// =============================================================================
// Budget Tests
// =============================================================================

/// The server's check budget applies when the call sets none.
#[test]
fn test_server_budget_caps_checks() {
    let store = store();
    populate(&store, &[false; 8]);
    let config = EngineConfig {
        max_permission_checks: Some(2),
        ..Default::default()
    };
    let executor = executor(&store, config);

    let set = run(&executor, &options());

    assert!(set.is_empty());
    assert_eq!(
        set.metadata().limit_by,
        LimitBy::NumberOfPermissionEvaluations
    );
    assert_eq!(executor.metrics().snapshot().permission_checks, 3);
}

/// A call override replaces the server budget.
#[test]
fn test_call_override_replaces_server_budget() {
    let store = store();
    populate(&store, &[false; 8]);
    let config = EngineConfig {
        max_permission_checks: Some(1),
        ..Default::default()
    };

    let set = run(
        &executor(&store, config),
        &options().with_max_permission_checks(100),
    );

    assert_eq!(set.metadata().limit_by, LimitBy::Unlimited);
    assert_eq!(store.rows_delivered(), 8);
}

/// A zero time budget stops the cursor after the first row.
#[test]
fn test_zero_time_budget() {
    let store = store();
    populate(&store, &[true; 4]);

    let set = run(
        &executor(&store, EngineConfig::default()),
        &options().with_max_permission_check_time_ms(0),
    );

    assert_eq!(set.length(), 1);
    assert_eq!(
        set.metadata().limit_by,
        LimitBy::NumberOfPermissionEvaluations
    );
}

/// A passed caller deadline stops assembly like a spent budget.
#[test]
fn test_caller_deadline_stops_assembly() {
    let store = store();
    populate(&store, &[true; 4]);
    let executor = executor(&store, EngineConfig::default());
    let deadline = Instant::now()
        .checked_sub(Duration::from_millis(1))
        .unwrap_or_else(Instant::now);
    let mut ctx = ExecutionContext::new().with_deadline(deadline);

    let set = executor
        .execute_query_in(&query(), &options(), &user(), &mut ctx)
        .unwrap()
        .into_only()
        .unwrap();

    assert_eq!(set.length(), 1);
    assert_eq!(
        set.metadata().limit_by,
        LimitBy::NumberOfPermissionEvaluations
    );
    assert_eq!(executor.metrics().snapshot().budget_exhaustions, 1);
}
