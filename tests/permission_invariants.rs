//! Permission Assessment Tests
//!
//! Tests for row visibility decisions:
//! - Anonymous callers see nothing, administrators see everything
//! - Explicit denial wins over any grant
//! - Owner override through the auditable and ownable aspects
//! - ACL decisions are memoized per assessor

use std::sync::Arc;

use aclquery::cache::IdentityCache;
use aclquery::node::{names, Node, NodeProperties, QName, StoreRef};
use aclquery::permission::{CheckBudget, PermissionAssessor};
use aclquery::security::{AccessControlList, AclId, Authority, SecurityContext};
use aclquery::store::MemoryStore;
use serde_json::json;

const EVERYONE: AclId = AclId(1);
const ALICE_DENIED: AclId = AclId(2);
const NOBODY: AclId = AclId(3);

fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_store(StoreRef::spaces_store());
    store.add_acl(AccessControlList {
        id: EVERYONE,
        readers: [Authority::everyone()].into_iter().collect(),
        ..Default::default()
    });
    store.add_acl(AccessControlList {
        id: ALICE_DENIED,
        readers: [Authority::everyone(), Authority::new("alice")]
            .into_iter()
            .collect(),
        denied_readers: [Authority::new("alice")].into_iter().collect(),
    });
    store.add_acl(AccessControlList {
        id: NOBODY,
        ..Default::default()
    });
    store
}

fn insert(store: &MemoryStore, acl: Option<AclId>, props: NodeProperties) -> Node {
    store
        .insert_node(
            &StoreRef::spaces_store(),
            QName::new("cm", "content"),
            acl,
            props,
            1,
        )
        .unwrap()
}

fn with_aspect(props: &mut NodeProperties, aspect: QName, key: QName, value: serde_json::Value) {
    props.aspects.insert(aspect);
    props.properties.insert(key, value);
}

fn assessor(store: &Arc<MemoryStore>, context: SecurityContext) -> PermissionAssessor {
    PermissionAssessor::new(
        context,
        store.clone(),
        store.clone(),
        Arc::new(IdentityCache::new()),
        CheckBudget::unbounded(),
    )
}

fn alice() -> SecurityContext {
    SecurityContext::authenticated("alice", [])
}

// =============================================================================
// Caller Role Tests
// =============================================================================

/// Anonymous callers are excluded even from rows everyone may read.
#[test]
fn test_anonymous_sees_nothing() {
    let store = store();
    let open = insert(&store, Some(EVERYONE), NodeProperties::default());

    let mut assessor = assessor(&store, SecurityContext::anonymous());

    assert!(!assessor.is_included(&open));
    assert_eq!(assessor.state().checks(), 1);
}

/// A caller that names no user is treated as anonymous.
#[test]
fn test_absent_caller_sees_nothing() {
    let store = store();
    let open = insert(&store, Some(EVERYONE), NodeProperties::default());

    assert!(!assessor(&store, SecurityContext::default()).is_included(&open));

    let decoded: SecurityContext = serde_json::from_value(json!({})).unwrap();
    assert!(!assessor(&store, decoded).is_included(&open));

    let groups_only: SecurityContext =
        serde_json::from_value(json!({"authorities": ["GROUP_EVERYONE"]})).unwrap();
    assert!(!assessor(&store, groups_only).is_included(&open));
}

/// Administrators see rows nobody else may read, ACL or not.
#[test]
fn test_administrator_sees_everything() {
    let store = store();
    let locked = insert(&store, Some(NOBODY), NodeProperties::default());
    let bare = insert(&store, None, NodeProperties::default());

    let mut assessor = assessor(&store, SecurityContext::administrator("admin"));

    assert!(assessor.is_included(&locked));
    assert!(assessor.is_included(&bare));
}

// =============================================================================
// ACL Tests
// =============================================================================

/// A denial of any held authority wins over every grant.
#[test]
fn test_denial_wins_over_grants() {
    let store = store();
    let node = insert(&store, Some(ALICE_DENIED), NodeProperties::default());

    assert!(!assessor(&store, alice()).is_included(&node));

    let bob = SecurityContext::authenticated("bob", []);
    assert!(assessor(&store, bob).is_included(&node));
}

/// Group membership grants read through the ACL.
#[test]
fn test_group_authority_grants_read() {
    let store = store();
    store.add_acl(AccessControlList {
        id: AclId(10),
        readers: [Authority::new("GROUP_EDITORS")].into_iter().collect(),
        ..Default::default()
    });
    let node = insert(&store, Some(AclId(10)), NodeProperties::default());

    assert!(!assessor(&store, alice()).is_included(&node));

    let editor = SecurityContext::authenticated("alice", [Authority::new("GROUP_EDITORS")]);
    assert!(assessor(&store, editor).is_included(&node));
}

/// Repeated ACLs are decided once per assessor.
#[test]
fn test_acl_decisions_are_memoized() {
    let store = store();
    let nodes: Vec<Node> = (0..3)
        .map(|_| insert(&store, Some(EVERYONE), NodeProperties::default()))
        .collect();

    let mut assessor = assessor(&store, alice());
    for node in &nodes {
        assert!(assessor.is_included(node));
    }

    assert_eq!(assessor.state().checks(), 3);
    assert_eq!(assessor.state().decisions().len(), 1);
    let stats = assessor.state().decisions().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
}

// =============================================================================
// Owner Override Tests
// =============================================================================

/// The owner property of an ownable node grants read despite a denial.
#[test]
fn test_ownable_owner_overrides_denial() {
    let store = store();
    let mut props = NodeProperties::default();
    with_aspect(&mut props, names::ownable_aspect(), names::owner_property(), json!("alice"));
    let node = insert(&store, Some(ALICE_DENIED), props);

    assert!(assessor(&store, alice()).is_included(&node));
}

/// Owner override applies to nodes without an ACL.
#[test]
fn test_owner_of_node_without_acl() {
    let store = store();
    let mut props = NodeProperties::default();
    with_aspect(&mut props, names::ownable_aspect(), names::owner_property(), json!("alice"));
    let owned = insert(&store, None, props);
    let orphan = insert(&store, None, NodeProperties::default());

    let mut assessor = assessor(&store, alice());
    assert!(assessor.is_included(&owned));
    assert!(!assessor.is_included(&orphan));
}

/// The auditable creator is consulted before the ownable owner.
#[test]
fn test_auditable_creator_takes_precedence() {
    let store = store();
    let mut props = NodeProperties::default();
    with_aspect(&mut props, names::auditable_aspect(), names::creator_property(), json!("bob"));
    with_aspect(&mut props, names::ownable_aspect(), names::owner_property(), json!("alice"));
    let node = insert(&store, Some(NOBODY), props);

    assert!(!assessor(&store, alice()).is_included(&node));
    let bob = SecurityContext::authenticated("bob", []);
    assert!(assessor(&store, bob).is_included(&node));
}

/// Owner values that are not strings never match.
#[test]
fn test_non_string_owner_is_ignored() {
    let store = store();
    let mut props = NodeProperties::default();
    with_aspect(&mut props, names::ownable_aspect(), names::owner_property(), json!(["alice"]));
    let node = insert(&store, Some(NOBODY), props);

    assert!(!assessor(&store, alice()).is_included(&node));
}

/// An owner property without its aspect grants nothing.
#[test]
fn test_owner_property_requires_aspect() {
    let store = store();
    let mut props = NodeProperties::default();
    props.properties.insert(names::owner_property(), json!("alice"));
    let node = insert(&store, Some(NOBODY), props);

    assert!(!assessor(&store, alice()).is_included(&node));
}

// =============================================================================
// Budget Tests
// =============================================================================

/// The assessor quits one check past the configured count.
#[test]
fn test_quit_signal_follows_threshold() {
    let store = store();
    let node = insert(&store, Some(EVERYONE), NodeProperties::default());
    let mut assessor = PermissionAssessor::new(
        alice(),
        store.clone(),
        store.clone(),
        Arc::new(IdentityCache::new()),
        CheckBudget::new(Some(2), None),
    );

    assessor.is_included(&node);
    assessor.is_included(&node);
    assert!(!assessor.should_quit_checks());

    assessor.is_included(&node);
    assert!(assessor.should_quit_checks());
}
