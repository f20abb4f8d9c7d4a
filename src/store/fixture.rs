//! JSON fixtures for the in-memory store
//!
//! A fixture lists stores, ACLs and nodes. Nodes are inserted in file
//! order, which is also the order rows are delivered in.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::memory::MemoryStore;
use crate::node::{Node, NodeProperties, QName, StoreRef};
use crate::security::{AccessControlList, AclId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureNode {
    pub store: StoreRef,
    /// External id; generated when absent
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "type")]
    pub type_name: QName,
    #[serde(default)]
    pub acl: Option<AclId>,
    #[serde(default = "default_txn")]
    pub txn: u64,
    #[serde(flatten)]
    pub props: NodeProperties,
    /// `uuid` of an earlier node that is this node's primary parent
    #[serde(default)]
    pub parent: Option<String>,
}

fn default_txn() -> u64 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub stores: Vec<StoreRef>,
    #[serde(default)]
    pub acls: Vec<AccessControlList>,
    #[serde(default)]
    pub nodes: Vec<FixtureNode>,
}

impl Fixture {
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::FixtureIo(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| StoreError::InvalidFixture(e.to_string()))
    }

    /// Build a populated store
    pub fn into_store(self) -> StoreResult<MemoryStore> {
        let store = MemoryStore::new();
        for store_ref in self.stores {
            store.add_store(store_ref);
        }
        for acl in self.acls {
            store.add_acl(acl);
        }

        let mut by_uuid: HashMap<String, Node> = HashMap::new();
        for entry in self.nodes {
            let node = store.insert_node_with_uuid(
                &entry.store,
                entry.uuid,
                entry.type_name,
                entry.acl,
                entry.props,
                entry.txn,
            )?;
            if let Some(parent_uuid) = entry.parent {
                let parent = by_uuid.get(&parent_uuid).ok_or_else(|| {
                    StoreError::InvalidFixture(format!("Unknown parent '{}'", parent_uuid))
                })?;
                let name = QName::new("cm", node.node_ref.id.clone());
                store.set_primary_parent(parent, &node, name);
            }
            by_uuid.insert(node.node_ref.id.clone(), node);
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NodeService, StoreResolver};
    use serde_json::json;
    use std::io::Write;

    fn fixture_json() -> serde_json::Value {
        json!({
            "stores": [{"protocol": "workspace", "identifier": "SpacesStore"}],
            "acls": [{"id": 1, "readers": ["GROUP_EVERYONE"]}],
            "nodes": [
                {
                    "store": {"protocol": "workspace", "identifier": "SpacesStore"},
                    "uuid": "root",
                    "type": "cm:folder",
                    "acl": 1
                },
                {
                    "store": {"protocol": "workspace", "identifier": "SpacesStore"},
                    "uuid": "doc",
                    "type": "cm:content",
                    "acl": 1,
                    "txn": 4,
                    "aspects": ["cm:ownable"],
                    "properties": {"cm:owner": "alice"},
                    "parent": "root"
                }
            ]
        })
    }

    #[test]
    fn test_fixture_builds_store() {
        let fixture: Fixture = serde_json::from_value(fixture_json()).unwrap();
        let store = fixture.into_store().unwrap();

        assert!(store.resolve_store(&StoreRef::spaces_store()).is_some());
        assert!(store.resolve_type(&QName::new("cm", "content")).is_some());
    }

    #[test]
    fn test_fixture_parent_and_properties() {
        let fixture: Fixture = serde_json::from_value(fixture_json()).unwrap();
        let store = fixture.into_store().unwrap();

        let doc = Node {
            id: crate::node::NodeId(2),
            store_id: crate::node::StoreId(1),
            node_ref: crate::node::NodeRef::new(StoreRef::spaces_store(), "doc"),
            type_name: QName::new("cm", "content"),
            acl_id: Some(AclId(1)),
            txn_id: 4,
        };
        let parent = store.get_primary_parent(&doc).unwrap();
        assert_eq!(parent.parent.unwrap().id, "root");
        assert_eq!(
            store.get_property(&doc, &QName::new("cm", "owner")),
            Some(json!("alice"))
        );
    }

    #[test]
    fn test_fixture_unknown_parent_rejected() {
        let mut json = fixture_json();
        json["nodes"][1]["parent"] = json!("missing");
        let fixture: Fixture = serde_json::from_value(json).unwrap();
        assert!(matches!(
            fixture.into_store(),
            Err(StoreError::InvalidFixture(_))
        ));
    }

    #[test]
    fn test_fixture_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", fixture_json()).unwrap();
        let fixture = Fixture::load(file.path()).unwrap();
        assert_eq!(fixture.nodes.len(), 2);
    }
}
