//! Content-model names the engine depends on

use super::QName;

/// Type marking a deleted (tombstoned) node
pub fn deleted_type() -> QName {
    QName::new("sys", "deleted")
}

/// Aspect carrying creator/modifier audit properties
pub fn auditable_aspect() -> QName {
    QName::new("cm", "auditable")
}

/// Aspect carrying an explicit owner property
pub fn ownable_aspect() -> QName {
    QName::new("cm", "ownable")
}

/// Creator recorded by the auditable aspect
pub fn creator_property() -> QName {
    QName::new("cm", "creator")
}

/// Explicit owner recorded by the ownable aspect
pub fn owner_property() -> QName {
    QName::new("cm", "owner")
}
