//! Qualified names for types, aspects and properties
//!
//! Names are written in prefixed form (`cm:owner`). The prefix stands in
//! for a namespace URI; resolving prefixes is the dictionary's job and is
//! not done here.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error raised when a string is not a valid prefixed name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid qualified name: '{0}'")]
pub struct QNameError(pub String);

/// A prefixed qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    prefix: String,
    local: String,
}

fn qname_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z][a-z0-9_]*):([A-Za-z_][A-Za-z0-9_.\-]*)$")
            .expect("qualified name pattern is valid")
    })
}

impl QName {
    /// Create a name from its prefix and local part
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// Parse `prefix:local`
    pub fn parse(s: &str) -> Result<Self, QNameError> {
        let caps = qname_pattern()
            .captures(s)
            .ok_or_else(|| QNameError(s.to_string()))?;
        Ok(Self::new(&caps[1], &caps[2]))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

impl FromStr for QName {
    type Err = QNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for QName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        QName::parse(&s).map_err(serde::de::Error::custom)
    }
}
