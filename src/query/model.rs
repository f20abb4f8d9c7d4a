//! Query sources and selector groups

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::constraint::{Constraint, PreparedPredicate, QueryBuilderComponent};
use crate::node::QName;

/// Set of selector names that resolve to the same node
pub type SelectorGroup = BTreeSet<String>;

/// Whether a selector's qualified name is a node type or an aspect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    #[default]
    Type,
    Aspect,
}

/// A named selection over nodes of one type, or carrying one aspect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: QName,
    #[serde(default)]
    pub kind: SelectorKind,
}

impl Selector {
    pub fn new(name: impl Into<String>, type_name: QName) -> Self {
        Self {
            name: name.into(),
            type_name,
            kind: SelectorKind::Type,
        }
    }

    /// Selector matching every node that carries `aspect`
    pub fn aspect(name: impl Into<String>, aspect: QName) -> Self {
        Self {
            name: name.into(),
            type_name: aspect,
            kind: SelectorKind::Aspect,
        }
    }

    fn predicate(&self) -> PreparedPredicate {
        match self.kind {
            SelectorKind::Type => PreparedPredicate::TypeIs(self.type_name.clone()),
            SelectorKind::Aspect => PreparedPredicate::HasAspect(self.type_name.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

/// How the two sides of a join are related
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinCondition {
    /// Both sides select the same node (e.g. a type joined to an aspect)
    SameNode,
    /// Sides related through property values
    PropertyEquals { left: QName, right: QName },
    /// Right side is a child of the left side
    ChildNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub left: Source,
    pub right: Source,
    pub kind: JoinKind,
    pub condition: JoinCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Selector(Selector),
    Join(Box<Join>),
}

impl Source {
    /// Selector groups of this source. Only same-node joins merge groups.
    pub fn selector_groups(&self) -> Vec<SelectorGroup> {
        match self {
            Source::Selector(selector) => {
                vec![std::iter::once(selector.name.clone()).collect()]
            }
            Source::Join(join) => {
                let mut left = join.left.selector_groups();
                let right = join.right.selector_groups();
                if join.condition == JoinCondition::SameNode {
                    let mut merged = SelectorGroup::new();
                    for group in left.into_iter().chain(right) {
                        merged.extend(group);
                    }
                    vec![merged]
                } else {
                    left.extend(right);
                    left
                }
            }
        }
    }

    fn selector_predicates(&self, out: &mut Vec<PreparedPredicate>) {
        match self {
            Source::Selector(selector) => out.push(selector.predicate()),
            Source::Join(join) => {
                join.left.selector_predicates(out);
                join.right.selector_predicates(out);
            }
        }
    }
}

/// A parsed structured query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub constraint: Option<Constraint>,
}

impl Query {
    /// Query selecting every node of `type_name`
    pub fn select(selector: impl Into<String>, type_name: QName) -> Self {
        Self {
            source: Some(Source::Selector(Selector::new(selector, type_name))),
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Selector groups; empty when the query has no source
    pub fn selector_groups(&self) -> Vec<SelectorGroup> {
        self.source
            .as_ref()
            .map(Source::selector_groups)
            .unwrap_or_default()
    }

    /// Combined row predicate: selector types or aspects and the constraint tree
    pub fn predicate(&self) -> PreparedPredicate {
        let mut parts = Vec::new();
        if let Some(source) = &self.source {
            source.selector_predicates(&mut parts);
        }
        if let Some(constraint) = &self.constraint {
            parts.push(constraint.prepare());
        }
        match parts.len() {
            0 => PreparedPredicate::True,
            1 => parts.remove(0),
            _ => PreparedPredicate::All(parts),
        }
    }
}
