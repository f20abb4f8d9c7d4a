//! Constraint tree and its prepared form
//!
//! Constraints are a closed set of variants. Each variant knows how to
//! contribute itself to a prepared query through [`QueryBuilderComponent`],
//! so preparation never inspects variant types at runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::{Node, NodeProperties, QName};

/// Capability shared by every constraint variant
pub trait QueryBuilderComponent {
    /// Produce the row predicate for this constraint
    fn prepare(&self) -> PreparedPredicate;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conjunction {
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disjunction {
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Negation {
    pub constraint: Box<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeFilter {
    #[serde(rename = "type")]
    pub type_name: QName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectFilter {
    pub aspect: QName,
}

impl AspectFilter {
    pub fn new(aspect: QName) -> Self {
        Self { aspect }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEquals {
    pub property: QName,
    pub value: Value,
}

/// A node constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Constraint {
    Conjunction(Conjunction),
    Disjunction(Disjunction),
    Negation(Negation),
    TypeIs(TypeFilter),
    HasAspect(AspectFilter),
    PropertyEquals(PropertyEquals),
}

impl QueryBuilderComponent for Conjunction {
    fn prepare(&self) -> PreparedPredicate {
        PreparedPredicate::All(self.constraints.iter().map(|c| c.prepare()).collect())
    }
}

impl QueryBuilderComponent for Disjunction {
    fn prepare(&self) -> PreparedPredicate {
        PreparedPredicate::Any(self.constraints.iter().map(|c| c.prepare()).collect())
    }
}

impl QueryBuilderComponent for Negation {
    fn prepare(&self) -> PreparedPredicate {
        PreparedPredicate::Not(Box::new(self.constraint.prepare()))
    }
}

impl QueryBuilderComponent for TypeFilter {
    fn prepare(&self) -> PreparedPredicate {
        PreparedPredicate::TypeIs(self.type_name.clone())
    }
}

impl QueryBuilderComponent for AspectFilter {
    fn prepare(&self) -> PreparedPredicate {
        PreparedPredicate::HasAspect(self.aspect.clone())
    }
}

impl QueryBuilderComponent for PropertyEquals {
    fn prepare(&self) -> PreparedPredicate {
        PreparedPredicate::PropertyEquals {
            property: self.property.clone(),
            value: self.value.clone(),
        }
    }
}

impl QueryBuilderComponent for Constraint {
    fn prepare(&self) -> PreparedPredicate {
        match self {
            Constraint::Conjunction(c) => c.prepare(),
            Constraint::Disjunction(c) => c.prepare(),
            Constraint::Negation(c) => c.prepare(),
            Constraint::TypeIs(c) => c.prepare(),
            Constraint::HasAspect(c) => c.prepare(),
            Constraint::PropertyEquals(c) => c.prepare(),
        }
    }
}

/// Row predicate handed to the backing store
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedPredicate {
    True,
    All(Vec<PreparedPredicate>),
    Any(Vec<PreparedPredicate>),
    Not(Box<PreparedPredicate>),
    TypeIs(QName),
    HasAspect(QName),
    PropertyEquals { property: QName, value: Value },
}

impl PreparedPredicate {
    /// Evaluate against a node and its properties. No type coercion.
    pub fn matches(&self, node: &Node, props: &NodeProperties) -> bool {
        match self {
            PreparedPredicate::True => true,
            PreparedPredicate::All(parts) => parts.iter().all(|p| p.matches(node, props)),
            PreparedPredicate::Any(parts) => parts.iter().any(|p| p.matches(node, props)),
            PreparedPredicate::Not(inner) => !inner.matches(node, props),
            PreparedPredicate::TypeIs(type_name) => &node.type_name == type_name,
            PreparedPredicate::HasAspect(aspect) => props.has_aspect(aspect),
            PreparedPredicate::PropertyEquals { property, value } => {
                props.get(property) == Some(value)
            }
        }
    }
}
