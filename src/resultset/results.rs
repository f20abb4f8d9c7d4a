//! Result sets keyed by selector group

use std::collections::BTreeMap;

use super::ResultSet;
use crate::query::SelectorGroup;

/// Output of one query execution: one result set per selector group
#[derive(Default)]
pub struct QueryEngineResults {
    results: BTreeMap<SelectorGroup, Box<dyn ResultSet>>,
}

impl QueryEngineResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(group: SelectorGroup, result: Box<dyn ResultSet>) -> Self {
        let mut results = Self::new();
        results.insert(group, result);
        results
    }

    pub fn insert(&mut self, group: SelectorGroup, result: Box<dyn ResultSet>) {
        self.results.insert(group, result);
    }

    pub fn get(&self, group: &SelectorGroup) -> Option<&dyn ResultSet> {
        self.results.get(group).map(|r| r.as_ref())
    }

    /// The only result set, when there is exactly one
    pub fn only(&self) -> Option<&dyn ResultSet> {
        if self.results.len() != 1 {
            return None;
        }
        self.results.values().next().map(|r| r.as_ref())
    }

    /// Take ownership of the only result set, when there is exactly one
    pub fn into_only(self) -> Option<Box<dyn ResultSet>> {
        if self.results.len() != 1 {
            return None;
        }
        self.results.into_values().next()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &SelectorGroup> {
        self.results.keys()
    }
}

impl IntoIterator for QueryEngineResults {
    type Item = (SelectorGroup, Box<dyn ResultSet>);
    type IntoIter = std::collections::btree_map::IntoIter<SelectorGroup, Box<dyn ResultSet>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resultset::test_support::{nodes, service};
    use crate::resultset::{NodeResultSet, ResultSetMetaData};

    #[test]
    fn test_single_group() {
        let group: SelectorGroup = ["doc".to_string()].into_iter().collect();
        let set = NodeResultSet::new(nodes(&[1]), service(), ResultSetMetaData::unlimited());
        let results = QueryEngineResults::single(group.clone(), Box::new(set));

        assert_eq!(results.len(), 1);
        assert_eq!(results.get(&group).unwrap().length(), 1);
        assert_eq!(results.only().unwrap().length(), 1);
        assert_eq!(results.into_only().unwrap().length(), 1);
    }

    #[test]
    fn test_only_requires_exactly_one() {
        assert!(QueryEngineResults::new().only().is_none());
    }
}
