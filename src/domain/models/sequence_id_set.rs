//! De-duplicated set of sequence identifiers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A set of sequence identifiers compared by exact, case-sensitive string
/// equality.
///
/// Used to track every hit seen so far in a run. Iteration order is
/// unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceIdSet {
    ids: HashSet<String>,
}

impl SequenceIdSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert `id`. Returns `false` if it was already present.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Insert every id from `ids`, returning how many were not already present.
    pub fn extend<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for id in ids {
            if self.add(id) {
                added += 1;
            }
        }
        added
    }

    /// Ids from `candidates` that are not in this set.
    pub fn difference(&self, candidates: &Self) -> Self {
        candidates
            .ids
            .iter()
            .filter(|id| !self.ids.contains(*id))
            .cloned()
            .collect()
    }

    /// Number of ids in the set.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Ids in lexical order, for deterministic output files.
    pub fn sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.iter().collect();
        ids.sort_unstable();
        ids
    }
}

impl<S: Into<String>> FromIterator<S> for SequenceIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SequenceIdSet {
    type Item = &'a String;
    type IntoIter = std::collections::hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
