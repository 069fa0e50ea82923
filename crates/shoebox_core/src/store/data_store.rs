//! Category/id-keyed storage with live-reference reads.
//!
//! # Responsibility
//! - Own the category name -> (id -> record) maps.
//! - Make category replacement an explicit, warned-about upsert.
//!
//! # Invariants
//! - `category_mut` returns the live map, not a snapshot; in-place edits are
//!   visible to any later save with no commit step.
//! - Callers serialize concurrent access themselves; the store provides no
//!   locking.

use crate::model::record::RecordMap;
use log::warn;
use std::collections::BTreeMap;

/// In-memory map from category name to that category's records.
#[derive(Debug, Default)]
pub struct DataStore {
    categories: BTreeMap<String, RecordMap>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces or creates one category wholesale.
    ///
    /// Overwriting an existing category is permitted and logged as a
    /// recoverable warning.
    pub fn set_category(&mut self, name: impl Into<String>, records: RecordMap) {
        let name = name.into();
        if self.categories.contains_key(&name) {
            warn!("data store: overwriting existing category `{name}`");
        }
        self.categories.insert(name, records);
    }

    /// Returns one category's records for reading.
    pub fn category(&self, name: &str) -> Option<&RecordMap> {
        self.categories.get(name)
    }

    /// Returns the live category map for editing.
    ///
    /// Mutations through the returned reference are immediately visible to a
    /// later save.
    pub fn category_mut(&mut self, name: &str) -> Option<&mut RecordMap> {
        let found = self.categories.get_mut(name);
        if found.is_none() {
            warn!("data store: category `{name}` not found");
        }
        found
    }

    /// Returns current category names. Order is not contractual.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Iterates categories and their records.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RecordMap)> {
        self.categories.iter()
    }

    /// Removes every category; used before a full reload.
    pub fn clear(&mut self) {
        self.categories.clear();
    }

    /// Count of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
