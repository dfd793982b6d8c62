//! Statistics store
//!
//! Category -> file id -> duration record, in insertion order. This is the
//! shape persisted in `main.json` and in every runner-scoped document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::category::Category;
use super::stats::{DurationRecord, DurationStats};

/// Entries for a single category, keyed by relative file id
pub type CategoryEntries = IndexMap<String, DurationRecord>;

/// Errors raised by store mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No {category} entry exists for '{id}'; create it before recording durations")]
    MissingEntry { category: Category, id: String },
}

/// Per-file duration statistics for both testing categories
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsStore {
    #[serde(default)]
    pub e2e: CategoryEntries,

    #[serde(default)]
    pub component: CategoryEntries,
}

impl StatisticsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for a category
    pub fn entries(&self, category: Category) -> &CategoryEntries {
        match category {
            Category::E2e => &self.e2e,
            Category::Component => &self.component,
        }
    }

    pub(crate) fn entries_mut(&mut self, category: Category) -> &mut CategoryEntries {
        match category {
            Category::E2e => &mut self.e2e,
            Category::Component => &mut self.component,
        }
    }

    /// Look up a single entry
    pub fn get(&self, category: Category, id: &str) -> Option<&DurationRecord> {
        self.entries(category).get(id)
    }

    /// Whether the category holds an entry for `id`
    pub fn contains(&self, category: Category, id: &str) -> bool {
        self.entries(category).contains_key(id)
    }

    /// File ids of a category in insertion order
    pub fn ids(&self, category: Category) -> impl Iterator<Item = &str> {
        self.entries(category).keys().map(String::as_str)
    }

    /// Number of entries in a category
    pub fn len(&self, category: Category) -> usize {
        self.entries(category).len()
    }

    /// Whether both categories are empty
    pub fn is_empty(&self) -> bool {
        self.e2e.is_empty() && self.component.is_empty()
    }

    /// Create a zero-history entry for `id`.
    ///
    /// An existing entry is left untouched unless `force` is set. Returns
    /// whether an entry was written.
    pub fn ensure_entry(&mut self, category: Category, id: &str, force: bool) -> bool {
        let entries = self.entries_mut(category);
        if force || !entries.contains_key(id) {
            entries.insert(id.to_string(), DurationRecord::empty());
            debug!("Added {category} entry: {id} (force: {force})");
            true
        } else {
            debug!("{category} entry already exists: {id}");
            false
        }
    }

    /// Append a duration to an existing entry and re-derive its metrics
    pub fn record_duration(
        &mut self,
        category: Category,
        id: &str,
        duration: f64,
        max_durations: usize,
    ) -> Result<&DurationStats, StoreError> {
        let record = self
            .entries_mut(category)
            .get_mut(id)
            .ok_or_else(|| StoreError::MissingEntry {
                category,
                id: id.to_string(),
            })?;

        record.stats.push(duration, max_durations);
        debug!(
            "Recorded {duration}ms for {category} file {id} (average {}, median {})",
            record.stats.average, record.stats.median
        );
        Ok(&record.stats)
    }

    /// Evict and re-derive metrics for every entry
    pub fn recompute_all(&mut self, max_durations: usize) {
        for category in Category::all() {
            for record in self.entries_mut(category).values_mut() {
                record.stats.refresh(max_durations);
            }
        }
    }
}
