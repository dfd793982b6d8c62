//! Reconciling runner documents
//!
//! Each runner records durations into its own copy of the store. Once every
//! runner has finished, their copies are folded back into the main document.

use thiserror::Error;
use tracing::debug;

use crate::models::{Category, DurationStats, StatisticsStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("No input files provided or found for the merge command to use!")]
    NoInputs,
}

/// Fold `peers` into a copy of `authoritative`.
///
/// Entries only a peer knows are appended as-is. For shared entries the peer's
/// durations are merged index-wise: positions past the end of the merged list
/// are appended, other values only when the history merged so far does not
/// already hold them. Histories are then trimmed to `max_durations` and every
/// entry's metrics are re-derived from its durations.
pub fn merge(
    authoritative: &StatisticsStore,
    peers: &[StatisticsStore],
    max_durations: usize,
) -> StatisticsStore {
    let mut merged = authoritative.clone();

    for peer in peers {
        for category in Category::all() {
            let target = merged.entries_mut(category);
            for (id, record) in peer.entries(category) {
                match target.get_mut(id) {
                    Some(existing) => {
                        merge_durations(&mut existing.stats, &record.stats.durations);
                    }
                    None => {
                        debug!("Adding {category} entry from peer: {id}");
                        target.insert(id.clone(), record.clone());
                    }
                }
            }
        }
    }

    merged.recompute_all(max_durations);
    merged
}

/// Dedup compares against the history as it stood before this peer
fn merge_durations(target: &mut DurationStats, incoming: &[f64]) {
    let original = target.durations.clone();
    for (i, value) in incoming.iter().enumerate() {
        if i >= target.durations.len() || !original.contains(value) {
            target.durations.push(*value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[(&str, Vec<f64>)]) -> StatisticsStore {
        let mut store = StatisticsStore::new();
        for (id, durations) in entries {
            store.ensure_entry(Category::E2e, id, false);
            for d in durations {
                store.record_duration(Category::E2e, id, *d, 10).unwrap();
            }
        }
        store
    }

    fn stats<'a>(store: &'a StatisticsStore, id: &str) -> &'a DurationStats {
        &store.get(Category::E2e, id).unwrap().stats
    }

    #[test]
    fn test_merge_without_peers_is_identity() {
        let main = store(&[("a.cy.ts", vec![100.0, 200.0]), ("b.cy.ts", vec![])]);
        assert_eq!(merge(&main, &[], 10), main);
    }

    #[test]
    fn test_merge_appends_new_durations() {
        let main = store(&[("a.cy.ts", vec![100.0, 200.0])]);
        let peer = store(&[("a.cy.ts", vec![100.0, 200.0, 300.0])]);

        let merged = merge(&main, &[peer], 10);
        let stats = stats(&merged, "a.cy.ts");
        assert_eq!(stats.durations, vec![100.0, 200.0, 300.0]);
        assert_eq!(stats.average, 200.0);
        assert_eq!(stats.median, 200.0);

        // input untouched
        assert_eq!(stats_len(&main), 2);
    }

    fn stats_len(store: &StatisticsStore) -> usize {
        stats(store, "a.cy.ts").durations.len()
    }

    #[test]
    fn test_merge_evicts_to_limit() {
        let main = store(&[("a.cy.ts", vec![200.0, 200.0, 200.0])]);
        let peer = store(&[("a.cy.ts", vec![200.0, 200.0, 200.0, 300.0])]);

        let merged = merge(&main, &[peer], 3);
        let stats = stats(&merged, "a.cy.ts");
        assert_eq!(stats.durations, vec![200.0, 200.0, 300.0]);
        assert_eq!(stats.average, 234.0);
        assert_eq!(stats.median, 200.0);
    }

    #[test]
    fn test_merge_several_runners() {
        let main = store(&[("a.cy.ts", vec![100.0]), ("b.cy.ts", vec![50.0])]);
        let runner1 = store(&[("a.cy.ts", vec![100.0, 120.0]), ("b.cy.ts", vec![50.0])]);
        let runner2 = store(&[("a.cy.ts", vec![100.0]), ("b.cy.ts", vec![50.0, 70.0])]);

        let merged = merge(&main, &[runner1, runner2], 10);
        assert_eq!(stats(&merged, "a.cy.ts").durations, vec![100.0, 120.0]);
        assert_eq!(stats(&merged, "b.cy.ts").durations, vec![50.0, 70.0]);
    }

    #[test]
    fn test_merge_skips_values_already_recorded() {
        let main = store(&[("a.cy.ts", vec![100.0, 200.0])]);
        let peer = store(&[("a.cy.ts", vec![200.0, 100.0, 150.0, 200.0])]);

        let merged = merge(&main, &[peer], 10);
        assert_eq!(
            stats(&merged, "a.cy.ts").durations,
            vec![100.0, 200.0, 150.0, 200.0]
        );
    }

    #[test]
    fn test_merge_adds_unknown_entries() {
        let main = store(&[("a.cy.ts", vec![100.0])]);
        let mut peer = store(&[("new.cy.ts", vec![40.0])]);
        peer.ensure_entry(Category::Component, "c.cy.ts", false);

        let merged = merge(&main, &[peer], 10);
        let ids: Vec<_> = merged.ids(Category::E2e).collect();
        assert_eq!(ids, vec!["a.cy.ts", "new.cy.ts"]);
        assert_eq!(stats(&merged, "new.cy.ts").durations, vec![40.0]);
        assert!(merged.contains(Category::Component, "c.cy.ts"));
    }

    #[test]
    fn test_merge_recomputes_stale_metrics() {
        let mut main = store(&[("a.cy.ts", vec![100.0, 300.0])]);
        main.entries_mut(Category::E2e)["a.cy.ts"].stats.median = 999.0;

        let merged = merge(&main, &[], 10);
        assert_eq!(stats(&merged, "a.cy.ts").median, 100.0);
        assert_eq!(stats(&merged, "a.cy.ts").average, 200.0);
    }
}
