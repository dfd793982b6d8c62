//! Round-robin balancing

use super::{sort_by_median_desc, Partitioner, Runners};
use crate::models::CategoryEntries;

/// Deals files longest-first, one per runner in turn.
///
/// Keeps file counts even; runtimes can drift apart.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin;

impl Partitioner for RoundRobin {
    fn partition(
        &self,
        ids: &[String],
        entries: &CategoryEntries,
        runner_count: usize,
    ) -> Runners {
        if runner_count == 0 {
            return Vec::new();
        }
        let mut runners: Runners = vec![Vec::new(); runner_count];
        for (i, id) in sort_by_median_desc(ids, entries).into_iter().enumerate() {
            runners[i % runner_count].push(id);
        }
        runners
    }
}
