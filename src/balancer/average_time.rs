//! Average-time balancing
//!
//! Legacy strategy. Each runner is filled from the middle of the
//! longest-first queue until it reaches the average time per runner.

use tracing::debug;

use super::{empty_groups, sort_by_median_desc, total_time, Partitioner, Runners};
use crate::models::CategoryEntries;

#[derive(Clone, Copy, Debug, Default)]
pub struct AverageTime;

impl Partitioner for AverageTime {
    fn partition(
        &self,
        ids: &[String],
        entries: &CategoryEntries,
        runner_count: usize,
    ) -> Runners {
        if runner_count == 0 {
            return Vec::new();
        }
        let target = (total_time(entries, ids) / runner_count as f64).ceil();
        debug!("average-time target per runner: {target}");

        let mut queue = sort_by_median_desc(ids, entries);
        let mut runners = empty_groups(runner_count);

        let mut current = 0;
        while current < runner_count && !queue.is_empty() {
            let middle = queue.len().div_ceil(2) - 1;
            let id = queue.remove(middle);
            runners[current].push(id, entries);
            if runners[current].total >= target {
                current += 1;
            }
        }

        for (i, id) in queue.into_iter().enumerate() {
            runners[i % runner_count].push(id, entries);
        }

        runners.into_iter().map(|r| r.files).collect()
    }
}
