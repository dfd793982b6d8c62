//! Weighted-largest balancing
//!
//! The slowest runner sets the pace: every other runner is topped up with the
//! next-longest file until it catches up, one file per runner per pass.

use std::collections::VecDeque;
use tracing::debug;

use super::{empty_groups, median_of, sort_by_median_desc, Partitioner, Runners};
use crate::models::{compare_medians, CategoryEntries};

/// Default algorithm; aims for equal total runtime per runner
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedLargest;

impl Partitioner for WeightedLargest {
    fn partition(
        &self,
        ids: &[String],
        entries: &CategoryEntries,
        runner_count: usize,
    ) -> Runners {
        if runner_count == 0 {
            return Vec::new();
        }
        if runner_count == 1 {
            let mut sorted = ids.to_vec();
            sorted.sort_by(|a, b| compare_medians(median_of(entries, b), median_of(entries, a)));
            return vec![sorted];
        }

        let mut queue: VecDeque<String> = sort_by_median_desc(ids, entries).into();
        let mut runners = empty_groups(runner_count);
        let mut iteration = 0usize;

        while !queue.is_empty() {
            iteration += 1;

            // Equal totals would leave no runner below the target
            let first = runners[0].total;
            if runners.iter().all(|r| r.total == first) {
                for runner in runners.iter_mut() {
                    match queue.pop_front() {
                        Some(id) => runner.push(id, entries),
                        None => break,
                    }
                }
            }

            runners.sort_by(|a, b| compare_medians(a.total, b.total));
            let target = runners[runner_count - 1].total;
            debug!("weighted-largest pass {iteration}: target {target}");

            for runner in runners.iter_mut().take(runner_count - 1) {
                if runner.total >= target {
                    continue;
                }
                match queue.pop_front() {
                    Some(id) => runner.push(id, entries),
                    None => break,
                }
            }
        }

        debug!(
            "weighted-largest finished after {iteration} passes, totals: {:?}",
            runners.iter().map(|r| r.total).collect::<Vec<_>>()
        );

        runners.into_iter().map(|r| r.files).collect()
    }
}
