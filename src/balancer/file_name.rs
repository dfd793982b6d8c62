//! File-name balancing
//!
//! Ignores statistics entirely. Files are sorted case-insensitively and cut
//! into contiguous chunks, so a given file set always splits the same way.

use super::{Partitioner, Runners};
use crate::models::CategoryEntries;

#[derive(Clone, Copy, Debug, Default)]
pub struct FileName;

impl Partitioner for FileName {
    fn partition(
        &self,
        ids: &[String],
        _entries: &CategoryEntries,
        runner_count: usize,
    ) -> Runners {
        let mut sorted = ids.to_vec();
        sorted.sort_by_cached_key(|id| id.to_lowercase());

        let mut remaining = sorted.into_iter();
        let mut runners = Vec::with_capacity(runner_count);
        for left in (1..=runner_count).rev() {
            let take = remaining.len().div_ceil(left);
            runners.push(remaining.by_ref().take(take).collect());
        }
        runners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::fixtures::strings;

    fn partition(ids: &[&str], runner_count: usize) -> Runners {
        FileName.partition(&strings(ids), &CategoryEntries::default(), runner_count)
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let runners = partition(&["b.cy.ts", "C.cy.ts", "a.cy.ts", "D.cy.ts"], 1);
        assert_eq!(
            runners,
            vec![strings(&["a.cy.ts", "b.cy.ts", "C.cy.ts", "D.cy.ts"])]
        );
    }

    #[test]
    fn test_chunks_front_loaded() {
        let runners = partition(&["a", "b", "c", "d", "e"], 3);
        assert_eq!(
            runners,
            vec![strings(&["a", "b"]), strings(&["c", "d"]), strings(&["e"])]
        );

        let runners = partition(&["a", "b", "c", "d", "e", "f", "g"], 3);
        let sizes: Vec<_> = runners.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
    }

    #[test]
    fn test_more_runners_than_files() {
        let runners = partition(&["b", "a"], 4);
        assert_eq!(
            runners,
            vec![strings(&["a"]), strings(&["b"]), vec![], vec![]]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let runners = partition(&["A.cy.ts", "a.cy.ts"], 1);
        assert_eq!(runners, vec![strings(&["A.cy.ts", "a.cy.ts"])]);
    }
}
