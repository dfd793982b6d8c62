//! Data models for load balancing
//!
//! Duration statistics, the persisted store and runner identity.

mod category;
mod result;
mod runner;
mod stats;
mod store;

pub use category::Category;
pub use result::ExecutionResult;
pub use runner::RunnerSpec;
pub(crate) use stats::compare_medians;
pub use stats::{DurationRecord, DurationStats, DEFAULT_MAX_DURATIONS};
pub use store::{CategoryEntries, StatisticsStore};
