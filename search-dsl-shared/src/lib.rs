//! # Search DSL Shared
//!
//! Plain data types shared between the query builders and whoever executes
//! the composed requests: the search result read contract, metric result
//! shapes and sort directions.

pub mod metrics;
pub mod response;
pub mod sort;

pub use metrics::{ExtendedStatsResult, SingleValueMetric, StatsResult};
pub use response::{Hit, Hits, SearchResponse, Shards};
pub use sort::SortOrder;
