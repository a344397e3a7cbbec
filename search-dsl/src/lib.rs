//! # Search DSL
//!
//! This crate builds filtered-query search request documents through a
//! fluent API. It includes the filter tree and its handles, metric and bucket
//! aggregations, property paths, the request builder and the executor seam
//! through which a composed request reaches a search engine.
//!
//! ```
//! use search_dsl::SearchRequest;
//!
//! let mut request = SearchRequest::new();
//! request
//!     .filter(|f| {
//!         f.term(|x| x.select("status"), "active");
//!     })
//!     .take(10)
//!     .sort_by_desc(|x| x.select("created_at"));
//!
//! let body = request.compose().unwrap();
//! assert_eq!(body["query"]["filtered"]["filter"]["term"]["status"], "active");
//! ```

pub mod aggregation;
pub mod config;
pub mod errors;
pub mod filter;
pub mod interfaces;
pub mod property_path;
pub mod request;

pub use aggregation::{Aggregation, Metric, MetricKind, MetricResult};
pub use config::SearchRequestConfig;
pub use errors::DslError;
pub use filter::{BoolFilter, Bounds, Filter, FilterTree, Terminal};
pub use interfaces::SearchExecutor;
pub use property_path::{PropertyPath, Selector};
pub use request::{Query, SearchRequest};

pub use search_dsl_shared::{
    ExtendedStatsResult, SearchResponse, SingleValueMetric, SortOrder, StatsResult,
};
