//! Metric and bucket aggregations.
//!
//! An aggregation node either computes a single metric over a field, or
//! defines a bucket through an optional filter and named sub-aggregations.
//! The two modes are exclusive: setting one discards the other.

mod metric;

pub use metric::{Metric, MetricKind, MetricResult};

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::DslError;
use crate::filter::{Filter, FilterTree};
use crate::property_path::{self, Selector};
use metric::MetricDescriptor;
use search_dsl_shared::{ExtendedStatsResult, SingleValueMetric, StatsResult};

/// A named aggregation node.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Names from the top-level aggregation down to this node.
    path: Vec<String>,
    metric: Option<MetricDescriptor>,
    filter: Option<FilterTree>,
    aggs: BTreeMap<String, Aggregation>,
}

impl Aggregation {
    /// Create a top-level aggregation.
    pub fn new(name: impl Into<String>) -> Self {
        Self::at(vec![name.into()])
    }

    fn at(path: Vec<String>) -> Self {
        Self {
            path,
            metric: None,
            filter: None,
            aggs: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Check if this node composes as a bucket.
    pub fn is_bucket(&self) -> bool {
        self.filter.is_some() || !self.aggs.is_empty()
    }

    /// Get or create the named sub-aggregation.
    pub fn sub_aggregate(&mut self, name: &str) -> &mut Aggregation {
        self.clear_metric();
        let path = &self.path;
        self.aggs.entry(name.to_string()).or_insert_with(|| {
            let mut child_path = path.clone();
            child_path.push(name.to_string());
            Aggregation::at(child_path)
        })
    }

    /// Configure the bucket filter, creating it on first use.
    ///
    /// Every call runs `configure` against the same filter tree.
    pub fn bucket_filter<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Filter<'_>),
    {
        self.clear_metric();
        let tree = self.filter.get_or_insert_with(FilterTree::new);
        configure(&mut tree.root());
        self
    }

    pub fn min<P>(&mut self, property: P) -> Metric<SingleValueMetric>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::Min, property)
    }

    pub fn max<P>(&mut self, property: P) -> Metric<SingleValueMetric>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::Max, property)
    }

    pub fn sum<P>(&mut self, property: P) -> Metric<SingleValueMetric>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::Sum, property)
    }

    pub fn avg<P>(&mut self, property: P) -> Metric<SingleValueMetric>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::Avg, property)
    }

    /// Number of values of the field (`value_count`).
    pub fn count<P>(&mut self, property: P) -> Metric<SingleValueMetric>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::Count, property)
    }

    pub fn stats<P>(&mut self, property: P) -> Metric<StatsResult>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::Stats, property)
    }

    pub fn extended_stats<P>(&mut self, property: P) -> Metric<ExtendedStatsResult>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.set_metric(MetricKind::ExtendedStats, property)
    }

    fn set_metric<P, R>(&mut self, kind: MetricKind, property: P) -> Metric<R>
    where
        P: FnOnce(Selector) -> Selector,
        R: MetricResult,
    {
        if self.is_bucket() {
            warn!(
                aggregation = %self.path.join("."),
                metric = kind.key(),
                "Replacing bucket definition with metric"
            );
            self.filter = None;
            self.aggs.clear();
        }
        self.metric = Some(MetricDescriptor {
            kind,
            field: property_path::resolve(property),
        });
        Metric::new(self.path.clone())
    }

    fn clear_metric(&mut self) {
        if let Some(metric) = self.metric.take() {
            warn!(
                aggregation = %self.path.join("."),
                metric = metric.kind.key(),
                "Replacing metric with bucket definition"
            );
        }
    }

    /// Compose this node and its sub-aggregations.
    ///
    /// A bucket composes to `{"filter"?, "aggs"?}`, a metric to its
    /// descriptor, and an unconfigured node to `{}`.
    pub fn compose(&self) -> Result<Value, DslError> {
        if let Some(metric) = &self.metric {
            return metric.compose();
        }

        let mut body = Map::new();
        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), filter.compose()?);
        }
        if !self.aggs.is_empty() {
            let mut aggs = Map::new();
            for (name, child) in &self.aggs {
                aggs.insert(name.clone(), child.compose()?);
            }
            body.insert("aggs".to_string(), Value::Object(aggs));
        }
        Ok(Value::Object(body))
    }
}
