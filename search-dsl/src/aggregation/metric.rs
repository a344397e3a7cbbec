//! Metric descriptors and typed read-back handles.

use std::marker::PhantomData;

use serde_json::Value;

use crate::errors::DslError;
use crate::property_path::PropertyPath;
use search_dsl_shared::{ExtendedStatsResult, SearchResponse, SingleValueMetric, StatsResult};

/// Metric aggregation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Min,
    Max,
    Sum,
    Avg,
    Count,
    Stats,
    ExtendedStats,
}

impl MetricKind {
    /// Wire name of the metric.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Count => "value_count",
            Self::Stats => "stats",
            Self::ExtendedStats => "extended_stats",
        }
    }
}

/// A metric set on an aggregation node.
#[derive(Debug, Clone)]
pub(crate) struct MetricDescriptor {
    pub kind: MetricKind,
    pub field: Result<PropertyPath, DslError>,
}

impl MetricDescriptor {
    /// `{kind: {"field": path}}`
    pub fn compose(&self) -> Result<Value, DslError> {
        let field = self.field.clone()?;
        let mut descriptor = serde_json::Map::new();
        descriptor.insert(
            self.kind.key().to_string(),
            serde_json::json!({ "field": field }),
        );
        Ok(Value::Object(descriptor))
    }
}

/// A metric result shape that can be read out of an aggregation result.
pub trait MetricResult: Sized {
    fn from_aggregation(value: Value) -> Result<Self, DslError>;
}

impl MetricResult for SingleValueMetric {
    fn from_aggregation(value: Value) -> Result<Self, DslError> {
        serde_json::from_value(value).map_err(|e| DslError::result_parse(e.to_string()))
    }
}

impl MetricResult for StatsResult {
    fn from_aggregation(value: Value) -> Result<Self, DslError> {
        serde_json::from_value(value).map_err(|e| DslError::result_parse(e.to_string()))
    }
}

impl MetricResult for ExtendedStatsResult {
    fn from_aggregation(value: Value) -> Result<Self, DslError> {
        ExtendedStatsResult::from_value(value).map_err(|e| DslError::result_parse(e.to_string()))
    }
}

/// Handle returned when a metric is set, used to read the value back out of a
/// search response. It carries no query-building capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric<R> {
    path: Vec<String>,
    _result: PhantomData<fn() -> R>,
}

impl<R: MetricResult> Metric<R> {
    pub(crate) fn new(path: Vec<String>) -> Self {
        Self {
            path,
            _result: PhantomData,
        }
    }

    /// Name of the aggregation this metric belongs to.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Read the metric from a response.
    ///
    /// Top-level aggregations are looked up directly by name; sub-aggregations
    /// are found by walking their ancestors' results.
    pub fn read<T>(&self, response: &SearchResponse<T>) -> Result<R, DslError> {
        let not_found = || DslError::AggregationNotFound(self.path.join("."));

        let (first, rest) = self.path.split_first().ok_or_else(not_found)?;
        let mut current = response.aggregation(first).ok_or_else(not_found)?;
        for name in rest {
            current = current.get(name).ok_or_else(not_found)?;
        }

        R::from_aggregation(current.clone())
    }
}
