//! Result shapes of metric aggregations.

use serde::{Deserialize, Serialize};

/// Result of a single-value metric (`min`, `max`, `sum`, `avg`, `value_count`).
///
/// The engine reports `null` for metrics computed over an empty bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleValueMetric {
    pub value: Option<f64>,
}

/// Result of a `stats` aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: f64,
}

/// Result of an `extended_stats` aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedStatsResult {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: f64,
    pub sum_of_squares: Option<f64>,
    pub variance: Option<f64>,
    pub std_deviation: Option<f64>,
    /// `std_deviation_bounds.upper`
    pub upper: Option<f64>,
    /// `std_deviation_bounds.lower`
    pub lower: Option<f64>,
}

#[derive(Deserialize)]
struct Bounds {
    upper: Option<f64>,
    lower: Option<f64>,
}

#[derive(Deserialize)]
struct RawExtendedStats {
    count: u64,
    min: Option<f64>,
    max: Option<f64>,
    avg: Option<f64>,
    sum: f64,
    sum_of_squares: Option<f64>,
    variance: Option<f64>,
    std_deviation: Option<f64>,
    std_deviation_bounds: Option<Bounds>,
}

impl ExtendedStatsResult {
    /// Parse the engine's nested `std_deviation_bounds` layout into a flat result.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let raw: RawExtendedStats = serde_json::from_value(value)?;
        let (upper, lower) = raw
            .std_deviation_bounds
            .map(|b| (b.upper, b.lower))
            .unwrap_or((None, None));

        Ok(Self {
            count: raw.count,
            min: raw.min,
            max: raw.max,
            avg: raw.avg,
            sum: raw.sum,
            sum_of_squares: raw.sum_of_squares,
            variance: raw.variance,
            std_deviation: raw.std_deviation,
            upper,
            lower,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_value_null() {
        let metric: SingleValueMetric = serde_json::from_value(json!({ "value": null })).unwrap();
        assert_eq!(metric.value, None);
    }

    #[test]
    fn test_extended_stats_flattens_bounds() {
        let value = json!({
            "count": 3,
            "min": 1.0,
            "max": 3.0,
            "avg": 2.0,
            "sum": 6.0,
            "sum_of_squares": 14.0,
            "variance": 0.6666,
            "std_deviation": 0.8165,
            "std_deviation_bounds": { "upper": 3.633, "lower": 0.367 }
        });

        let stats = ExtendedStatsResult::from_value(value).unwrap();

        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, 6.0);
        assert_eq!(stats.upper, Some(3.633));
        assert_eq!(stats.lower, Some(0.367));
    }
}
