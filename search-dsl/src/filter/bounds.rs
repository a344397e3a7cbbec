//! Range filter bounds.

use serde_json::{Map, Value};

/// Bounds of a `range` filter.
///
/// Only bounds that were set appear in the composed filter. Any value counts
/// as set, including `0` and `false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    lte: Option<Value>,
    lt: Option<Value>,
    gte: Option<Value>,
    gt: Option<Value>,
}

impl Bounds {
    /// Unbounded range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound, inclusive.
    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// Upper bound, exclusive.
    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// Lower bound, inclusive.
    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    /// Lower bound, exclusive.
    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// Check if no bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.lte.is_none() && self.lt.is_none() && self.gte.is_none() && self.gt.is_none()
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut range = Map::new();
        for (key, bound) in [
            ("lte", &self.lte),
            ("lt", &self.lt),
            ("gte", &self.gte),
            ("gt", &self.gt),
        ] {
            if let Some(value) = bound {
                range.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unbounded_is_empty_object() {
        let bounds = Bounds::new();
        assert!(bounds.is_unbounded());
        assert_eq!(bounds.to_value(), json!({}));
    }

    #[test]
    fn test_only_set_bounds_are_included() {
        let bounds = Bounds::new().gte(1).lt(10);
        assert!(!bounds.is_unbounded());
        assert_eq!(bounds.to_value(), json!({ "gte": 1, "lt": 10 }));
    }

    #[test]
    fn test_zero_is_a_bound() {
        let bounds = Bounds::new().gt(0);
        assert_eq!(bounds.to_value(), json!({ "gt": 0 }));
    }

    #[test]
    fn test_string_bounds() {
        let bounds = Bounds::new().gte("2015-01-01").lte("now");
        assert_eq!(bounds.to_value(), json!({ "gte": "2015-01-01", "lte": "now" }));
    }
}
