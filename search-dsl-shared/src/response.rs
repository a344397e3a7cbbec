//! Search result read contract.
//!
//! These types mirror the response body returned by the search engine for a
//! filtered query. Aggregation results are kept as raw JSON keyed by the
//! aggregation name; typed metric handles deserialize them on demand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shard statistics reported with every search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shards {
    /// Shards the request was sent to.
    pub total: u64,
    /// Shards that answered successfully.
    pub successful: u64,
    /// Shards that failed.
    pub failed: u64,
}

/// A single matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: T,
}

/// The hits section of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits<T> {
    /// Total number of matching documents.
    pub total: u64,
    /// The returned page of documents.
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

impl<T> Default for Hits<T> {
    fn default() -> Self {
        Self {
            total: 0,
            hits: Vec::new(),
        }
    }
}

/// A complete search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse<T = Value> {
    #[serde(rename = "_shards", default)]
    pub shards: Shards,
    #[serde(default)]
    pub hits: Hits<T>,
    /// Aggregation results keyed by aggregation name.
    #[serde(default)]
    pub aggregations: Map<String, Value>,
}

impl<T> SearchResponse<T> {
    /// Look up the raw result of a named aggregation.
    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.get(name)
    }
}
