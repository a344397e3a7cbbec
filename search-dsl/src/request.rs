//! Search request assembly.
//!
//! A `SearchRequest` holds at most one filter tree, one query placeholder,
//! named aggregations, paging and sort directives, and composes them into
//! one filtered-query request document:
//!
//! ```text
//! {
//!   "query": { "filtered": { "filter"?: ..., "query"?: ... } },
//!   "aggs"?: { "<name>": ... },
//!   "size"?: n,
//!   "from"?: n,
//!   "sort"?: [ { "<path>": { "order": "asc" | "desc" } } ]
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::aggregation::Aggregation;
use crate::config::SearchRequestConfig;
use crate::errors::DslError;
use crate::filter::{Filter, FilterTree};
use crate::interfaces::SearchExecutor;
use crate::property_path::{self, PropertyPath, Selector};
use search_dsl_shared::{SearchResponse, SortOrder};

/// Placeholder for the scoring query part of a filtered query.
///
/// Query composition belongs to integrators; a caller can supply a pre-built
/// body with [`Query::raw`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    body: Option<Value>,
}

impl Query {
    /// Use a pre-built query body.
    pub fn raw(&mut self, body: Value) -> &mut Self {
        self.body = Some(body);
        self
    }

    pub fn compose(&self) -> Result<Value, DslError> {
        self.body
            .clone()
            .ok_or_else(|| DslError::not_implemented("query composition"))
    }
}

#[derive(Debug, Clone)]
struct SortDirective {
    field: Result<PropertyPath, DslError>,
    order: SortOrder,
}

impl SortDirective {
    fn compose(&self) -> Result<Value, DslError> {
        let field = self.field.clone()?;
        let mut directive = Map::new();
        directive.insert(field.as_dotted(), json!({ "order": self.order.as_str() }));
        Ok(Value::Object(directive))
    }
}

/// Builder for one search request document.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    config: SearchRequestConfig,
    filter: Option<FilterTree>,
    query: Option<Query>,
    aggregations: BTreeMap<String, Aggregation>,
    size: i64,
    from: i64,
    sort: Vec<SortDirective>,
}

impl SearchRequest {
    /// Create an empty request with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty request with custom configuration.
    pub fn with_config(config: SearchRequestConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configure the request filter, creating it on first use.
    ///
    /// Repeated calls keep adding to the same filter tree.
    pub fn filter<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Filter<'_>),
    {
        let tree = self.filter.get_or_insert_with(FilterTree::new);
        configure(&mut tree.root());
        self
    }

    /// Like [`SearchRequest::filter`], for configuration that can fail (e.g.
    /// navigating with `back()`).
    pub fn try_filter<F>(&mut self, configure: F) -> Result<&mut Self, DslError>
    where
        F: FnOnce(&mut Filter<'_>) -> Result<(), DslError>,
    {
        let tree = self.filter.get_or_insert_with(FilterTree::new);
        configure(&mut tree.root())?;
        Ok(self)
    }

    /// Configure the query placeholder, creating it on first use.
    pub fn query<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Query),
    {
        configure(self.query.get_or_insert_with(Query::default));
        self
    }

    /// Configure the named top-level aggregation, creating it on first use.
    pub fn aggregate<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Aggregation),
    {
        let aggregation = self
            .aggregations
            .entry(name.to_string())
            .or_insert_with(|| Aggregation::new(name));
        configure(aggregation);
        self
    }

    /// Page size. Values of zero or below leave `size` out of the request.
    pub fn take(&mut self, amount: i64) -> &mut Self {
        self.size = amount;
        self
    }

    /// Page offset. Values of zero or below leave `from` out of the request.
    pub fn skip(&mut self, amount: i64) -> &mut Self {
        self.from = amount;
        self
    }

    /// Append a sort criterion, ascending when `ascending` is true.
    pub fn sort<P>(&mut self, property: P, ascending: bool) -> &mut Self
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.sort_by_order(property, SortOrder::from_ascending(ascending))
    }

    /// Append an ascending sort criterion.
    pub fn sort_by<P>(&mut self, property: P) -> &mut Self
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.sort_by_order(property, SortOrder::Asc)
    }

    /// Append a descending sort criterion.
    pub fn sort_by_desc<P>(&mut self, property: P) -> &mut Self
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.sort_by_order(property, SortOrder::Desc)
    }

    /// Append a sort criterion. Criteria apply in call order.
    pub fn sort_by_order<P>(&mut self, property: P, order: SortOrder) -> &mut Self
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.sort.push(SortDirective {
            field: property_path::resolve(property),
            order,
        });
        self
    }

    /// Compose the request document.
    ///
    /// Composition reads the current state only; calling it repeatedly
    /// without intervening changes yields identical documents.
    pub fn compose(&self) -> Result<Value, DslError> {
        let mut filtered = Map::new();
        if let Some(filter) = &self.filter {
            filtered.insert("filter".to_string(), filter.compose()?);
        }
        if let Some(query) = &self.query {
            filtered.insert("query".to_string(), query.compose()?);
        }

        let mut request = Map::new();
        request.insert("query".to_string(), json!({ "filtered": filtered }));

        if !self.aggregations.is_empty() {
            let mut aggs = Map::new();
            for (name, aggregation) in &self.aggregations {
                aggs.insert(name.clone(), aggregation.compose()?);
            }
            request.insert("aggs".to_string(), Value::Object(aggs));
        }

        if self.size > 0 {
            self.config.check_page_size(self.size)?;
            request.insert("size".to_string(), json!(self.size));
        }

        if self.from > 0 {
            request.insert("from".to_string(), json!(self.from));
        }

        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(SortDirective::compose)
                .collect::<Result<Vec<_>, _>>()?;
            request.insert("sort".to_string(), Value::Array(sort));
        }

        debug!(
            has_filter = self.filter.is_some(),
            has_query = self.query.is_some(),
            aggregations = self.aggregations.len(),
            sort = self.sort.len(),
            "Composed search request"
        );

        Ok(Value::Object(request))
    }

    /// Compose the request document and serialize it.
    pub fn to_json(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string(&self.compose()?)?)
    }

    /// Compose the request and run it through `executor`.
    pub async fn execute<E>(&self, executor: &E) -> Result<SearchResponse, DslError>
    where
        E: SearchExecutor + ?Sized,
    {
        let body = self.compose()?;
        debug!("Executing search request");
        executor.execute(&body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::filter::Bounds;
    use search_dsl_shared::SingleValueMetric;

    struct MockExecutor {
        bodies: Mutex<Vec<Value>>,
        response: Value,
    }

    impl MockExecutor {
        fn new(response: Value) -> Self {
            Self {
                bodies: Mutex::new(Vec::new()),
                response,
            }
        }
    }

    #[async_trait]
    impl SearchExecutor for MockExecutor {
        async fn execute(&self, body: &Value) -> Result<SearchResponse, DslError> {
            self.bodies.lock().unwrap().push(body.clone());
            serde_json::from_value(self.response.clone())
                .map_err(|e| DslError::execution(e.to_string()))
        }
    }

    #[test]
    fn test_empty_request() {
        let request = SearchRequest::new();
        assert_eq!(request.compose().unwrap(), json!({ "query": { "filtered": {} } }));
    }

    #[test]
    fn test_filter_request() {
        let mut request = SearchRequest::new();
        request.filter(|f| {
            f.term(|x| x.select("user").select("name"), "ada");
        });

        assert_eq!(
            request.compose().unwrap(),
            json!({ "query": { "filtered": { "filter": { "term": { "user.name": "ada" } } } } })
        );
    }

    #[test]
    fn test_filter_is_created_once() {
        let mut request = SearchRequest::new();
        request.filter(|f| {
            f.term(|x| x.select("a"), 1);
        });
        request.filter(|f| {
            f.term(|x| x.select("b"), 2);
        });

        // Both configurations landed on the same single-child root.
        assert!(matches!(
            request.compose(),
            Err(DslError::CompositionArity { found: 2, .. })
        ));
    }

    #[test]
    fn test_try_filter_with_back() {
        let mut request = SearchRequest::new();
        request
            .try_filter(|f| {
                let mut bool_filter = f.bool();
                let mut must = bool_filter.must(|_| {});
                let mut root = must.term(|x| x.select("a"), 1).back()?;
                root.as_bool()
                    .ok_or(DslError::Navigation)?
                    .must_not(|m| {
                        m.exists(|x| x.select("b"));
                    });
                Ok(())
            })
            .unwrap();

        assert_eq!(
            request.compose().unwrap()["query"]["filtered"]["filter"],
            json!({ "bool": {
                "must": { "term": { "a": 1 } },
                "must_not": { "exists": { "field": "b" } }
            }})
        );
    }

    #[test]
    fn test_try_filter_propagates_navigation_error() {
        let mut request = SearchRequest::new();
        let result = request.try_filter(|f| {
            f.term(|x| x.select("a"), 1).back()?;
            Ok(())
        });

        assert!(matches!(result, Err(DslError::Navigation)));
    }

    #[test]
    fn test_query_placeholder() {
        let mut request = SearchRequest::new();
        request.query(|q| {
            q.raw(json!({ "match": { "title": "rust" } }));
        });

        assert_eq!(
            request.compose().unwrap(),
            json!({ "query": { "filtered": { "query": { "match": { "title": "rust" } } } } })
        );
    }

    #[test]
    fn test_query_without_body_is_not_implemented() {
        let mut request = SearchRequest::new();
        request.query(|_| {});

        assert!(matches!(request.compose(), Err(DslError::NotImplemented(_))));
    }

    #[test]
    fn test_paging() {
        let mut request = SearchRequest::new();
        request.take(10).skip(5);

        let composed = request.compose().unwrap();
        assert_eq!(composed["size"], 10);
        assert_eq!(composed["from"], 5);
    }

    #[test]
    fn test_unset_paging_is_omitted() {
        let mut request = SearchRequest::new();
        request.take(0).skip(-3);

        let composed = request.compose().unwrap();
        assert!(composed.get("size").is_none());
        assert!(composed.get("from").is_none());
    }

    #[test]
    fn test_page_size_limit() {
        let mut request = SearchRequest::with_config(SearchRequestConfig::with_max_page_size(50));
        request.take(51);

        assert!(matches!(
            request.compose(),
            Err(DslError::PageSizeExceeded {
                provided: 51,
                max: 50
            })
        ));
    }

    #[test]
    fn test_page_size_unlimited() {
        let mut request = SearchRequest::with_config(SearchRequestConfig::unlimited());
        request.take(1_000_000);

        assert_eq!(request.compose().unwrap()["size"], 1_000_000);
    }

    #[test]
    fn test_sort_in_call_order() {
        let mut request = SearchRequest::new();
        request
            .sort_by(|x| x.select("name"))
            .sort_by_desc(|x| x.select("age"));

        assert_eq!(
            request.compose().unwrap()["sort"],
            json!([{ "name": { "order": "asc" } }, { "age": { "order": "desc" } }])
        );
    }

    #[test]
    fn test_sort_with_ascending_flag() {
        let mut request = SearchRequest::new();
        request
            .sort(|x| x.select("score"), false)
            .sort(|x| x.select("id"), true);

        assert_eq!(
            request.compose().unwrap()["sort"],
            json!([{ "score": { "order": "desc" } }, { "id": { "order": "asc" } }])
        );
    }

    #[test]
    fn test_unresolved_sort_field_fails() {
        let mut request = SearchRequest::new();
        request.sort_by_order(|x| x.select(""), SortOrder::Asc);

        assert!(matches!(
            request.compose(),
            Err(DslError::UnresolvablePropertyPath(_))
        ));
    }

    #[test]
    fn test_aggregations() {
        let mut request = SearchRequest::new();
        request
            .aggregate("max_age", |a| {
                a.max(|x| x.select("age"));
            })
            .aggregate("adults", |a| {
                a.bucket_filter(|f| {
                    f.range(|x| x.select("age"), Bounds::new().gte(18));
                });
                a.sub_aggregate("avg_age").avg(|x| x.select("age"));
            });

        assert_eq!(
            request.compose().unwrap()["aggs"],
            json!({
                "max_age": { "max": { "field": "age" } },
                "adults": {
                    "filter": { "range": { "age": { "gte": 18 } } },
                    "aggs": { "avg_age": { "avg": { "field": "age" } } }
                }
            })
        );
    }

    #[test]
    fn test_aggregate_is_get_or_create() {
        let mut request = SearchRequest::new();
        request.aggregate("a", |a| {
            a.sub_aggregate("x").min(|x| x.select("n"));
        });
        request.aggregate("a", |a| {
            a.sub_aggregate("y").max(|x| x.select("n"));
        });

        assert_eq!(
            request.compose().unwrap()["aggs"]["a"]["aggs"],
            json!({
                "x": { "min": { "field": "n" } },
                "y": { "max": { "field": "n" } }
            })
        );
    }

    #[test]
    fn test_full_request() {
        let mut request = SearchRequest::new();
        request
            .filter(|f| {
                f.bool()
                    .must(|m| {
                        m.and(|a| {
                            a.term(|x| x.select("status"), "active");
                        })
                        .and(|a| {
                            a.lte(|x| x.select("age"), 65);
                        });
                    })
                    .must_not(|m| {
                        m.ids(["7"]);
                    });
            })
            .aggregate("age", |a| {
                a.stats(|x| x.select("age"));
            })
            .take(20)
            .skip(40)
            .sort_by_desc(|x| x.select("created_at"));

        assert_eq!(
            request.compose().unwrap(),
            json!({
                "query": { "filtered": { "filter": { "bool": {
                    "must": { "and": [
                        { "term": { "status": "active" } },
                        { "range": { "age": { "lte": 65 } } }
                    ]},
                    "must_not": { "values": ["7"] }
                }}}},
                "aggs": { "age": { "stats": { "field": "age" } } },
                "size": 20,
                "from": 40,
                "sort": [{ "created_at": { "order": "desc" } }]
            })
        );
    }

    #[test]
    fn test_compose_is_idempotent() {
        let mut request = SearchRequest::new();
        request
            .filter(|f| {
                f.or(|o| {
                    o.prefix(|x| x.select("name"), "A");
                })
                .or(|o| {
                    o.missing(|x| x.select("name"));
                });
            })
            .take(3)
            .sort_by(|x| x.select("name"));

        assert_eq!(request.compose().unwrap(), request.compose().unwrap());
    }

    #[test]
    fn test_to_json_round_trip() {
        let mut request = SearchRequest::new();
        request
            .filter(|f| {
                f.not().term(|x| x.select("flag"), false);
            })
            .aggregate("n", |a| {
                a.count(|x| x.select("id"));
            })
            .take(1);

        let parsed: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(parsed, request.compose().unwrap());
    }

    #[tokio::test]
    async fn test_execute_sends_composed_body() {
        let executor = MockExecutor::new(json!({
            "_shards": { "total": 1, "successful": 1, "failed": 0 },
            "hits": { "total": 0, "hits": [] },
            "aggregations": { "max_age": { "value": 64.0 } }
        }));

        let mut request = SearchRequest::new();
        let mut max_age = None;
        request.aggregate("max_age", |a| {
            max_age = Some(a.max(|x| x.select("age")));
        });

        let response = request.execute(&executor).await.unwrap();

        let sent = executor.bodies.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], request.compose().unwrap());

        let metric: SingleValueMetric = max_age.unwrap().read(&response).unwrap();
        assert_eq!(metric.value, Some(64.0));
    }

    #[tokio::test]
    async fn test_execute_does_not_send_invalid_request() {
        let executor = MockExecutor::new(json!({}));

        let mut request = SearchRequest::new();
        request.sort_by(|x| x);

        let result = request.execute(&executor).await;

        assert!(matches!(result, Err(DslError::UnresolvablePropertyPath(_))));
        assert!(executor.bodies.lock().unwrap().is_empty());
    }
}
