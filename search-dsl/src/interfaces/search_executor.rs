//! Search executor trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DslError;
use search_dsl_shared::SearchResponse;

/// Abstract hook that sends a composed request body to the search engine.
///
/// The default `execute` fails with `DslError::NotImplemented`, so a type that
/// implements the trait without overriding it behaves like an unconfigured
/// transport.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Execute a composed request body.
    ///
    /// # Arguments
    ///
    /// * `body` - The request document produced by `SearchRequest::compose`
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - The engine's response
    /// * `Err(DslError)` - If the request could not be executed
    async fn execute(&self, _body: &Value) -> Result<SearchResponse, DslError> {
        Err(DslError::not_implemented("execute"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct UnconfiguredExecutor;

    impl SearchExecutor for UnconfiguredExecutor {}

    #[tokio::test]
    async fn test_default_execute_is_not_implemented() {
        let result = UnconfiguredExecutor.execute(&json!({})).await;

        assert!(matches!(result, Err(DslError::NotImplemented(what)) if what == "execute"));
    }
}
