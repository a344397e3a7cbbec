//! Limits applied when a [`SearchRequest`](crate::SearchRequest) is composed.

use crate::errors::DslError;

/// Result window the engine serves unless an index raises it.
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequestConfig {
    /// Largest `size` a composed request may carry; `None` lifts the limit.
    pub max_page_size: Option<i64>,
}

impl Default for SearchRequestConfig {
    fn default() -> Self {
        Self {
            max_page_size: Some(DEFAULT_MAX_PAGE_SIZE),
        }
    }
}

impl SearchRequestConfig {
    /// No page size limit, for indices with a raised result window.
    pub fn unlimited() -> Self {
        Self {
            max_page_size: None,
        }
    }

    pub fn with_max_page_size(max_page_size: i64) -> Self {
        Self {
            max_page_size: Some(max_page_size),
        }
    }

    /// Reject a page size above the configured limit.
    pub fn check_page_size(&self, size: i64) -> Result<(), DslError> {
        match self.max_page_size {
            Some(max) if size > max => Err(DslError::page_size_exceeded(size, max)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        let config = SearchRequestConfig::default();

        assert!(config.check_page_size(DEFAULT_MAX_PAGE_SIZE).is_ok());
        assert!(matches!(
            config.check_page_size(DEFAULT_MAX_PAGE_SIZE + 1),
            Err(DslError::PageSizeExceeded {
                provided: 10_001,
                max: 10_000
            })
        ));
    }

    #[test]
    fn test_unlimited() {
        assert!(SearchRequestConfig::unlimited()
            .check_page_size(i64::MAX)
            .is_ok());
    }
}
