//! Search query definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, SearchError};

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Exact-match filters, keyed by field name.
///
/// A `BTreeMap` keeps keys unique and iteration order stable, which the
/// cache key and the backend request builders both rely on.
pub type Filters = BTreeMap<String, serde_json::Value>;

/// An immutable search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    query: String,
    #[serde(default)]
    filters: Filters,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default = "default_true")]
    use_cache: bool,
    #[serde(default = "default_true")]
    use_vector_search: bool,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl SearchQuery {
    /// Create a query with default paging (page 1, 10 results), caching and
    /// vector search enabled.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: Filters::new(),
            page: default_page(),
            limit: default_limit(),
            use_cache: true,
            use_vector_search: true,
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_vector_search(mut self, use_vector_search: bool) -> Self {
        self.use_vector_search = use_vector_search;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    pub fn use_vector_search(&self) -> bool {
        self.use_vector_search
    }

    /// Zero-based offset of the first item on the requested page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }

    /// Number of top-ranked candidates needed to fill the requested page.
    pub fn candidate_window(&self) -> u32 {
        self.page.saturating_mul(self.limit)
    }

    /// Check paging bounds and that there is something to search for.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query text is empty".to_string()));
        }
        if self.page < 1 {
            return Err(SearchError::InvalidQuery("page must be at least 1".to_string()));
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(SearchError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        Ok(())
    }

    /// Reject pages whose candidate window exceeds `max`.
    pub fn check_window(&self, max: u32) -> Result<(), SearchError> {
        let window = self.candidate_window();
        if window > max {
            return Err(SearchError::InvalidQuery(format!(
                "page {} with limit {} needs {} candidates, at most {} allowed",
                self.page, self.limit, window, max
            )));
        }
        Ok(())
    }

    /// Deterministic serialization of the whole query, used as the cache key.
    ///
    /// Struct fields serialize in declaration order and filters in key order,
    /// so two equal queries always produce the same key.
    pub fn cache_key(&self, prefix: &str) -> Result<String, CacheError> {
        Ok(format!("{}{}", prefix, serde_json::to_string(self)?))
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
