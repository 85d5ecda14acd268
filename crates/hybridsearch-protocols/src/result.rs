//! Scored items and search results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Highlight fragments per field, in the order the backend returned them.
pub type Highlights = BTreeMap<String, Vec<String>>;

/// One ranked record returned by a backend or by fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    /// Record identifier; equal ids from different backends are the same entity.
    pub id: String,

    /// Backend-relative score. `None` when the backend gives no comparable score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub highlights: Highlights,

    /// Stored document fields, when the backend returns them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
}

impl ScoredItem {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score: Some(score),
            highlights: Highlights::new(),
            source: None,
        }
    }

    /// An item whose backend supplied only a rank position.
    pub fn unscored(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score: None,
            highlights: Highlights::new(),
            source: None,
        }
    }

    pub fn with_highlight(mut self, field: impl Into<String>, fragments: Vec<String>) -> Self {
        self.highlights.insert(field.into(), fragments);
        self
    }

    pub fn with_source(mut self, source: serde_json::Value) -> Self {
        self.source = Some(source);
        self
    }
}

/// Raw output of a single backend call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendHits {
    pub items: Vec<ScoredItem>,
    pub total: u64,
    pub took_millis: u64,
}

/// A ranked page of results returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<ScoredItem>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub took_millis: u64,
    /// Set when one backend failed and the page came from the other.
    #[serde(default)]
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_item_builder() {
        let item = ScoredItem::new("a", 0.5)
            .with_highlight("title", vec!["<em>dragon</em>".to_string()])
            .with_source(serde_json::json!({"title": "dragon"}));
        assert_eq!(item.score, Some(0.5));
        assert_eq!(item.highlights["title"].len(), 1);
        assert!(item.source.is_some());
    }

    #[test]
    fn test_unscored_item_skips_score_field() {
        let json = serde_json::to_string(&ScoredItem::unscored("a")).unwrap();
        assert_eq!(json, r#"{"id":"a"}"#);
    }

    #[test]
    fn test_search_result_serialization() {
        let result = SearchResult {
            items: vec![ScoredItem::new("a", 1.0)],
            total: 1,
            page: 1,
            limit: 10,
            took_millis: 12,
            degraded: false,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("tookMillis"));
        let back: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
