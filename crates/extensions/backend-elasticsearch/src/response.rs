//! Search response decoding.

use hybridsearch_protocols::{Highlights, ScoredItem};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is an object on current servers and a bare number on old ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) | TotalHits::Object { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub highlight: Highlights,
}

impl Hit {
    /// Record id: `_source.id` when it is a string, otherwise `_id`.
    fn record_id(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.id.clone())
    }
}

/// Convert hits to scored items, dropping hits below `min_score` and hits
/// without any identifier.
pub(crate) fn into_items(hits: Vec<Hit>, min_score: f64) -> Vec<ScoredItem> {
    hits.into_iter()
        .filter_map(|hit| {
            if hit.score.is_some_and(|s| s < min_score) {
                return None;
            }
            let Some(id) = hit.record_id() else {
                debug!("Skipping hit without identifier");
                return None;
            };
            Some(ScoredItem {
                id,
                score: hit.score,
                highlights: hit.highlight,
                source: hit.source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> SearchResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_total_object_and_number() {
        let modern = parse(json!({"hits": {"total": {"value": 7, "relation": "eq"}, "hits": []}}));
        assert_eq!(modern.hits.total.unwrap().value(), 7);

        let legacy = parse(json!({"hits": {"total": 9, "hits": []}}));
        assert_eq!(legacy.hits.total.unwrap().value(), 9);
    }

    #[test]
    fn test_record_id_prefers_source_id() {
        let response = parse(json!({"hits": {"hits": [
            {"_id": "es-1", "_score": 1.0, "_source": {"id": "doc-1"}},
            {"_id": "es-2", "_score": 1.0, "_source": {"id": 42}},
            {"_id": "es-3", "_score": 1.0}
        ]}}));

        let items = into_items(response.hits.hits, 0.1);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["doc-1", "es-2", "es-3"]);
    }

    #[test]
    fn test_min_score_and_highlights() {
        let response = parse(json!({"hits": {"hits": [
            {"_id": "a", "_score": 2.5, "highlight": {"title": ["<em>dragon</em> lore"]}},
            {"_id": "b", "_score": 0.05},
            {"_score": 3.0}
        ]}}));

        let items = into_items(response.hits.hits, 0.1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].score, Some(2.5));
        assert_eq!(items[0].highlights["title"], vec!["<em>dragon</em> lore"]);
    }
}
