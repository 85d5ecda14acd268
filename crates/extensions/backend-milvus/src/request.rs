//! Search request construction.

use hybridsearch_config::VectorConfig;
use hybridsearch_protocols::Filters;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest<'a> {
    pub collection_name: &'a str,
    pub data: Vec<&'a [f32]>,
    pub anns_field: &'a str,
    pub limit: u32,
    pub offset: u32,
    pub search_params: Value,
    pub output_fields: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl<'a> SearchRequest<'a> {
    pub fn new(config: &'a VectorConfig, vector: &'a [f32], filters: &Filters, page: u32, limit: u32) -> Self {
        Self {
            collection_name: &config.collection,
            data: vec![vector],
            anns_field: &config.anns_field,
            limit: limit.saturating_mul(config.candidate_multiplier),
            offset: page.saturating_sub(1).saturating_mul(limit),
            search_params: json!({
                "metricType": config.metric_type,
                "params": { "nprobe": config.nprobe, "ef": config.ef }
            }),
            output_fields: &config.output_fields,
            filter: filter_expression(filters),
        }
    }
}

/// Boolean expression equivalent of exact-match filters, clauses joined with
/// `and`. Arrays become `in` clauses; null and object values are skipped.
pub fn filter_expression(filters: &Filters) -> Option<String> {
    let clauses: Vec<String> = filters
        .iter()
        .filter_map(|(field, value)| match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                Some(format!("{} == {}", field, value))
            }
            Value::Array(_) => Some(format!("{} in {}", field, value)),
            Value::Null | Value::Object(_) => {
                debug!(field = %field, "Skipping filter value without vector-store equivalent");
                None
            }
        })
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expression() {
        let mut filters = Filters::new();
        filters.insert("lang".to_string(), json!("en"));
        filters.insert("year".to_string(), json!(2024));
        filters.insert("tags".to_string(), json!(["a", "b"]));
        filters.insert("meta".to_string(), json!({"x": 1}));

        assert_eq!(
            filter_expression(&filters).unwrap(),
            r#"lang == "en" and tags in ["a","b"] and year == 2024"#
        );
    }

    #[test]
    fn test_filter_expression_escapes_quotes() {
        let mut filters = Filters::new();
        filters.insert("title".to_string(), json!("say \"hi\""));
        assert_eq!(filter_expression(&filters).unwrap(), r#"title == "say \"hi\"""#);
    }

    #[test]
    fn test_empty_filters() {
        assert_eq!(filter_expression(&Filters::new()), None);
    }

    #[test]
    fn test_request_body() {
        let config = VectorConfig::default();
        let vector = [0.1f32, 0.2];
        let request = SearchRequest::new(&config, &vector, &Filters::new(), 2, 10);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["collectionName"], "knowledge");
        assert_eq!(body["annsField"], "embedding");
        assert_eq!(body["limit"], 20);
        assert_eq!(body["offset"], 10);
        assert_eq!(body["searchParams"]["metricType"], "COSINE");
        assert_eq!(body["searchParams"]["params"]["nprobe"], 16);
        assert_eq!(body["searchParams"]["params"]["ef"], 64);
        assert_eq!(body["outputFields"], json!(["id"]));
        assert!(body.get("filter").is_none());
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }
}
