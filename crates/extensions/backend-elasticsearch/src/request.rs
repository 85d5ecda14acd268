//! Search request body construction.

use hybridsearch_config::KeywordConfig;
use hybridsearch_protocols::Filters;
use serde_json::{json, Map, Value};

/// Build the `_search` body for one page of a query.
///
/// Filters become conjunctive `term` clauses in filter context so they do not
/// affect scoring.
pub fn build_search_body(
    config: &KeywordConfig,
    query: &str,
    filters: &Filters,
    page: u32,
    limit: u32,
) -> Value {
    let fields: Vec<String> = config
        .field_boosts
        .iter()
        .map(|(field, boost)| format!("{}^{}", field, boost))
        .collect();

    let terms: Vec<Value> = filters
        .iter()
        .map(|(field, value)| json!({ "term": { field: value } }))
        .collect();

    let highlight_fields: Map<String, Value> = config
        .field_boosts
        .keys()
        .map(|field| (field.clone(), json!({})))
        .collect();

    let from = u64::from(page.saturating_sub(1)) * u64::from(limit);

    json!({
        "query": {
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": query,
                        "fields": fields,
                        "fuzziness": config.fuzziness,
                        "max_expansions": config.max_expansions
                    }
                }],
                "filter": terms
            }
        },
        "from": from,
        "size": limit,
        "min_score": config.min_score,
        "highlight": {
            "fields": highlight_fields,
            "pre_tags": [config.highlight_pre_tag],
            "post_tags": [config.highlight_post_tag],
            "number_of_fragments": config.highlight_fragments,
            "fragment_size": config.highlight_fragment_size
        }
    })
}
