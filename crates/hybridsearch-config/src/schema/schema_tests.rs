use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.cache.result_ttl_secs, 3600);
    assert_eq!(config.cache.vector_ttl_secs, 86400);
    assert_eq!(config.cache.key_prefix, "search:");
    assert_eq!(config.cache.purge_interval_secs, 300);
    assert!(config.vector.enabled);
    assert!(config.alerts.rules.is_empty());
}

#[test]
fn test_hybrid_config_default() {
    let hybrid = HybridConfig::default();
    assert!((hybrid.text_weight - 0.6).abs() < f64::EPSILON);
    assert!((hybrid.vector_weight - 0.4).abs() < f64::EPSILON);
    assert!(hybrid.enable_parallel_search);
    assert_eq!(hybrid.max_candidate_window, 10_000);
}

#[test]
fn test_embedding_config_default() {
    let embedding = EmbeddingConfig::default();
    assert_eq!(embedding.endpoint, "http://localhost:8000/encode");
    assert_eq!(embedding.max_length, 512);
    assert_eq!(embedding.timeout_secs, 30);
    assert_eq!(embedding.max_retries, 3);
    assert_eq!(embedding.retry_delay_ms, 1000);
    assert_eq!(embedding.batch_size, 32);
    assert_eq!(embedding.allowed_ranges, vec![[0x4E00, 0x9FA5]]);
}

#[test]
fn test_keyword_config_default() {
    let keyword = KeywordConfig::default();
    assert_eq!(keyword.index, "knowledge");
    assert_eq!(keyword.field_boosts["title"], 2.0);
    assert_eq!(keyword.field_boosts["tags"], 1.5);
    assert_eq!(keyword.fuzziness, "AUTO");
    assert_eq!(keyword.max_expansions, 50);
    assert_eq!(keyword.highlight_fragments, 3);
    assert_eq!(keyword.highlight_fragment_size, 150);
}

#[test]
fn test_vector_config_default() {
    let vector = VectorConfig::default();
    assert_eq!(vector.metric_type, "COSINE");
    assert_eq!(vector.nprobe, 16);
    assert_eq!(vector.ef, 64);
    assert_eq!(vector.candidate_multiplier, 2);
}

#[test]
fn test_monitoring_config_default() {
    let monitoring = MonitoringConfig::default();
    assert!(monitoring.enabled);
    assert_eq!(monitoring.slow_query_threshold_ms, 1000);
    assert_eq!(monitoring.max_query_stats, 1000);
    assert_eq!(monitoring.cleanup_interval_secs, 3600);
    assert_eq!(monitoring.retention_secs, 86400);
}

#[test]
fn test_alerts_config_default() {
    let alerts = AlertsConfig::default();
    assert!(alerts.enabled);
    assert!(alerts.default_rules);
    assert_eq!(alerts.check_interval_secs, 60);
    assert_eq!(alerts.max_history, 1000);
    assert!(alerts.slack.is_none());
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = toml::from_str(
        r#"
        [cache]
        result_ttl_secs = 60
    "#,
    )
    .unwrap();
    assert_eq!(config.cache.result_ttl_secs, 60);
    assert_eq!(config.cache.vector_ttl_secs, 86400);
    assert!(config.cache.enabled);
}

#[test]
fn test_slack_config_username_default() {
    let config: Config = toml::from_str(
        r#"
        [alerts.slack]
        webhook_url = "https://hooks.slack.com/services/T/B/X"
    "#,
    )
    .unwrap();
    let slack = config.alerts.slack.unwrap();
    assert_eq!(slack.username, "hybridsearch");
    assert!(slack.channel.is_none());
}
