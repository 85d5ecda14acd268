//! Subcommand handlers.

use std::path::Path;

use anyhow::Context;
use hybridsearch_config::{Config, ConfigLoader, ConfigValidator};
use hybridsearch_protocols::{Filters, SearchQuery};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::services::Services;

/// Load and validate the configuration. Warnings are logged, the first
/// error aborts.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = ConfigLoader::load_or_default(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let warnings = ConfigValidator::validate(&config).into_result()?;
    for w in warnings {
        warn!("config {}: {}", w.path, w.message);
    }
    Ok(config)
}

/// Run one query and print the result.
pub(crate) async fn search(
    config_path: &Path,
    query: SearchQuery,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let services = Services::build(&config)?;

    let result = services.orchestrator.search(&query).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Build a query from command-line arguments.
pub(crate) fn build_query(
    query: String,
    page: u32,
    limit: u32,
    filters: Vec<(String, serde_json::Value)>,
    no_cache: bool,
    no_vector: bool,
) -> SearchQuery {
    SearchQuery::new(query)
        .with_page(page)
        .with_limit(limit)
        .with_filters(filters.into_iter().collect::<Filters>())
        .with_cache(!no_cache)
        .with_vector_search(!no_vector)
}

/// Serve queries from stdin until EOF or Ctrl-C, with the cache sweeper and
/// alert loop running.
pub(crate) async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let services = Services::build(&config)?;

    services.start_background();
    info!(
        "HybridSearch v{} ready, reading queries from stdin",
        env!("CARGO_PKG_VERSION")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else { break };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match services.orchestrator.search(&SearchQuery::new(text)).await {
            Ok(result) => println!("{}", serde_json::to_string(&result)?),
            Err(e) => error!("query '{}' failed: {}", text, e),
        }
    }

    services.shutdown().await;
    let metrics = services.orchestrator.metrics();
    let perf = metrics.get_performance_metrics();
    info!(
        "Served {} queries, avg {:.1} ms, cache hit rate {:.2}",
        perf.total_queries, perf.average_query_time, perf.cache_hit_rate
    );
    let popular = metrics.get_popular_queries(config.monitoring.popular_queries_limit);
    let summary = serde_json::json!({
        "metrics": perf,
        "popularQueries": popular,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the effective alert rules.
pub(crate) fn rules(config_path: &Path, format: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let services = Services::build(&config)?;
    let rules = services.alerts.get_rules();

    if format != "table" {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    if rules.is_empty() {
        println!("No alert rules configured.");
        return Ok(());
    }
    println!(
        "{:<20} {:<28} {:<10} {:<8} {}",
        "ID", "CONDITION", "SEVERITY", "ENABLED", "CHANNELS"
    );
    println!("{}", "-".repeat(80));
    for rule in rules {
        let condition = format!(
            "{} {} {}",
            rule.metric,
            rule.operator.symbol(),
            rule.threshold
        );
        println!(
            "{:<20} {:<28} {:<10} {:<8} {}",
            rule.id,
            condition,
            rule.severity.to_string(),
            rule.enabled,
            rule.notification_channels.join(",")
        );
    }
    Ok(())
}

/// Validate the configuration and report every finding.
pub(crate) fn check_config(config_path: &Path) -> anyhow::Result<()> {
    let config = ConfigLoader::load_or_default(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let result = ConfigValidator::validate(&config);

    for w in &result.warnings {
        println!("warning: {}: {}", w.path, w.message);
    }
    for e in &result.errors {
        println!("error: {}: {}", e.path, e.message);
    }

    if result.is_valid() {
        println!("{}: ok", config_path.display());
        Ok(())
    } else {
        anyhow::bail!("{} error(s) in {}", result.errors.len(), config_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_build_query() {
        let query = build_query(
            "hello".to_string(),
            2,
            20,
            vec![("lang".to_string(), json!("en"))],
            true,
            false,
        );
        assert_eq!(query.query(), "hello");
        assert_eq!(query.page(), 2);
        assert_eq!(query.limit(), 20);
        assert_eq!(query.filters().get("lang"), Some(&json!("en")));
        assert!(!query.use_cache());
        assert!(query.use_vector_search());
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/hybridsearch.toml")).unwrap();
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/hybridsearch.toml"));
        let config = load_config(path).unwrap();
        assert_eq!(config.embedding.allowed_ranges, vec![[0x4E00, 0x9FA5]]);
        assert_eq!(config.keyword.field_boosts.len(), 3);
        assert!(check_config(path).is_ok());
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nresult_ttl_secs = 0").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_check_config_reports_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hybrid]\ntext_weight = 0.0\nvector_weight = 0.0").unwrap();
        assert!(check_config(file.path()).is_err());
    }

    #[test]
    fn test_services_build_keyword_only() {
        let config = ConfigLoader::load_str("[vector]\nenabled = false").unwrap();
        let services = Services::build(&config).unwrap();
        assert!(!services.orchestrator.has_vector_backend());
        assert_eq!(services.alerts.get_rules().len(), 3);
    }

    #[tokio::test]
    async fn test_services_background_lifecycle() {
        let config = ConfigLoader::load_str("[vector]\nenabled = false\n[alerts]\nenabled = false").unwrap();
        let services = Services::build(&config).unwrap();

        services.start_background();
        assert!(services.cache.is_sweeping());
        assert!(!services.alerts.is_running());

        services.shutdown().await;
        assert!(!services.cache.is_sweeping());
    }
}
