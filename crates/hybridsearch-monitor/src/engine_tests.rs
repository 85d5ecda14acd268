use super::*;
use async_trait::async_trait;
use hybridsearch_config::EmailConfig;
use hybridsearch_protocols::ComparisonOperator;

use crate::error::MonitorError;
use crate::stats::QueryStat;

struct RecordingChannel {
    name: &'static str,
    sent: Mutex<Vec<Alert>>,
}

impl RecordingChannel {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        self.sent.lock().push(alert.clone());
        Ok(())
    }
}

struct FailingChannel;

#[async_trait]
impl AlertChannel for FailingChannel {
    fn name(&self) -> &str {
        "broken"
    }

    async fn send(&self, _alert: &Alert) -> Result<(), MonitorError> {
        Err(MonitorError::AlertDelivery("unreachable".to_string()))
    }
}

/// Recorder whose cache hit rate is 0.3.
fn low_hit_rate_metrics() -> Arc<MetricsRecorder> {
    let metrics = Arc::new(MetricsRecorder::default());
    for _ in 0..3 {
        metrics.record_cache_hit(1);
    }
    for _ in 0..7 {
        metrics.record_cache_miss();
    }
    metrics
}

fn low_hit_rule() -> AlertRule {
    AlertRule::new(
        "low-cache-hit",
        "Low cache hit rate",
        "cacheHitRate",
        ComparisonOperator::LessThan,
        0.5,
    )
    .with_channels(["test"])
}

fn engine(metrics: Arc<MetricsRecorder>) -> AlertEngine {
    AlertEngine::new(metrics, Duration::from_secs(60), 1000)
}

#[tokio::test]
async fn test_rule_fires_with_rule_severity() {
    let engine = engine(low_hit_rate_metrics());
    let channel = RecordingChannel::new("test");
    engine.add_channel(channel.clone());
    engine.add_rule(low_hit_rule().with_severity(AlertSeverity::Critical));

    let alerts = engine.check_now().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(alerts[0].rule_id, "low-cache-hit");
    assert!((alerts[0].value - 0.3).abs() < 1e-9);
    assert_eq!(channel.count(), 1);
    assert_eq!(engine.get_alerts(&AlertFilter::default()).len(), 1);
}

#[tokio::test]
async fn test_rule_not_triggered() {
    let metrics = Arc::new(MetricsRecorder::default());
    metrics.record_cache_hit(1);
    let engine = engine(metrics);
    engine.add_rule(low_hit_rule());

    assert!(engine.check_now().await.is_empty());
}

#[tokio::test]
async fn test_disabled_rule_skipped() {
    let engine = engine(low_hit_rate_metrics());
    engine.add_rule(low_hit_rule().disabled());
    assert!(engine.check_now().await.is_empty());

    assert!(engine.toggle_rule("low-cache-hit", true));
    assert_eq!(engine.check_now().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_metric_skipped() {
    let engine = engine(low_hit_rate_metrics());
    engine.add_rule(AlertRule::new(
        "disk",
        "Disk usage",
        "diskUsage",
        ComparisonOperator::GreaterThan,
        0.0,
    ));
    assert!(engine.check_now().await.is_empty());
}

#[tokio::test]
async fn test_unknown_and_failing_channels_do_not_abort_dispatch() {
    let engine = engine(low_hit_rate_metrics());
    let channel = RecordingChannel::new("test");
    engine.add_channel(channel.clone());
    engine.add_channel(Arc::new(FailingChannel));
    engine.add_rule(low_hit_rule().with_channels(["pager", "broken", "test"]));

    let alerts = engine.check_now().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(channel.count(), 1);
}

#[test]
fn test_add_rule_upserts_by_id() {
    let engine = engine(Arc::new(MetricsRecorder::default()));
    engine.add_rule(low_hit_rule());
    engine.add_rule(AlertRule::new("other", "Other", "totalQueries", ComparisonOperator::Equal, 0.0));
    engine.add_rule(low_hit_rule().with_severity(AlertSeverity::Error));

    let rules = engine.get_rules();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].id, "low-cache-hit");
    assert_eq!(rules[0].severity, AlertSeverity::Error);
}

#[test]
fn test_add_rule_dedupes_channels() {
    let engine = engine(Arc::new(MetricsRecorder::default()));
    engine.add_rule(low_hit_rule().with_channels(["log", "slack", "log"]));
    assert_eq!(engine.get_rules()[0].notification_channels, vec!["log", "slack"]);
}

#[test]
fn test_remove_and_toggle_unknown_rule() {
    let engine = engine(Arc::new(MetricsRecorder::default()));
    engine.add_rule(low_hit_rule());

    assert!(!engine.remove_rule("missing"));
    assert!(!engine.toggle_rule("missing", false));
    assert_eq!(engine.get_rules().len(), 1);

    assert!(engine.remove_rule("low-cache-hit"));
    assert!(engine.get_rules().is_empty());
}

#[tokio::test]
async fn test_history_is_bounded() {
    let engine = AlertEngine::new(low_hit_rate_metrics(), Duration::from_secs(60), 2);
    engine.add_rule(low_hit_rule());
    for _ in 0..5 {
        engine.check_now().await;
    }
    assert_eq!(engine.get_alerts(&AlertFilter::default()).len(), 2);
}

#[tokio::test]
async fn test_get_alerts_filters() {
    let metrics = low_hit_rate_metrics();
    metrics.record_query_stats(QueryStat::new("q", 10, false, 1));
    metrics.record_error();
    let engine = engine(metrics);
    engine.add_rule(low_hit_rule());
    engine.add_rule(
        AlertRule::new("errors", "Errors", "errorRate", ComparisonOperator::GreaterThan, 0.05)
            .with_type(RuleType::Error)
            .with_severity(AlertSeverity::Error),
    );

    let before = Utc::now();
    assert_eq!(engine.check_now().await.len(), 2);

    let errors = engine.get_alerts(&AlertFilter {
        rule_type: Some(RuleType::Error),
        ..Default::default()
    });
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule_id, "errors");

    let warnings = engine.get_alerts(&AlertFilter {
        severity: Some(AlertSeverity::Warning),
        ..Default::default()
    });
    assert_eq!(warnings.len(), 1);

    let future = engine.get_alerts(&AlertFilter {
        start_time: Some(before + chrono::Duration::hours(1)),
        ..Default::default()
    });
    assert!(future.is_empty());
}

#[test]
fn test_from_config_installs_defaults_and_channels() {
    let config = AlertsConfig {
        email: Some(EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            from: "alerts@example.com".to_string(),
            to: vec!["oncall@example.com".to_string()],
        }),
        rules: vec![low_hit_rule().with_severity(AlertSeverity::Critical)],
        ..Default::default()
    };
    let engine = AlertEngine::from_config(Arc::new(MetricsRecorder::default()), &config);

    let rules = engine.get_rules();
    assert_eq!(rules.len(), 3);
    let low_hit = rules.iter().find(|r| r.id == "low-cache-hit").unwrap();
    assert_eq!(low_hit.severity, AlertSeverity::Critical);
    assert_eq!(engine.channel_names(), vec!["email", "log"]);
}

#[test]
fn test_from_config_without_defaults() {
    let config = AlertsConfig {
        default_rules: false,
        ..Default::default()
    };
    let engine = AlertEngine::from_config(Arc::new(MetricsRecorder::default()), &config);
    assert!(engine.get_rules().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loop_evaluates_on_interval_and_stops() {
    let engine = engine(low_hit_rate_metrics());
    let channel = RecordingChannel::new("test");
    engine.add_channel(channel.clone());
    engine.add_rule(low_hit_rule());

    engine.start();
    assert!(engine.is_running());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(channel.count(), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(channel.count(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(channel.count(), 2);

    engine.stop().await;
    assert!(!engine.is_running());

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(channel.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_is_noop() {
    let engine = engine(Arc::new(MetricsRecorder::default()));
    engine.start();
    engine.start();
    assert!(engine.is_running());
    engine.stop().await;
    engine.stop().await;
    assert!(!engine.is_running());
}
