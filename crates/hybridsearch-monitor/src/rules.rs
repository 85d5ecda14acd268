//! Built-in alert rules.

use hybridsearch_protocols::{AlertRule, AlertSeverity, ComparisonOperator, RuleType};

/// Rules installed unless disabled in configuration.
pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new(
            "slow-query",
            "Slow query alert",
            "averageQueryTime",
            ComparisonOperator::GreaterThan,
            1000.0,
        )
        .with_channels(["log", "email"]),
        AlertRule::new(
            "low-cache-hit",
            "Low cache hit rate",
            "cacheHitRate",
            ComparisonOperator::LessThan,
            0.5,
        )
        .with_channels(["log"]),
        AlertRule::new(
            "high-error-rate",
            "High error rate",
            "errorRate",
            ComparisonOperator::GreaterThan,
            0.05,
        )
        .with_type(RuleType::Error)
        .with_severity(AlertSeverity::Error)
        .with_channels(["log", "email", "slack"]),
    ]
}
