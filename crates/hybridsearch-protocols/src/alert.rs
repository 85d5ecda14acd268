//! Alert rule and alert definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
    /// Critical.
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "INFO"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Error => write!(f, "ERROR"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl AlertSeverity {
    /// Get color for Slack attachments.
    pub fn color(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "#36a64f",     // green
            AlertSeverity::Warning => "#f0ad4e",  // yellow
            AlertSeverity::Error => "#d9534f",    // red
            AlertSeverity::Critical => "#800000", // dark red
        }
    }
}

/// What a rule watches, used to filter alert history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    Performance,
    Error,
    Security,
}

/// Comparison applied between an observed metric and a rule threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
}

impl ComparisonOperator {
    /// Whether `value <op> threshold` holds.
    pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOperator::GreaterThan => value > threshold,
            ComparisonOperator::LessThan => value < threshold,
            ComparisonOperator::GreaterOrEqual => value >= threshold,
            ComparisonOperator::LessOrEqual => value <= threshold,
            ComparisonOperator::Equal => value == threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Equal => "==",
        }
    }
}

/// A threshold rule evaluated against aggregate search metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rule_type: RuleType,
    /// Name of a field in the performance metrics, e.g. `cacheHitRate`.
    pub metric: String,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub severity: AlertSeverity,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Channel names, dispatched in order.
    #[serde(default)]
    pub notification_channels: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl AlertRule {
    /// Create an enabled performance rule with warning severity and no channels.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        metric: impl Into<String>,
        operator: ComparisonOperator,
        threshold: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule_type: RuleType::Performance,
            metric: metric.into(),
            operator,
            threshold,
            severity: AlertSeverity::Warning,
            enabled: true,
            notification_channels: Vec::new(),
        }
    }

    pub fn with_severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_type(mut self, rule_type: RuleType) -> Self {
        self.rule_type = rule_type;
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notification_channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A fired alert. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub rule_id: String,
    #[serde(default)]
    pub rule_type: RuleType,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: AlertSeverity,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
}

impl Alert {
    /// Build the alert a rule produces for an observed value.
    pub fn from_rule(rule: &AlertRule, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}-{}", timestamp.timestamp_millis(), rule.id),
            rule_id: rule.id.clone(),
            rule_type: rule.rule_type,
            timestamp,
            message: format!(
                "{}: {} {} {} (current value: {})",
                rule.name,
                rule.metric,
                rule.operator.symbol(),
                rule.threshold,
                value
            ),
            severity: rule.severity,
            metric: rule.metric.clone(),
            value,
            threshold: rule.threshold,
        }
    }

    /// Format for plain-text output.
    pub fn format_text(&self) -> String {
        format!(
            "[{}] {} - {}",
            self.severity,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.message
        )
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
