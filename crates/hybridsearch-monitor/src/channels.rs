//! Alert notification channels (log, Slack, email).

use async_trait::async_trait;
use hybridsearch_config::{EmailConfig, SlackConfig};
use hybridsearch_protocols::{Alert, AlertSeverity};
use tracing::{debug, error, info, warn};

use crate::error::MonitorError;

/// Alert channel trait.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Channel name, as referenced by rules.
    fn name(&self) -> &str;

    /// Send an alert.
    async fn send(&self, alert: &Alert) -> Result<(), MonitorError>;
}

/// Log channel (writes to tracing).
pub struct LogChannel;

#[async_trait]
impl AlertChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        match alert.severity {
            AlertSeverity::Info => info!(rule = %alert.rule_id, "[ALERT] {}", alert.message),
            AlertSeverity::Warning => warn!(rule = %alert.rule_id, "[ALERT] {}", alert.message),
            AlertSeverity::Error | AlertSeverity::Critical => {
                error!(rule = %alert.rule_id, "[ALERT] {}", alert.message)
            }
        }
        Ok(())
    }
}

/// Slack incoming webhook channel.
pub struct SlackChannel {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackChannel {
    pub fn new(config: SlackConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlertChannel for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        let mut payload = serde_json::json!({
            "username": self.config.username,
            "attachments": [{
                "color": alert.severity.color(),
                "title": format!("[{}] {}", alert.severity, alert.rule_id),
                "text": alert.message,
                "ts": alert.timestamp.timestamp(),
                "fields": [
                    { "title": "metric", "value": alert.metric, "short": true },
                    { "title": "value", "value": alert.value.to_string(), "short": true },
                    { "title": "threshold", "value": alert.threshold.to_string(), "short": true }
                ]
            }]
        });
        if let Some(ref channel) = self.config.channel {
            payload["channel"] = serde_json::Value::String(channel.clone());
        }

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::AlertDelivery(format!("Slack request failed: {}", e)))?;

        if response.status().is_success() {
            debug!("Slack alert sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(MonitorError::AlertDelivery(format!(
                "Slack webhook returned {}: {}",
                status, body
            )))
        }
    }
}

/// Email channel.
///
/// Renders the message and logs it; no SMTP transport is wired in.
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Subject line for an alert.
    pub fn subject(alert: &Alert) -> String {
        format!("[{}] Search alert: {}", alert.severity, alert.rule_id)
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        if self.config.to.is_empty() {
            return Err(MonitorError::ChannelNotConfigured(
                "email channel has no recipients".to_string(),
            ));
        }

        info!(
            smtp = %format!("{}:{}", self.config.smtp_host, self.config.smtp_port),
            to = ?self.config.to,
            "Email alert '{}' rendered",
            alert.rule_id
        );
        debug!(
            "Email alert details:\n\
             From: {}\n\
             To: {:?}\n\
             Subject: {}\n\
             Body: {}",
            self.config.from,
            self.config.to,
            Self::subject(alert),
            alert.format_text()
        );

        Ok(())
    }
}

#[cfg(test)]
#[path = "channels_tests.rs"]
mod tests;
