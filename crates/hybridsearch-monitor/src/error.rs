//! Monitor errors.

use thiserror::Error;

/// Monitor error types.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Alert delivery failed.
    #[error("Alert delivery failed: {0}")]
    AlertDelivery(String),

    /// Channel not configured.
    #[error("Alert channel not configured: {0}")]
    ChannelNotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::AlertDelivery("Slack webhook returned 500".to_string());
        assert_eq!(err.to_string(), "Alert delivery failed: Slack webhook returned 500");

        let err = MonitorError::ChannelNotConfigured("pager".to_string());
        assert!(err.to_string().contains("pager"));
    }
}
