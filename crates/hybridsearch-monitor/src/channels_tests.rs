use super::*;
use chrono::Utc;
use hybridsearch_protocols::{AlertRule, ComparisonOperator};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_alert() -> Alert {
    let rule = AlertRule::new(
        "low-cache-hit",
        "Low cache hit rate",
        "cacheHitRate",
        ComparisonOperator::LessThan,
        0.5,
    );
    Alert::from_rule(&rule, 0.3, Utc::now())
}

fn slack_config(url: String) -> SlackConfig {
    SlackConfig {
        webhook_url: url,
        channel: Some("#search-alerts".to_string()),
        username: "hybridsearch".to_string(),
    }
}

#[tokio::test]
async fn test_log_channel() {
    let channel = LogChannel;
    assert_eq!(channel.name(), "log");
    assert!(channel.send(&sample_alert()).await.is_ok());
}

#[tokio::test]
async fn test_slack_channel_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/alerts"))
        .and(body_partial_json(serde_json::json!({
            "channel": "#search-alerts",
            "username": "hybridsearch"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let channel = SlackChannel::new(slack_config(format!("{}/hooks/alerts", server.uri())));
    assert_eq!(channel.name(), "slack");
    channel.send(&sample_alert()).await.unwrap();
}

#[tokio::test]
async fn test_slack_channel_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let channel = SlackChannel::new(slack_config(server.uri()));
    let err = channel.send(&sample_alert()).await.unwrap_err();
    assert!(matches!(err, MonitorError::AlertDelivery(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_email_channel_placeholder() {
    let channel = EmailChannel::new(EmailConfig {
        smtp_host: "smtp.example.com".to_string(),
        smtp_port: 587,
        from: "alerts@example.com".to_string(),
        to: vec!["oncall@example.com".to_string()],
    });
    assert_eq!(channel.name(), "email");
    assert!(channel.send(&sample_alert()).await.is_ok());
}

#[tokio::test]
async fn test_email_channel_without_recipients() {
    let channel = EmailChannel::new(EmailConfig {
        smtp_host: "smtp.example.com".to_string(),
        smtp_port: 587,
        from: "alerts@example.com".to_string(),
        to: Vec::new(),
    });
    let err = channel.send(&sample_alert()).await.unwrap_err();
    assert!(matches!(err, MonitorError::ChannelNotConfigured(_)));
}

#[test]
fn test_email_subject() {
    let subject = EmailChannel::subject(&sample_alert());
    assert_eq!(subject, "[WARNING] Search alert: low-cache-hit");
}
