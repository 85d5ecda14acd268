//! Periodic alert rule evaluation.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hybridsearch_config::AlertsConfig;
use hybridsearch_protocols::{Alert, AlertRule, AlertSeverity, RuleType};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channels::{AlertChannel, EmailChannel, LogChannel, SlackChannel};
use crate::metrics::MetricsRecorder;
use crate::rules::default_rules;

/// Selection over alert history. Time bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub severity: Option<AlertSeverity>,
    pub rule_type: Option<RuleType>,
}

impl AlertFilter {
    fn matches(&self, alert: &Alert) -> bool {
        self.start_time.is_none_or(|start| alert.timestamp >= start)
            && self.end_time.is_none_or(|end| alert.timestamp <= end)
            && self.severity.is_none_or(|s| alert.severity == s)
            && self.rule_type.is_none_or(|t| alert.rule_type == t)
    }
}

struct EngineInner {
    metrics: Arc<MetricsRecorder>,
    rules: RwLock<Vec<AlertRule>>,
    history: Mutex<VecDeque<Alert>>,
    channels: RwLock<HashMap<String, Arc<dyn AlertChannel>>>,
    max_history: usize,
}

/// Evaluates alert rules against [`MetricsRecorder`] on a fixed interval.
///
/// The background task is owned by the engine: [`start`](Self::start) spawns
/// it and [`stop`](Self::stop) cancels it and waits for it to finish.
pub struct AlertEngine {
    inner: Arc<EngineInner>,
    check_interval: Duration,
    task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl AlertEngine {
    /// Create an engine with only the `log` channel and no rules.
    pub fn new(metrics: Arc<MetricsRecorder>, check_interval: Duration, max_history: usize) -> Self {
        let mut channels: HashMap<String, Arc<dyn AlertChannel>> = HashMap::new();
        channels.insert("log".to_string(), Arc::new(LogChannel));

        Self {
            inner: Arc::new(EngineInner {
                metrics,
                rules: RwLock::new(Vec::new()),
                history: Mutex::new(VecDeque::new()),
                channels: RwLock::new(channels),
                max_history: max_history.max(1),
            }),
            check_interval,
            task: Mutex::new(None),
        }
    }

    /// Create from config: channels for every configured sink, default
    /// rules unless disabled, then configured rules.
    pub fn from_config(metrics: Arc<MetricsRecorder>, config: &AlertsConfig) -> Self {
        let engine = Self::new(
            metrics,
            Duration::from_secs(config.check_interval_secs),
            config.max_history,
        );

        if let Some(ref slack) = config.slack {
            if !slack.webhook_url.is_empty() {
                info!("Adding Slack alert channel");
                engine.add_channel(Arc::new(SlackChannel::new(slack.clone())));
            }
        }

        if let Some(ref email) = config.email {
            info!("Adding Email alert channel");
            engine.add_channel(Arc::new(EmailChannel::new(email.clone())));
        }

        if config.default_rules {
            for rule in default_rules() {
                engine.add_rule(rule);
            }
        }
        for rule in &config.rules {
            engine.add_rule(rule.clone());
        }

        engine
    }

    /// Register a channel, replacing any channel with the same name.
    pub fn add_channel(&self, channel: Arc<dyn AlertChannel>) {
        self.inner
            .channels
            .write()
            .insert(channel.name().to_string(), channel);
    }

    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.channels.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Insert a rule, or replace the rule with the same id in place.
    /// Duplicate channel names are collapsed keeping first occurrence.
    pub fn add_rule(&self, mut rule: AlertRule) {
        let mut seen = Vec::with_capacity(rule.notification_channels.len());
        rule.notification_channels.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(c.clone());
                true
            }
        });

        let mut rules = self.inner.rules.write();
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    /// Remove a rule. Returns whether it existed.
    pub fn remove_rule(&self, id: &str) -> bool {
        let mut rules = self.inner.rules.write();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        rules.len() != before
    }

    /// Enable or disable a rule. Returns whether it existed.
    pub fn toggle_rule(&self, id: &str, enabled: bool) -> bool {
        match self.inner.rules.write().iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn get_rules(&self) -> Vec<AlertRule> {
        self.inner.rules.read().clone()
    }

    /// Alerts in history matching `filter`, oldest first.
    pub fn get_alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.inner
            .history
            .lock()
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    /// Evaluate every enabled rule once and dispatch triggered alerts.
    pub async fn check_now(&self) -> Vec<Alert> {
        self.inner.check().await
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Spawn the evaluation loop. First evaluation happens one interval
    /// after start. Calling `start` on a running engine does nothing.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            warn!("Alert engine already running");
            return;
        }

        let token = CancellationToken::new();
        let inner = Arc::clone(&self.inner);
        let period = self.check_interval;
        let cancel = token.clone();

        let handle = tokio::spawn(async move {
            info!("Starting alert loop (interval: {:?})", period);
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Alert loop shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        inner.metrics.maybe_sweep(Utc::now());
                        inner.check().await;
                    }
                }
            }
        });

        *task = Some((token, handle));
    }

    /// Cancel the evaluation loop and wait for it to exit.
    pub async fn stop(&self) {
        let running = self.task.lock().take();
        if let Some((token, handle)) = running {
            token.cancel();
            if let Err(e) = handle.await {
                error!("Alert loop terminated abnormally: {}", e);
            }
        }
    }
}

impl EngineInner {
    async fn check(&self) -> Vec<Alert> {
        let metrics = self.metrics.get_performance_metrics();
        let rules = self.rules.read().clone();
        let now = Utc::now();

        let mut fired = Vec::new();
        for rule in rules.iter().filter(|r| r.enabled) {
            let Some(value) = metrics.get(&rule.metric) else {
                debug!(rule = %rule.id, metric = %rule.metric, "Metric not available, skipping rule");
                continue;
            };
            if rule.operator.evaluate(value, rule.threshold) {
                fired.push((Alert::from_rule(rule, value, now), rule.notification_channels.clone()));
            }
        }

        {
            let mut history = self.history.lock();
            for (alert, _) in &fired {
                history.push_back(alert.clone());
            }
            while history.len() > self.max_history {
                history.pop_front();
            }
        }

        for (alert, channel_names) in &fired {
            self.dispatch(alert, channel_names).await;
        }

        fired.into_iter().map(|(alert, _)| alert).collect()
    }

    async fn dispatch(&self, alert: &Alert, channel_names: &[String]) {
        for name in channel_names {
            let channel = self.channels.read().get(name).cloned();
            match channel {
                Some(channel) => {
                    if let Err(e) = channel.send(alert).await {
                        error!("Failed to send alert via {}: {}", name, e);
                    }
                }
                None => warn!(channel = %name, rule = %alert.rule_id, "Unknown notification channel"),
            }
        }
    }
}

impl Drop for AlertEngine {
    fn drop(&mut self) {
        if let Some((token, _)) = self.task.get_mut().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
