//! Configuration validation.

use hybridsearch_protocols::MAX_LIMIT;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_cache(config, &mut result);
        Self::validate_hybrid(config, &mut result);
        Self::validate_embedding(config, &mut result);
        Self::validate_backends(config, &mut result);
        Self::validate_monitoring(config, &mut result);
        Self::validate_alerts(config, &mut result);

        result
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        if config.cache.result_ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "cache.result_ttl_secs",
                "result_ttl_secs must be greater than 0",
            ));
        }

        if config.cache.vector_ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "cache.vector_ttl_secs",
                "vector_ttl_secs must be greater than 0",
            ));
        }

        if config.cache.purge_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "cache.purge_interval_secs",
                "purge_interval_secs must be greater than 0",
            ));
        }

        if config.cache.key_prefix.is_empty() {
            result.add_warning(ValidationWarning::new(
                "cache.key_prefix",
                "Empty key prefix, invalidation patterns will match every key",
            ));
        }
    }

    fn validate_hybrid(config: &Config, result: &mut ValidationResult) {
        let hybrid = &config.hybrid;

        for (path, weight) in [
            ("hybrid.text_weight", hybrid.text_weight),
            ("hybrid.vector_weight", hybrid.vector_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                result.add_error(ValidationError::new(
                    path,
                    "Weight must be a non-negative number",
                ));
            }
        }

        if hybrid.text_weight == 0.0 && hybrid.vector_weight == 0.0 {
            result.add_error(ValidationError::new(
                "hybrid",
                "text_weight and vector_weight cannot both be 0",
            ));
        } else if (hybrid.text_weight + hybrid.vector_weight - 1.0).abs() > 1e-6 {
            result.add_warning(ValidationWarning::new(
                "hybrid",
                "Weights do not sum to 1, fused scores will not be normalized",
            ));
        }

        if hybrid.backend_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "hybrid.backend_timeout_secs",
                "backend_timeout_secs must be greater than 0",
            ));
        }

        if hybrid.max_candidate_window < MAX_LIMIT {
            result.add_error(ValidationError::new(
                "hybrid.max_candidate_window",
                format!("max_candidate_window must be at least {}", MAX_LIMIT),
            ));
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;

        if embedding.endpoint.is_empty() {
            result.add_error(ValidationError::new(
                "embedding.endpoint",
                "Endpoint cannot be empty",
            ));
        } else if !is_http_url(&embedding.endpoint) {
            result.add_error(ValidationError::new(
                "embedding.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if embedding.max_length == 0 {
            result.add_error(ValidationError::new(
                "embedding.max_length",
                "max_length must be greater than 0",
            ));
        }

        if embedding.batch_size == 0 {
            result.add_error(ValidationError::new(
                "embedding.batch_size",
                "batch_size must be greater than 0",
            ));
        }

        if embedding.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "embedding.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        for (i, [start, end]) in embedding.allowed_ranges.iter().enumerate() {
            if start > end || char::from_u32(*end).is_none() {
                result.add_error(ValidationError::new(
                    format!("embedding.allowed_ranges[{}]", i),
                    format!("Invalid code point range {:#X}..={:#X}", start, end),
                ));
            }
        }
    }

    fn validate_backends(config: &Config, result: &mut ValidationResult) {
        if config.keyword.base_url.is_empty() || !is_http_url(&config.keyword.base_url) {
            result.add_error(ValidationError::new(
                "keyword.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.keyword.index.is_empty() {
            result.add_error(ValidationError::new("keyword.index", "Index cannot be empty"));
        }

        if config.keyword.field_boosts.is_empty() {
            result.add_error(ValidationError::new(
                "keyword.field_boosts",
                "At least one searched field is required",
            ));
        }

        if config.keyword.password.is_some() && config.keyword.username.is_none() {
            result.add_warning(ValidationWarning::new(
                "keyword.username",
                "Password set without username, basic auth will not be used",
            ));
        }

        if !config.vector.enabled {
            return;
        }

        if !is_http_url(&config.vector.base_url) {
            result.add_error(ValidationError::new(
                "vector.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.vector.collection.is_empty() {
            result.add_error(ValidationError::new(
                "vector.collection",
                "Collection cannot be empty",
            ));
        }

        let valid_metrics = ["COSINE", "IP", "L2"];
        if !valid_metrics.contains(&config.vector.metric_type.as_str()) {
            result.add_error(ValidationError::new(
                "vector.metric_type",
                format!(
                    "Unknown metric type '{}', valid values: {:?}",
                    config.vector.metric_type, valid_metrics
                ),
            ));
        }

        if config.vector.candidate_multiplier == 0 {
            result.add_error(ValidationError::new(
                "vector.candidate_multiplier",
                "candidate_multiplier must be greater than 0",
            ));
        }
    }

    fn validate_monitoring(config: &Config, result: &mut ValidationResult) {
        let monitoring = &config.monitoring;

        if monitoring.slow_query_threshold_ms == 0 {
            result.add_error(ValidationError::new(
                "monitoring.slow_query_threshold_ms",
                "slow_query_threshold_ms must be greater than 0",
            ));
        }

        if monitoring.max_query_stats == 0 {
            result.add_error(ValidationError::new(
                "monitoring.max_query_stats",
                "max_query_stats must be greater than 0",
            ));
        }

        if monitoring.cleanup_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "monitoring.cleanup_interval_secs",
                "cleanup_interval_secs must be greater than 0",
            ));
        }

        if monitoring.retention_secs < monitoring.cleanup_interval_secs {
            result.add_warning(ValidationWarning::new(
                "monitoring.retention_secs",
                "Retention is shorter than the cleanup interval",
            ));
        }
    }

    fn validate_alerts(config: &Config, result: &mut ValidationResult) {
        let alerts = &config.alerts;

        if alerts.check_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "alerts.check_interval_secs",
                "check_interval_secs must be greater than 0",
            ));
        }

        if alerts.max_history == 0 {
            result.add_error(ValidationError::new(
                "alerts.max_history",
                "max_history must be greater than 0",
            ));
        }

        let known_channels = ["log", "slack", "email"];
        for rule in &alerts.rules {
            if rule.id.is_empty() {
                result.add_error(ValidationError::new("alerts.rules", "Rule id cannot be empty"));
            }

            if !rule.threshold.is_finite() {
                result.add_error(ValidationError::new(
                    format!("alerts.rules.{}.threshold", rule.id),
                    "Threshold must be a finite number",
                ));
            }

            for channel in &rule.notification_channels {
                if !known_channels.contains(&channel.as_str()) {
                    result.add_warning(ValidationWarning::new(
                        format!("alerts.rules.{}.notificationChannels", rule.id),
                        format!("Unknown notification channel '{}'", channel),
                    ));
                }
            }
        }

        if alerts.slack.as_ref().is_some_and(|s| !is_http_url(&s.webhook_url)) {
            result.add_error(ValidationError::new(
                "alerts.slack.webhook_url",
                "webhook_url must start with http:// or https://",
            ));
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
