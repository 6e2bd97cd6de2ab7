use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Global switch for balance alerts and summaries
    ///
    /// Env: AM_ENABLE_NOTIFICATIONS
    /// Default: true
    pub enabled: bool,

    /// Minimum absolute change, in whole token units, that triggers an alert
    ///
    /// Env: AM_MIN_BALANCE_CHANGE
    /// Default: 0.0001
    pub min_balance_change: f64,

    /// Discord-compatible webhook. Alerts are only logged when unset.
    ///
    /// Env: AM_WEBHOOK_URL
    /// Valid schemes: http://, https://
    pub webhook_url: Option<String>,
}

pub(crate) fn default_enabled() -> bool {
    true
}

pub(crate) fn default_min_balance_change() -> f64 {
    0.0001
}

impl NotifyConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_balance_change.is_finite() || self.min_balance_change < 0.0 {
            return Err(ConfigError::ValidateError(format!(
                "Minimum balance change must be a non-negative number, got {}",
                self.min_balance_change
            )));
        }

        if let Some(url_str) = &self.webhook_url {
            let parsed = url::Url::parse(url_str).map_err(|e| {
                ConfigError::ValidateError(format!("Invalid webhook URL '{}': {}", url_str, e))
            })?;

            match parsed.scheme() {
                "http" | "https" => {}
                scheme => {
                    return Err(ConfigError::ValidateError(format!(
                        "Invalid webhook URL scheme '{}'. Must be http:// or https://",
                        scheme
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_balance_change: default_min_balance_change(),
            webhook_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_notify_config() {
        let config = NotifyConfig::default();
        assert!(config.enabled);
        assert_eq!(config.min_balance_change, 0.0001);
        assert!(config.webhook_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = NotifyConfig {
            min_balance_change: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = NotifyConfig {
            min_balance_change: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_webhook() {
        let config = NotifyConfig {
            webhook_url: Some("https://discord.com/api/webhooks/1/abc".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_webhook_scheme() {
        let config = NotifyConfig {
            webhook_url: Some("ws://discord.com/api/webhooks/1/abc".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_webhook_format() {
        let config = NotifyConfig {
            webhook_url: Some("not-a-url".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
