use crate::presentation::config::LoggingSettings;

const DEFAULT_FILTER: &str = "info,compliance_agent=debug,tower_http=debug";

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub default_filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TracingConfig {
    /// `LOG_FORMAT=json` still wins over the settings file.
    pub fn from_settings(environment: &str, logging: &LoggingSettings) -> Self {
        let defaults = Self::default();
        Self {
            environment: environment.to_string(),
            json_format: defaults.json_format || logging.json_format,
            default_filter: logging
                .filter
                .clone()
                .unwrap_or(defaults.default_filter),
        }
    }
}
