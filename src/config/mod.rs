#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, Credentials};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "mh-logs";
pub const DEFAULT_SERVICE: &str = "app";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Resolved connection and logger settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerSettings {
    pub hosts: Vec<String>,
    pub default_index: String,
    pub default_service: String,
    pub timeout: Duration,
    pub credentials: Credentials,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            hosts: vec![DEFAULT_HOST.to_string()],
            default_index: DEFAULT_INDEX.to_string(),
            default_service: DEFAULT_SERVICE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials: Credentials::None,
            retry_attempts: 0,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl LoggerSettings {
    pub fn with_hosts(mut self, hosts: Vec<String>) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn with_default_index(mut self, index: impl Into<String>) -> Self {
        self.default_index = index.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }
}

impl ConfigProvider for LoggerSettings {
    fn hosts(&self) -> Vec<String> {
        self.hosts.clone()
    }

    fn default_index(&self) -> &str {
        &self.default_index
    }

    fn default_service(&self) -> &str {
        &self.default_service
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn credentials(&self) -> Credentials {
        self.credentials.clone()
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}
