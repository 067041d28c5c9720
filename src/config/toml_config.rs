use crate::config::{LoggerSettings, DEFAULT_INDEX, DEFAULT_RETRY_DELAY_MS, DEFAULT_SERVICE, DEFAULT_TIMEOUT_SECS};
use crate::core::{ConfigProvider, Credentials};
use crate::utils::error::{LoggerError, Result};
use crate::utils::validation::{validate_index_name, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub elasticsearch: ElasticsearchConfig,
    pub logger: Option<LoggerSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    pub hosts: Vec<String>,
    pub timeout_seconds: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerSection {
    pub default_index: Option<String>,
    pub service: Option<String>,
}

impl TomlConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LoggerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LoggerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` placeholders from the environment; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LoggerError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.elasticsearch.hosts.is_empty() {
            return Err(LoggerError::MissingConfigError {
                field: "elasticsearch.hosts".to_string(),
            });
        }
        for host in &self.elasticsearch.hosts {
            validate_url("elasticsearch.hosts", host)?;
        }

        if let Some(timeout) = self.elasticsearch.timeout_seconds {
            validate_range("elasticsearch.timeout_seconds", timeout, 1, 3600)?;
        }

        if let Some(attempts) = self.elasticsearch.retry_attempts {
            validate_range("elasticsearch.retry_attempts", attempts, 0, 10)?;
        }

        if self.elasticsearch.username.is_some() && self.elasticsearch.password.is_none() {
            return Err(LoggerError::MissingConfigError {
                field: "elasticsearch.password".to_string(),
            });
        }

        // the prefix must form a valid index name once the log type is appended
        let prefix = self.default_index_name();
        if prefix.is_empty() {
            return Err(LoggerError::MissingConfigError {
                field: "logger.default_index".to_string(),
            });
        }
        validate_index_name(&format!("{}-common", prefix)).map_err(|e| {
            LoggerError::InvalidConfigValueError {
                field: "logger.default_index".to_string(),
                value: prefix.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(())
    }

    pub fn default_index_name(&self) -> &str {
        self.logger
            .as_ref()
            .and_then(|l| l.default_index.as_deref())
            .unwrap_or(DEFAULT_INDEX)
    }

    pub fn settings(&self) -> LoggerSettings {
        LoggerSettings {
            hosts: self.hosts(),
            default_index: self.default_index().to_string(),
            default_service: self.default_service().to_string(),
            timeout: self.timeout(),
            credentials: self.credentials(),
            retry_attempts: self.retry_attempts(),
            retry_delay: self.retry_delay(),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn hosts(&self) -> Vec<String> {
        self.elasticsearch.hosts.clone()
    }

    fn default_index(&self) -> &str {
        self.default_index_name()
    }

    fn default_service(&self) -> &str {
        self.logger
            .as_ref()
            .and_then(|l| l.service.as_deref())
            .unwrap_or(DEFAULT_SERVICE)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.elasticsearch
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    fn credentials(&self) -> Credentials {
        let es = &self.elasticsearch;
        if let Some(key) = &es.api_key {
            return Credentials::ApiKey(key.clone());
        }
        match (&es.username, &es.password) {
            (Some(username), Some(password)) => Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => Credentials::None,
        }
    }

    fn retry_attempts(&self) -> u32 {
        self.elasticsearch.retry_attempts.unwrap_or(0)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(
            self.elasticsearch
                .retry_delay_ms
                .unwrap_or(DEFAULT_RETRY_DELAY_MS),
        )
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[elasticsearch]
hosts = ["http://es1:9200", "http://es2:9200"]
timeout_seconds = 10
username = "elastic"
password = "changeme"
retry_attempts = 2

[logger]
default_index = "billing-logs"
service = "billing"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let settings = config.settings();
        assert_eq!(settings.hosts.len(), 2);
        assert_eq!(settings.default_index, "billing-logs");
        assert_eq!(settings.default_service, "billing");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.retry_attempts, 2);
        assert_eq!(settings.retry_delay, Duration::from_millis(500));
        assert_eq!(
            settings.credentials,
            Credentials::Basic {
                username: "elastic".to_string(),
                password: "changeme".to_string()
            }
        );
    }

    #[test]
    fn test_defaults_without_logger_section() {
        let config = TomlConfig::from_toml_str(
            r#"
[elasticsearch]
hosts = ["http://localhost:9200"]
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.default_index(), "mh-logs");
        assert_eq!(config.default_service(), "app");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.credentials(), Credentials::None);
    }

    #[test]
    fn test_api_key_wins_over_basic_auth() {
        let config = TomlConfig::from_toml_str(
            r#"
[elasticsearch]
hosts = ["http://localhost:9200"]
username = "elastic"
password = "changeme"
api_key = "abc=="
"#,
        )
        .unwrap();

        assert_eq!(config.credentials(), Credentials::ApiKey("abc==".to_string()));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ELK_LOGGER_TEST_PASSWORD", "s3cret");

        let config = TomlConfig::from_toml_str(
            r#"
[elasticsearch]
hosts = ["http://localhost:9200"]
username = "elastic"
password = "${ELK_LOGGER_TEST_PASSWORD}"
api_key = "${ELK_LOGGER_TEST_UNDEFINED}"
"#,
        )
        .unwrap();

        assert_eq!(config.elasticsearch.password.as_deref(), Some("s3cret"));
        assert_eq!(
            config.elasticsearch.api_key.as_deref(),
            Some("${ELK_LOGGER_TEST_UNDEFINED}")
        );

        std::env::remove_var("ELK_LOGGER_TEST_PASSWORD");
    }

    #[test]
    fn test_config_validation() {
        let bad_host = TomlConfig::from_toml_str(
            r#"
[elasticsearch]
hosts = ["localhost"]
"#,
        )
        .unwrap();
        assert!(bad_host.validate().is_err());

        let no_password = TomlConfig::from_toml_str(
            r#"
[elasticsearch]
hosts = ["http://localhost:9200"]
username = "elastic"
"#,
        )
        .unwrap();
        assert!(matches!(
            no_password.validate(),
            Err(LoggerError::MissingConfigError { .. })
        ));

        let bad_index = TomlConfig::from_toml_str(
            r#"
[elasticsearch]
hosts = ["http://localhost:9200"]

[logger]
default_index = "My Logs"
"#,
        )
        .unwrap();
        assert!(matches!(
            bad_index.validate(),
            Err(LoggerError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = TomlConfig::from_toml_str("[elasticsearch\nhosts = 1");
        assert!(matches!(
            result,
            Err(LoggerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[elasticsearch]\nhosts = [\"http://localhost:9200\"]\n\n[logger]\ndefault_index = \"file-logs\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.default_index(), "file-logs");
    }
}
