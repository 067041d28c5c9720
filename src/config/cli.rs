use crate::config::toml_config::TomlConfig;
use crate::config::LoggerSettings;
use crate::core::{Credentials, LogRecord, LogType};
use crate::utils::error::{LoggerError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use clap::Parser;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "elk-logger")]
#[command(about = "Ship a structured log entry to Elasticsearch")]
pub struct CliConfig {
    /// Log message
    pub message: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Elasticsearch hosts, comma separated (overrides the config file)
    #[arg(long, value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Index prefix; entries go to <prefix>-<log type>
    #[arg(long)]
    pub default_index: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub retry_attempts: Option<u32>,

    #[arg(long, default_value = "INFO")]
    pub level: String,

    #[arg(long)]
    pub service: Option<String>,

    /// common, process, or any custom type name
    #[arg(long, default_value = "common")]
    pub log_type: String,

    #[arg(long)]
    pub logger: Option<String>,

    #[arg(long)]
    pub environment: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub method: Option<String>,

    #[arg(long)]
    pub action: Option<String>,

    #[arg(long)]
    pub expected_value: Option<String>,

    #[arg(long)]
    pub actual_value: Option<String>,

    #[arg(long)]
    pub result: Option<String>,

    /// Extra field as key=value; the value is parsed as JSON when possible
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Write to this index instead of the default one
    #[arg(long)]
    pub index: Option<String>,

    /// Print the document and target index without sending it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit diagnostics as JSON lines")]
    pub json_logs: bool,
}

/// Parses `key=value`. `count=3` yields a number, `name=bob` a string.
pub fn parse_field(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| LoggerError::InvalidConfigValueError {
            field: "field".to_string(),
            value: raw.to_string(),
            reason: "expected key=value".to_string(),
        })?;

    let key = key.trim();
    validate_non_empty_string("field", key)?;

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl CliConfig {
    /// Settings from the config file (or defaults), then command line overrides.
    pub fn resolve_settings(&self) -> Result<LoggerSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let config = TomlConfig::from_file(path)?;
                config.validate()?;
                config.settings()
            }
            None => LoggerSettings::default(),
        };

        if !self.hosts.is_empty() {
            settings.hosts = self.hosts.clone();
        }
        if let Some(index) = &self.default_index {
            settings.default_index = index.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout = Duration::from_secs(timeout);
        }
        if let Some(attempts) = self.retry_attempts {
            settings.retry_attempts = attempts;
        }
        if let Some(key) = &self.api_key {
            settings.credentials = Credentials::ApiKey(key.clone());
        } else if let Some(username) = &self.username {
            settings.credentials = Credentials::Basic {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default(),
            };
        }

        Ok(settings)
    }

    pub fn to_record(&self) -> Result<LogRecord> {
        let mut record = LogRecord::new(self.message.clone())
            .level(self.level.clone())
            .log_type(LogType::from(self.log_type.as_str()));

        record.service = self.service.clone();
        record.logger = self.logger.clone();
        record.environment = self.environment.clone();
        record.model = self.model.clone();
        record.method = self.method.clone();
        record.action = self.action.clone();
        record.expected_value = self.expected_value.clone();
        record.actual_value = self.actual_value.clone();
        record.result = self.result.clone();
        record.index = self.index.clone();

        for raw in &self.fields {
            let (key, value) = parse_field(raw)?;
            record.additional_fields.insert(key, value);
        }

        Ok(record)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("message", &self.message)?;
        validate_non_empty_string("log_type", &self.log_type)?;

        for host in &self.hosts {
            validate_url("hosts", host)?;
        }

        if let Some(timeout) = self.timeout {
            validate_range("timeout", timeout, 1, 3600)?;
        }

        if self.username.is_some() && self.password.is_none() && self.api_key.is_none() {
            return Err(LoggerError::MissingConfigError {
                field: "password".to_string(),
            });
        }

        for raw in &self.fields {
            parse_field(raw)?;
        }

        Ok(())
    }
}
