use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Elasticsearch returned {status}: {error_type}: {reason}")]
    ElasticsearchError {
        status: u16,
        error_type: String,
        reason: String,
    },

    #[error("No living Elasticsearch hosts: {message}")]
    NoLivingHostsError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid index name '{index}': {reason}")]
    InvalidIndexError { index: String, reason: String },

    #[error("Logger is closed")]
    ClosedError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Configuration,
    Data,
    Lifecycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LoggerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LoggerError::HttpError(_) | LoggerError::NoLivingHostsError { .. } => {
                ErrorCategory::Network
            }
            LoggerError::ElasticsearchError { .. } => ErrorCategory::Server,
            LoggerError::ConfigValidationError { .. }
            | LoggerError::InvalidConfigValueError { .. }
            | LoggerError::MissingConfigError { .. }
            | LoggerError::IoError(_) => ErrorCategory::Configuration,
            LoggerError::SerializationError(_) | LoggerError::InvalidIndexError { .. } => {
                ErrorCategory::Data
            }
            LoggerError::ClosedError => ErrorCategory::Lifecycle,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LoggerError::ElasticsearchError { .. } if self.is_retryable() => ErrorSeverity::Medium,
            LoggerError::NoLivingHostsError { .. } => ErrorSeverity::Medium,
            LoggerError::HttpError(_)
            | LoggerError::ElasticsearchError { .. }
            | LoggerError::SerializationError(_)
            | LoggerError::InvalidIndexError { .. } => ErrorSeverity::High,
            LoggerError::ClosedError => ErrorSeverity::Low,
            LoggerError::IoError(_)
            | LoggerError::ConfigValidationError { .. }
            | LoggerError::InvalidConfigValueError { .. }
            | LoggerError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Failures worth another attempt: unreachable cluster, throttling and gateway errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoggerError::NoLivingHostsError { .. } => true,
            LoggerError::ElasticsearchError { status, .. } => {
                matches!(status, 429 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LoggerError::HttpError(_) => {
                "Check the Elasticsearch URL and that the node accepts HTTP connections".to_string()
            }
            LoggerError::NoLivingHostsError { .. } => {
                "Make sure at least one configured host is running and reachable".to_string()
            }
            LoggerError::ElasticsearchError { status: 401, .. }
            | LoggerError::ElasticsearchError { status: 403, .. } => {
                "Check the username/password or API key and the role privileges".to_string()
            }
            LoggerError::ElasticsearchError { status: 429, .. } => {
                "The cluster is throttling writes, increase retry_attempts or slow down".to_string()
            }
            LoggerError::ElasticsearchError { .. } => {
                "Inspect the Elasticsearch error type and the index mapping".to_string()
            }
            LoggerError::IoError(_) => "Check that the file exists and is readable".to_string(),
            LoggerError::SerializationError(_) => {
                "Check that additional fields contain valid JSON values".to_string()
            }
            LoggerError::ConfigValidationError { field, .. }
            | LoggerError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration", field)
            }
            LoggerError::MissingConfigError { field } => {
                format!("Set '{}' in the configuration file or on the command line", field)
            }
            LoggerError::InvalidIndexError { .. } => {
                "Use a lowercase index name without spaces or special characters".to_string()
            }
            LoggerError::ClosedError => "Create a new logger instead of reusing a closed one".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach Elasticsearch: {}", self),
            ErrorCategory::Server => format!("Elasticsearch rejected the log entry: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Invalid log data: {}", self),
            ErrorCategory::Lifecycle => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn es_error(status: u16) -> LoggerError {
        LoggerError::ElasticsearchError {
            status,
            error_type: "some_exception".to_string(),
            reason: "boom".to_string(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(es_error(429).is_retryable());
        assert!(es_error(503).is_retryable());
        assert!(!es_error(400).is_retryable());
        assert!(!es_error(500).is_retryable());
        assert!(LoggerError::NoLivingHostsError {
            message: "down".to_string()
        }
        .is_retryable());
        assert!(!LoggerError::ClosedError.is_retryable());
    }

    #[test]
    fn test_severity_and_category() {
        assert_eq!(es_error(503).severity(), ErrorSeverity::Medium);
        assert_eq!(es_error(400).severity(), ErrorSeverity::High);
        assert_eq!(es_error(400).category(), ErrorCategory::Server);

        let missing = LoggerError::MissingConfigError {
            field: "logger.default_index".to_string(),
        };
        assert_eq!(missing.severity(), ErrorSeverity::Critical);
        assert_eq!(missing.category(), ErrorCategory::Configuration);
        assert!(missing.recovery_suggestion().contains("logger.default_index"));
    }

    #[test]
    fn test_display_includes_es_details() {
        let err = es_error(400);
        assert_eq!(
            err.to_string(),
            "Elasticsearch returned 400: some_exception: boom"
        );
        assert!(err.user_friendly_message().starts_with("Elasticsearch rejected"));
    }
}
