use crate::utils::error::{LoggerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const MAX_INDEX_NAME_BYTES: usize = 255;
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' ', ':'];

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LoggerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Elasticsearch index and data stream naming rules.
pub fn validate_index_name(index: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(LoggerError::InvalidIndexError {
            index: index.to_string(),
            reason: reason.to_string(),
        })
    };

    if index.is_empty() {
        return invalid("index name cannot be empty");
    }
    if index == "." || index == ".." {
        return invalid("index name cannot be '.' or '..'");
    }
    if index.len() > MAX_INDEX_NAME_BYTES {
        return invalid("index name cannot be longer than 255 bytes");
    }
    if index.starts_with(['-', '_', '+']) {
        return invalid("index name cannot start with '-', '_' or '+'");
    }
    if index.chars().any(|c| c.is_uppercase()) {
        return invalid("index name must be lowercase");
    }
    if let Some(c) = index.chars().find(|c| FORBIDDEN_INDEX_CHARS.contains(c)) {
        return Err(LoggerError::InvalidIndexError {
            index: index.to_string(),
            reason: format!("index name cannot contain '{}'", c),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LoggerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
