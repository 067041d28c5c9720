use crate::domain::model::{BulkResponse, IndexResponse, LogEntry};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    None,
    Basic { username: String, password: String },
    ApiKey(String),
}

pub trait ConfigProvider: Send + Sync {
    fn hosts(&self) -> Vec<String>;
    fn default_index(&self) -> &str;
    fn default_service(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn credentials(&self) -> Credentials;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
}

/// Where finished log documents go.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn index_document(&self, index: &str, document: &LogEntry) -> Result<IndexResponse>;
    async fn bulk_index(&self, documents: &[(String, LogEntry)]) -> Result<BulkResponse>;
}
