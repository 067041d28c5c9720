use crate::core::entry::build_entry;
use crate::core::transport::HttpTransport;
use crate::core::{BulkResponse, ConfigProvider, IndexResponse, LogEntry, LogRecord, LogSink};
use crate::utils::error::{LoggerError, Result};
use crate::utils::validation::validate_index_name;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Ships structured log records to Elasticsearch.
///
/// Records without an explicit index go to `{default_index}-{log_type}`, e.g.
/// `mh-logs-common` or `mh-logs-process`.
pub struct ElasticsearchLogger<S: LogSink = HttpTransport> {
    sink: S,
    default_index: String,
    default_service: String,
    closed: AtomicBool,
}

impl ElasticsearchLogger<HttpTransport> {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        tracing::debug!(
            "Elasticsearch logger using {} host(s), default index '{}'",
            transport.hosts().len(),
            config.default_index()
        );
        Ok(Self::with_sink(
            transport,
            config.default_index(),
            config.default_service(),
        ))
    }

    /// Synchronous variant of [`ElasticsearchLogger::log`].
    ///
    /// Uses a blocking HTTP client created on first call, so it must be called
    /// from a plain thread (or `spawn_blocking`), never from async code.
    pub fn log_blocking(&self, record: LogRecord) -> Result<IndexResponse> {
        let (index, entry) = self.prepare(&record)?;
        let response = self.sink.index_document_blocking(&index, &entry)?;
        tracing::debug!("Indexed log entry {} into {}", response.id, response.index);
        Ok(response)
    }
}

impl<S: LogSink> ElasticsearchLogger<S> {
    pub fn with_sink(sink: S, default_index: &str, default_service: &str) -> Self {
        Self {
            sink,
            default_index: default_index.to_string(),
            default_service: default_service.to_string(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn default_index(&self) -> &str {
        &self.default_index
    }

    /// Target index for `record`: its own non-empty override, else `{default_index}-{log_type}`.
    pub fn resolve_index(&self, record: &LogRecord) -> Result<String> {
        let index = match &record.index {
            Some(index) if !index.is_empty() => index.clone(),
            _ if self.default_index.is_empty() => {
                return Err(LoggerError::MissingConfigError {
                    field: "logger.default_index".to_string(),
                })
            }
            _ => format!("{}-{}", self.default_index, record.log_type),
        };

        validate_index_name(&index)?;
        Ok(index)
    }

    /// The document that `log` would send for `record`, without sending it.
    pub fn create_entry(&self, record: &LogRecord) -> LogEntry {
        build_entry(record, &self.default_service, Utc::now())
    }

    fn prepare(&self, record: &LogRecord) -> Result<(String, LogEntry)> {
        if self.is_closed() {
            return Err(LoggerError::ClosedError);
        }
        let index = self.resolve_index(record)?;
        Ok((index, self.create_entry(record)))
    }

    pub async fn log(&self, record: LogRecord) -> Result<IndexResponse> {
        let (index, entry) = self.prepare(&record)?;
        let response = self.sink.index_document(&index, &entry).await?;
        tracing::debug!("Indexed log entry {} into {}", response.id, response.index);
        Ok(response)
    }

    /// Sends all records in one bulk request. Per-document failures are
    /// reported in the response rather than as an error.
    pub async fn log_batch(&self, records: Vec<LogRecord>) -> Result<BulkResponse> {
        if self.is_closed() {
            return Err(LoggerError::ClosedError);
        }

        let mut documents = Vec::with_capacity(records.len());
        for record in &records {
            documents.push(self.prepare(record)?);
        }

        let response = self.sink.bulk_index(&documents).await?;
        let failed = response.failed_items();
        if !failed.is_empty() {
            tracing::warn!(
                "{} of {} log entries were rejected by Elasticsearch",
                failed.len(),
                documents.len()
            );
        }
        Ok(response)
    }

    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Elasticsearch logger closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BulkItem, BulkItemResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockSink {
        documents: Arc<Mutex<Vec<(String, LogEntry)>>>,
    }

    impl MockSink {
        async fn take(&self) -> Vec<(String, LogEntry)> {
            std::mem::take(&mut *self.documents.lock().await)
        }
    }

    #[async_trait]
    impl LogSink for MockSink {
        async fn index_document(&self, index: &str, document: &LogEntry) -> Result<IndexResponse> {
            let mut documents = self.documents.lock().await;
            documents.push((index.to_string(), document.clone()));
            Ok(IndexResponse {
                index: index.to_string(),
                id: documents.len().to_string(),
                version: Some(1),
                result: Some("created".to_string()),
                shards: None,
                seq_no: None,
                primary_term: None,
            })
        }

        async fn bulk_index(&self, documents: &[(String, LogEntry)]) -> Result<BulkResponse> {
            self.documents.lock().await.extend_from_slice(documents);
            Ok(BulkResponse {
                took: 1,
                errors: false,
                items: documents
                    .iter()
                    .map(|(index, _)| {
                        BulkItem::Index(BulkItemResult {
                            index: index.clone(),
                            id: None,
                            status: 201,
                            result: Some("created".to_string()),
                            error: None,
                        })
                    })
                    .collect(),
            })
        }
    }

    fn logger(sink: MockSink) -> ElasticsearchLogger<MockSink> {
        ElasticsearchLogger::with_sink(sink, "mh-logs", "app")
    }

    #[tokio::test]
    async fn test_log_uses_default_index_per_type() {
        let sink = MockSink::default();
        let logger = logger(sink.clone());

        logger.log(LogRecord::new("started").logger("main")).await.unwrap();
        logger
            .log(LogRecord::new("validated").process().model("m"))
            .await
            .unwrap();

        let documents = sink.take().await;
        assert_eq!(documents[0].0, "mh-logs-common");
        assert_eq!(documents[1].0, "mh-logs-process");
        assert_eq!(documents[1].1.get_str("model"), Some("m"));
    }

    #[tokio::test]
    async fn test_log_honours_index_override() {
        let sink = MockSink::default();
        let logger = logger(sink.clone());

        let response = logger
            .log(LogRecord::new("custom").index("audit-2024"))
            .await
            .unwrap();

        assert_eq!(response.index, "audit-2024");
        assert_eq!(sink.take().await[0].0, "audit-2024");
    }

    #[test]
    fn test_resolve_index_errors() {
        let logger = ElasticsearchLogger::with_sink(MockSink::default(), "", "app");
        assert!(matches!(
            logger.resolve_index(&LogRecord::new("x")),
            Err(LoggerError::MissingConfigError { .. })
        ));
        assert_eq!(
            logger.resolve_index(&LogRecord::new("x").index("explicit")).unwrap(),
            "explicit"
        );

        let logger = ElasticsearchLogger::with_sink(MockSink::default(), "mh-logs", "app");
        assert!(matches!(
            logger.resolve_index(&LogRecord::new("x").log_type("Bad Type")),
            Err(LoggerError::InvalidIndexError { .. })
        ));
    }

    #[test]
    fn test_empty_index_override_falls_back_to_default() {
        let logger = ElasticsearchLogger::with_sink(MockSink::default(), "mh-logs", "app");
        assert_eq!(
            logger.resolve_index(&LogRecord::new("x").index("")).unwrap(),
            "mh-logs-common"
        );
        assert_eq!(
            logger
                .resolve_index(&LogRecord::new("x").process().index(""))
                .unwrap(),
            "mh-logs-process"
        );

        let logger = ElasticsearchLogger::with_sink(MockSink::default(), "", "app");
        assert!(matches!(
            logger.resolve_index(&LogRecord::new("x").index("")),
            Err(LoggerError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_closed_logger_rejects_logs() {
        let sink = MockSink::default();
        let logger = logger(sink.clone());
        logger.close();
        logger.close();

        let result = tokio_test::block_on(logger.log(LogRecord::new("late")));
        assert!(matches!(result, Err(LoggerError::ClosedError)));
        assert!(tokio_test::block_on(sink.take()).is_empty());
    }

    #[tokio::test]
    async fn test_log_batch_prepares_every_record() {
        let sink = MockSink::default();
        let logger = logger(sink.clone());

        let response = logger
            .log_batch(vec![
                LogRecord::new("one"),
                LogRecord::new("two").process().expected_value("1").actual_value("1"),
            ])
            .await
            .unwrap();

        assert!(response.failed_items().is_empty());
        let documents = sink.take().await;
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].0, "mh-logs-process");
        assert_eq!(documents[1].1.get_str("result"), Some("success"));
    }

    #[tokio::test]
    async fn test_log_batch_rejects_whole_batch_on_bad_record() {
        let sink = MockSink::default();
        let logger = logger(sink.clone());

        let result = logger
            .log_batch(vec![LogRecord::new("ok"), LogRecord::new("bad").index("BAD")])
            .await;

        assert!(matches!(result, Err(LoggerError::InvalidIndexError { .. })));
        assert!(sink.take().await.is_empty());
    }
}
