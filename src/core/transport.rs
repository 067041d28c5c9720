use crate::core::{
    BulkResponse, ConfigProvider, Credentials, IndexResponse, LogEntry, LogSink,
};
use crate::utils::error::{LoggerError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

const JSON_CONTENT_TYPE: &str = "application/json";
const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Base URLs of the cluster nodes, handed out round-robin.
#[derive(Debug)]
pub struct HostPool {
    hosts: Vec<String>,
    next: AtomicUsize,
}

impl HostPool {
    pub fn new(hosts: Vec<String>) -> Result<Self> {
        if hosts.is_empty() {
            return Err(LoggerError::MissingConfigError {
                field: "elasticsearch.hosts".to_string(),
            });
        }

        let mut normalized = Vec::with_capacity(hosts.len());
        for host in hosts {
            validate_url("elasticsearch.hosts", &host)?;
            normalized.push(host.trim_end_matches('/').to_string());
        }

        Ok(Self {
            hosts: normalized,
            next: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Every host once, starting after the one the previous request started on.
    pub fn rotation(&self) -> impl Iterator<Item = &str> {
        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.hosts.len();
        self.hosts
            .iter()
            .cycle()
            .skip(start)
            .take(self.hosts.len())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct RequestBody {
    content_type: &'static str,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct EsRequest {
    method: Method,
    path: String,
    body: RequestBody,
}

impl EsRequest {
    fn url(&self, host: &str) -> String {
        format!("{}/{}", host, self.path.trim_start_matches('/'))
    }
}

fn index_request(index: &str, document: &LogEntry) -> Result<EsRequest> {
    Ok(EsRequest {
        method: Method::POST,
        path: format!("{}/_doc", index),
        body: RequestBody {
            content_type: JSON_CONTENT_TYPE,
            bytes: serde_json::to_vec(document)?,
        },
    })
}

/// `_bulk` body: an action line followed by the source line, each newline-terminated.
pub fn encode_bulk_body(documents: &[(String, LogEntry)]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for (index, document) in documents {
        let action = serde_json::json!({ "index": { "_index": index } });
        serde_json::to_writer(&mut body, &action)?;
        body.push(b'\n');
        serde_json::to_writer(&mut body, document)?;
        body.push(b'\n');
    }
    Ok(body)
}

fn bulk_request(documents: &[(String, LogEntry)]) -> Result<EsRequest> {
    Ok(EsRequest {
        method: Method::POST,
        path: "_bulk".to_string(),
        body: RequestBody {
            content_type: NDJSON_CONTENT_TYPE,
            bytes: encode_bulk_body(documents)?,
        },
    })
}

/// Turns a raw response into `T`, or into the error Elasticsearch reported.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body)?);
    }

    let (error_type, reason) = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => match value.get("error") {
            Some(serde_json::Value::Object(error)) => (
                error
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown_error")
                    .to_string(),
                error
                    .get("reason")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
            Some(serde_json::Value::String(text)) => ("error".to_string(), text.clone()),
            _ => ("http_error".to_string(), value.to_string()),
        },
        Err(_) => (
            "http_error".to_string(),
            String::from_utf8_lossy(body).into_owned(),
        ),
    };

    Err(LoggerError::ElasticsearchError {
        status: status.as_u16(),
        error_type,
        reason,
    })
}

/// Transport failures that mean "this node is not answering", as opposed to a bad request.
fn is_node_failure(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// A response that started arriving but never finished.
fn is_body_failure(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_body()
}

/// Applies [`Credentials`] to either flavour of reqwest request builder.
trait WithCredentials: Sized {
    fn basic(self, username: &str, password: &str) -> Self;
    fn authorization(self, value: String) -> Self;

    fn with_credentials(self, credentials: &Credentials) -> Self {
        match credentials {
            Credentials::None => self,
            Credentials::Basic { username, password } => self.basic(username, password),
            Credentials::ApiKey(key) => self.authorization(format!("ApiKey {}", key)),
        }
    }
}

impl WithCredentials for reqwest::RequestBuilder {
    fn basic(self, username: &str, password: &str) -> Self {
        self.basic_auth(username, Some(password))
    }

    fn authorization(self, value: String) -> Self {
        self.header(reqwest::header::AUTHORIZATION, value)
    }
}

impl WithCredentials for reqwest::blocking::RequestBuilder {
    fn basic(self, username: &str, password: &str) -> Self {
        self.basic_auth(username, Some(password))
    }

    fn authorization(self, value: String) -> Self {
        self.header(reqwest::header::AUTHORIZATION, value)
    }
}

fn no_living_hosts(tried: usize, last: Option<reqwest::Error>) -> LoggerError {
    LoggerError::NoLivingHostsError {
        message: match last {
            Some(e) => format!("{} host(s) failed, last error: {}", tried, e),
            None => format!("{} host(s) failed", tried),
        },
    }
}

/// HTTP access to an Elasticsearch cluster with failover, retries and authentication.
pub struct HttpTransport {
    pool: HostPool,
    client: reqwest::Client,
    blocking_client: OnceLock<reqwest::blocking::Client>,
    credentials: Credentials,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpTransport {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let pool = HostPool::new(config.hosts())?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            pool,
            client,
            blocking_client: OnceLock::new(),
            credentials: config.credentials(),
            timeout: config.timeout(),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        })
    }

    pub fn hosts(&self) -> &HostPool {
        &self.pool
    }

    async fn execute<T: DeserializeOwned>(&self, request: &EsRequest) -> Result<T> {
        let mut last_error = None;

        for attempt in 0..=self.retry_attempts {
            if attempt > 0 {
                tracing::debug!(
                    "Retrying {} {} (attempt {}/{}) after {:?}",
                    request.method,
                    request.path,
                    attempt,
                    self.retry_attempts,
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;
            }

            match self.send_once(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::warn!("Request to Elasticsearch failed: {}", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| no_living_hosts(self.pool.len(), None)))
    }

    async fn send_once<T: DeserializeOwned>(&self, request: &EsRequest) -> Result<T> {
        let mut last_failure = None;

        for host in self.pool.rotation() {
            let url = request.url(host);
            tracing::debug!("{} {}", request.method, url);

            let builder = self
                .client
                .request(request.method.clone(), &url)
                .header(reqwest::header::CONTENT_TYPE, request.body.content_type)
                .body(request.body.bytes.clone())
                .with_credentials(&self.credentials);

            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) if is_node_failure(&e) => {
                    tracing::warn!("Host {} unavailable: {}", host, e);
                    last_failure = Some(e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            tracing::debug!("Elasticsearch response status: {}", status);
            match response.bytes().await {
                Ok(body) => return decode_response(status, &body),
                Err(e) if is_body_failure(&e) => {
                    tracing::warn!("Host {} stalled while sending the response: {}", host, e);
                    last_failure = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(no_living_hosts(self.pool.len(), last_failure))
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.blocking_client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        Ok(self.blocking_client.get_or_init(|| client))
    }

    fn execute_blocking<T: DeserializeOwned>(&self, request: &EsRequest) -> Result<T> {
        let mut last_error = None;

        for attempt in 0..=self.retry_attempts {
            if attempt > 0 {
                tracing::debug!(
                    "Retrying {} {} (attempt {}/{}) after {:?}",
                    request.method,
                    request.path,
                    attempt,
                    self.retry_attempts,
                    self.retry_delay
                );
                std::thread::sleep(self.retry_delay);
            }

            match self.send_once_blocking(request) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::warn!("Request to Elasticsearch failed: {}", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| no_living_hosts(self.pool.len(), None)))
    }

    fn send_once_blocking<T: DeserializeOwned>(&self, request: &EsRequest) -> Result<T> {
        let client = self.blocking_client()?;
        let mut last_failure = None;

        for host in self.pool.rotation() {
            let url = request.url(host);
            tracing::debug!("{} {}", request.method, url);

            let builder = client
                .request(request.method.clone(), &url)
                .header(reqwest::header::CONTENT_TYPE, request.body.content_type)
                .body(request.body.bytes.clone())
                .with_credentials(&self.credentials);

            let response = match builder.send() {
                Ok(response) => response,
                Err(e) if is_node_failure(&e) => {
                    tracing::warn!("Host {} unavailable: {}", host, e);
                    last_failure = Some(e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            tracing::debug!("Elasticsearch response status: {}", status);
            match response.bytes() {
                Ok(body) => return decode_response(status, &body),
                Err(e) if is_body_failure(&e) => {
                    tracing::warn!("Host {} stalled while sending the response: {}", host, e);
                    last_failure = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(no_living_hosts(self.pool.len(), last_failure))
    }

    /// Blocking counterpart of [`LogSink::index_document`]. Must not run inside an async runtime.
    pub fn index_document_blocking(&self, index: &str, document: &LogEntry) -> Result<IndexResponse> {
        self.execute_blocking(&index_request(index, document)?)
    }
}

#[async_trait]
impl LogSink for HttpTransport {
    async fn index_document(&self, index: &str, document: &LogEntry) -> Result<IndexResponse> {
        self.execute(&index_request(index, document)?).await
    }

    async fn bulk_index(&self, documents: &[(String, LogEntry)]) -> Result<BulkResponse> {
        if documents.is_empty() {
            return Ok(BulkResponse::default());
        }
        self.execute(&bulk_request(documents)?).await
    }
}
