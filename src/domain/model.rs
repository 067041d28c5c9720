use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogType {
    #[default]
    Common,
    Process,
    Custom(String),
}

impl LogType {
    pub fn as_str(&self) -> &str {
        match self {
            LogType::Common => "common",
            LogType::Process => "process",
            LogType::Custom(name) => name,
        }
    }
}

impl From<&str> for LogType {
    fn from(value: &str) -> Self {
        match value {
            "common" => LogType::Common,
            "process" => LogType::Process,
            other => LogType::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log event as the caller describes it, before it becomes a document.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub message: String,
    pub level: String,
    pub service: Option<String>,
    pub log_type: LogType,
    // common logs
    pub logger: Option<String>,
    pub environment: Option<String>,
    // process logs
    pub model: Option<String>,
    pub method: Option<String>,
    pub action: Option<String>,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
    pub result: Option<String>,
    pub additional_fields: Map<String, Value>,
    pub index: Option<String>,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: "INFO".to_string(),
            service: None,
            log_type: LogType::Common,
            logger: None,
            environment: None,
            model: None,
            method: None,
            action: None,
            expected_value: None,
            actual_value: None,
            result: None,
            additional_fields: Map::new(),
            index: None,
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn log_type(mut self, log_type: impl Into<LogType>) -> Self {
        self.log_type = log_type.into();
        self
    }

    pub fn process(self) -> Self {
        self.log_type(LogType::Process)
    }

    pub fn logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn expected_value(mut self, value: impl Into<String>) -> Self {
        self.expected_value = Some(value.into());
        self
    }

    pub fn actual_value(mut self, value: impl Into<String>) -> Self {
        self.actual_value = Some(value.into());
        self
    }

    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_fields.insert(key.into(), value.into());
        self
    }

    pub fn fields(mut self, fields: Map<String, Value>) -> Self {
        self.additional_fields.extend(fields);
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }
}

/// The JSON document stored in Elasticsearch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(pub Map<String, Value>);

impl LogEntry {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardsInfo {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(rename = "_shards", default)]
    pub shards: Option<ShardsInfo>,
    #[serde(rename = "_seq_no", default)]
    pub seq_no: Option<u64>,
    #[serde(rename = "_primary_term", default)]
    pub primary_term: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub status: u16,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<BulkItemError>,
}

impl BulkItemResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// One entry of the `items` array; keyed by the action that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulkItem {
    #[serde(rename = "index")]
    Index(BulkItemResult),
    #[serde(rename = "create")]
    Create(BulkItemResult),
}

impl BulkItem {
    pub fn outcome(&self) -> &BulkItemResult {
        match self {
            BulkItem::Index(result) | BulkItem::Create(result) => result,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    pub fn failed_items(&self) -> Vec<&BulkItemResult> {
        self.items
            .iter()
            .map(BulkItem::outcome)
            .filter(|item| !item.is_success())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_type_from_str() {
        assert_eq!(LogType::from("common"), LogType::Common);
        assert_eq!(LogType::from("process"), LogType::Process);
        assert_eq!(LogType::from("audit"), LogType::Custom("audit".to_string()));
        assert_eq!(LogType::from("audit").to_string(), "audit");
    }

    #[test]
    fn test_parse_index_response() {
        let body = serde_json::json!({
            "_index": "mh-logs-common",
            "_id": "abc123",
            "_version": 1,
            "result": "created",
            "_shards": {"total": 2, "successful": 1, "failed": 0},
            "_seq_no": 0,
            "_primary_term": 1
        });

        let response: IndexResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.index, "mh-logs-common");
        assert_eq!(response.result.as_deref(), Some("created"));
        assert_eq!(response.shards.unwrap().successful, 1);
    }

    #[test]
    fn test_bulk_response_failed_items() {
        let body = serde_json::json!({
            "took": 3,
            "errors": true,
            "items": [
                {"index": {"_index": "mh-logs-common", "_id": "1", "status": 201, "result": "created"}},
                {"index": {"_index": "mh-logs-process", "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "failed to parse"}}}
            ]
        });

        let response: BulkResponse = serde_json::from_value(body).unwrap();
        let failed = response.failed_items();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index, "mh-logs-process");
        assert_eq!(
            failed[0].error.as_ref().unwrap().error_type,
            "mapper_parsing_exception"
        );
    }
}
