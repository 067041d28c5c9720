use crate::core::{LogEntry, LogRecord, LogType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Builds the document for `record`.
///
/// Only the fields that belong to the record's log type are copied; a process
/// record without an explicit `result` gets one derived from comparing the
/// expected and actual values. Additional fields are applied last and win on
/// key collisions.
pub fn build_entry(record: &LogRecord, default_service: &str, timestamp: DateTime<Utc>) -> LogEntry {
    let mut doc = Map::new();

    doc.insert(
        "@timestamp".to_string(),
        Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    doc.insert("message".to_string(), Value::String(record.message.clone()));
    doc.insert("level".to_string(), Value::String(record.level.clone()));
    doc.insert(
        "service".to_string(),
        Value::String(
            record
                .service
                .clone()
                .unwrap_or_else(|| default_service.to_string()),
        ),
    );

    match record.log_type {
        LogType::Common => {
            insert_opt(&mut doc, "logger", &record.logger);
            insert_opt(&mut doc, "environment", &record.environment);
        }
        LogType::Process => {
            insert_opt(&mut doc, "model", &record.model);
            insert_opt(&mut doc, "method", &record.method);
            insert_opt(&mut doc, "action", &record.action);
            insert_opt(&mut doc, "expected_value", &record.expected_value);
            insert_opt(&mut doc, "actual_value", &record.actual_value);

            if let Some(result) = derive_result(record) {
                doc.insert("result".to_string(), Value::String(result));
            }
        }
        LogType::Custom(_) => {}
    }

    for (key, value) in &record.additional_fields {
        doc.insert(key.clone(), value.clone());
    }

    LogEntry(doc)
}

fn derive_result(record: &LogRecord) -> Option<String> {
    if let Some(result) = &record.result {
        return Some(result.clone());
    }

    match (&record.expected_value, &record.actual_value) {
        (Some(expected), Some(actual)) => Some(if expected == actual {
            "success".to_string()
        } else {
            "failure".to_string()
        }),
        _ => None,
    }
}

fn insert_opt(doc: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        doc.insert(key.to_string(), Value::String(value.clone()));
    }
}
