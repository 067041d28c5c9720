pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{toml_config::TomlConfig, LoggerSettings};

pub use core::{client::ElasticsearchLogger, transport::HttpTransport};
pub use domain::model::{BulkResponse, IndexResponse, LogEntry, LogRecord, LogType};
pub use domain::ports::{ConfigProvider, Credentials, LogSink};
pub use utils::error::{LoggerError, Result};
