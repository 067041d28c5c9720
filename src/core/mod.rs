pub mod client;
pub mod entry;
pub mod transport;

pub use crate::domain::model::{BulkResponse, IndexResponse, LogEntry, LogRecord, LogType};
pub use crate::domain::ports::{ConfigProvider, Credentials, LogSink};
pub use crate::utils::error::Result;
