use elk_logger::utils::logger;
use elk_logger::{ElasticsearchLogger, LogRecord, LoggerSettings};

/// Writes the sample common, process and custom-field entries to a local cluster.
///
/// The blocking call runs before the runtime starts; the blocking client must
/// not be created from async code.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init_cli_logger(false);

    let hosts = std::env::var("ELASTICSEARCH_URL")
        .map(|url| vec![url])
        .unwrap_or_else(|_| LoggerSettings::default().hosts);
    let settings = LoggerSettings::default()
        .with_hosts(hosts)
        .with_default_index("mh-logs");
    let es_logger = ElasticsearchLogger::from_config(&settings)?;

    let common = es_logger.log_blocking(
        LogRecord::new("Application started")
            .logger("main")
            .environment("production"),
    )?;
    println!("common (blocking): {:?}", common);

    let process = es_logger.log_blocking(
        LogRecord::new("Blocking process validation finished")
            .process()
            .model("nlp-model-v1")
            .method("validate")
            .expected_value("0.95")
            .actual_value("0.96"),
    )?;
    println!("process (blocking): {:?}", process);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let process = es_logger
            .log(
                LogRecord::new("Model validation finished")
                    .process()
                    .model("nlp-model-v1")
                    .method("validate")
                    .expected_value("0.95")
                    .actual_value("0.96"),
            )
            .await?;
        println!("process (async): {:?}", process);

        let custom = es_logger
            .log(
                LogRecord::new("Custom fields example")
                    .level("DEBUG")
                    .field("user_id", 123)
                    .field("operation", "data-export")
                    .field("duration_ms", 245),
            )
            .await?;
        println!("custom (async): {:?}", custom);

        Ok::<_, elk_logger::LoggerError>(())
    })?;
    drop(runtime);

    es_logger.close();
    Ok(())
}
