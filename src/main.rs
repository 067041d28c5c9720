use clap::Parser;
use elk_logger::utils::error::ErrorSeverity;
use elk_logger::utils::{logger, validation::Validate};
use elk_logger::{CliConfig, ElasticsearchLogger, LoggerError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting elk-logger CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Shipping log entry failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), LoggerError> {
    let settings = config.resolve_settings()?;
    let record = config.to_record()?;
    let es_logger = ElasticsearchLogger::from_config(&settings)?;

    if config.dry_run {
        let index = es_logger.resolve_index(&record)?;
        let entry = es_logger.create_entry(&record);
        tracing::info!("🔍 DRY RUN MODE - nothing will be sent");
        println!("Index: {}", index);
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let response = es_logger.log(record).await?;
    es_logger.close();

    tracing::info!(
        "✅ Log entry {} written to {} ({})",
        response.id,
        response.index,
        response.result.as_deref().unwrap_or("unknown")
    );
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
