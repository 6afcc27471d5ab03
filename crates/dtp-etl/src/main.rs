//! DTP ETL - Drone traffic ingestion tool

use anyhow::Result;
use clap::Parser;
use dtp_common::db::DatabaseConfig;
use dtp_common::logging::{init_logging, LogConfig, LogLevel};
use dtp_common::storage::{config::StorageConfig, Storage};
use dtp_etl::{config::EtlConfig, pipeline::PipelineRunner, scheduler::Scheduler};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dtp-etl")]
#[command(author, version, about = "Drone traffic ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the pipeline once and exit
    Run,

    /// Run the pipeline immediately, then on a fixed interval, forever
    Schedule {
        /// Minutes between runs (overrides ETL_INTERVAL_MINUTES)
        #[arg(short, long)]
        interval_minutes: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("dtp-etl".to_string())
        .build();

    // Environment variables take precedence over CLI defaults
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting DTP ETL");

    // Missing DRONE_API_URL is fatal here, before any client is built.
    let config = EtlConfig::from_env()?;
    info!(
        api_url = %config.api_url,
        service_type = %config.service_type,
        vendor = %config.vendor,
        "Configuration loaded"
    );

    let storage = Storage::new(StorageConfig::from_env()?);

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.connect().await?;
    info!(host = %db_config.host, database = %db_config.database, "Database pool established");

    let runner = PipelineRunner::new(&config, storage, pool)?;

    match cli.command {
        Command::Run => {
            runner.run().await;
        },
        Command::Schedule { interval_minutes } => {
            let minutes = interval_minutes.unwrap_or(config.interval_minutes);
            info!(interval_minutes = minutes, "Scheduling recurring pipeline runs");

            let runner = std::sync::Arc::new(runner);
            Scheduler::from_minutes(minutes)
                .run(move || {
                    let runner = runner.clone();
                    async move {
                        runner.run().await;
                    }
                })
                .await;
        },
    }

    Ok(())
}
