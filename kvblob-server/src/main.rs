mod config;
use crate::config::{Config, LogConfig};
use clap::{Parser, Subcommand};
use kvblob_core::{BlobKeyspace, ReadBlobsOperation, Result};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod server;
use server::run_server;

#[derive(Parser)]
#[command(name = "kvblob")]
#[command(about = "Blob CRUD over HTTP, backed by a distributed key-value store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Server {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Print the number of stored blobs and exit
    Count {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
}

fn load_config(path: &str) -> Config {
    match Config::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

/// The returned guard flushes the log file on drop; keep it alive until exit
fn init_logging(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.filter.as_str()))
    };

    let (file_layer, guard) = match &log.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| "kvblob.log".into());

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter()))
        .with(file_layer)
        .init();

    guard
}

/// One-shot count over a single client; no pool is needed for one scan
async fn count_blobs(cfg: &Config) -> Result<usize> {
    let client = cfg.client_builder().build_client().await?;
    let reader = ReadBlobsOperation::new(Arc::new(BlobKeyspace::new(
        cfg.blobs.key_prefix.clone(),
    )));

    reader.count(client.as_ref()).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config } => {
            let cfg = load_config(&config);
            let log_guard = init_logging(&cfg.log);

            tracing::info!("Starting kvblob server with config: {}", config);
            tracing::info!(
                "Storage backend: {:?}, pool size: {}, key prefix: {}",
                cfg.storage.backend,
                cfg.storage.pool_size,
                cfg.blobs.key_prefix
            );

            if let Err(e) = run_server(cfg).await {
                tracing::error!("Server error: {}", e);
                drop(log_guard);
                std::process::exit(1);
            }
        }
        Commands::Count { config } => {
            let cfg = load_config(&config);
            let log_guard = init_logging(&cfg.log);

            match count_blobs(&cfg).await {
                Ok(count) => println!("{}", count),
                Err(e) => {
                    tracing::error!("Failed to count blobs: {}", e);
                    drop(log_guard);
                    std::process::exit(1);
                }
            }
        }
    }
}
