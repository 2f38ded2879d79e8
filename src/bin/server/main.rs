//! Datastream TSDB Server
//!
//! Streams the configured CSV dataset into memory, then serves dashboard
//! queries over HTTP and WebSocket.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/v1/stats` - Engine statistics
//! - `POST /api/v1/data` - Aggregated series for a filter set
//! - `GET /api/v1/filters` - Filter catalog search
//! - `GET /getData`, `GET /getFilters` - Dashboard WebSocket endpoints
//!
//! # CLI Commands
//!
//! - `start` - Load the dataset and start the server (default if no command specified)
//! - `check-config` - Validate configuration file
//! - `stats` - Load the dataset and print engine statistics
//! - `query` - Load the dataset and print one query result as JSON
//! - `filters` - Load the dataset and print matching catalog filters
//!
//! # Configuration
//!
//! The server reads configuration from:
//! 1. `--config` flag
//! 2. `DATASTREAM_CONFIG` environment variable (path to TOML file)
//! 3. `./application.toml` in current directory
//! 4. Default configuration

mod config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use datastream_tsdb::{
    api::{build_router, AppState},
    config::Config,
    engine::MetricProcessor,
    ingestion::StreamReport,
};
use tokio::signal;
use tracing::{debug, info, warn};

// =============================================================================
// Server Setup
// =============================================================================

/// Graceful shutdown signal handler
///
/// A failed signal registration is logged and that signal source is ignored;
/// the server can still be stopped through the other one.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {},
            Err(e) => {
                warn!(
                    error = %e,
                    "Ctrl+C handler installation failed - graceful shutdown unavailable"
                );
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                warn!(
                    error = %e,
                    "SIGTERM handler installation failed - SIGTERM shutdown unavailable"
                );
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

/// Initialise the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Build the engine from the configured dataset
fn load_processor(config: &Config) -> Result<(Arc<MetricProcessor>, StreamReport), Box<dyn std::error::Error>> {
    let (processor, report) = MetricProcessor::from_dataset(&config.dataset)?;
    if report.rows_rejected > 0 {
        warn!(
            rejected = report.rows_rejected,
            "Some dataset rows were rejected; see earlier warnings"
        );
    }
    processor.log_summary();
    Ok((processor, report))
}

// =============================================================================
// CLI Definition
// =============================================================================

/// Datastream TSDB - tagged metric aggregation server
#[derive(Parser)]
#[command(name = "datastream-server")]
#[command(version)]
#[command(about = "In-memory tag index and time-bucketed aggregation over a CSV dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (overrides DATASTREAM_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override listen address (e.g., 0.0.0.0:8080)
    #[arg(short, long, global = true)]
    listen: Option<String>,

    /// Override dataset path
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dataset and start the HTTP server (default)
    Start,

    /// Validate configuration file without loading the dataset
    CheckConfig,

    /// Load the dataset and show engine statistics
    Stats {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Load the dataset and run one query
    Query {
        /// Filter in name:value form (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Bucket width (Daily, Weekly, Monthly)
        #[arg(short, long, default_value = "Monthly")]
        scale: String,

        /// Aggregation (Count, Sum, Avg)
        #[arg(short, long, default_value = "Count")]
        aggregator: String,
    },

    /// Load the dataset and search the filter catalog
    Filters {
        /// Prefix to search for (empty lists everything)
        #[arg(default_value = "")]
        prefix: String,
    },
}

/// Resolve configuration and apply CLI overrides
fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = config::load_config(cli.config.as_deref())?;

    if let Some(listen) = &cli.listen {
        config::apply_listen_override(&mut config, listen)?;
    }
    if let Some(dataset) = &cli.dataset {
        config.dataset.path = dataset.clone();
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// CLI Command Handlers
// =============================================================================

/// Validate configuration and print summary
fn cmd_check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Configuration is valid!");
    println!();
    println!("Server Settings:");
    println!("  Listen address: {}", config.server.listen_addr());
    println!("  Log level: {}", config.server.log_level);
    if config.server.cors_allowed_origins.is_empty() {
        println!("  CORS: any origin");
    } else {
        println!("  CORS: {}", config.server.cors_allowed_origins.join(", "));
    }
    println!();
    println!("Dataset:");
    println!("  Path: {}", config.dataset.path.display());
    println!("  Exists: {}", config.dataset.path.exists());
    println!("  Metric: {}", config.dataset.metric_name);
    println!(
        "  Columns: id={}, date={} ({}), value={}",
        config.dataset.id_column,
        config.dataset.timestamp_column,
        config.dataset.date_format,
        config.dataset.value_column
    );
    for tag in &config.dataset.tags {
        println!("  Tag: {} <- column {}", tag.name, tag.column);
    }

    Ok(())
}

/// Show engine statistics without starting the server
fn cmd_stats(config: &Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (processor, report) = load_processor(config)?;
    let stats = processor.stats();

    if format == "json" {
        let output = serde_json::json!({
            "dataset": config.dataset.path,
            "ingestion": report,
            "engine": stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Datastream TSDB Statistics");
        println!("==========================");
        println!();
        println!("Dataset: {}", config.dataset.path.display());
        println!(
            "Rows read: {} (ingested {}, rejected {})",
            report.rows_read, report.rows_ingested, report.rows_rejected
        );
        println!();
        println!("{}", stats.to_text());
    }

    Ok(())
}

/// Run one query and print the points as JSON
fn cmd_query(
    config: &Config,
    filters: &[String],
    scale: &str,
    aggregator: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (processor, _) = load_processor(config)?;
    let points = processor.query_request(filters, scale, aggregator)?;
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

/// Print catalog filters starting with `prefix`, sorted
fn cmd_filters(config: &Config, prefix: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (processor, _) = load_processor(config)?;
    let mut filters = processor.filter_catalog(prefix);
    filters.sort_unstable();
    for filter in filters {
        println!("{}", filter);
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(Commands::CheckConfig) = &cli.command {
        return cmd_check_config(&config);
    }

    init_tracing(&config.server.log_level);

    // Route to appropriate command handler
    match &cli.command {
        Some(Commands::Stats { format }) => return cmd_stats(&config, format),
        Some(Commands::Query {
            filters,
            scale,
            aggregator,
        }) => return cmd_query(&config, filters, scale, aggregator),
        Some(Commands::Filters { prefix }) => return cmd_filters(&config, prefix),
        Some(Commands::CheckConfig) | Some(Commands::Start) | None => {
            // Continue with server startup below
        },
    }

    info!("Starting Datastream TSDB Server v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        listen_addr = %config.server.listen_addr(),
        dataset = %config.dataset.path.display(),
        "Configuration"
    );

    // Ingestion completes before the listener accepts queries
    let (processor, _) = load_processor(&config)?;

    let state = Arc::new(AppState::new(processor, config.server.clone()));
    let app = build_router(state);

    let addr: SocketAddr = config.server.listen_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
