//! Library API mock server
//!
//! Serves a JSON dataset (`db.json`) as REST resources with pagination
//! metadata, an echo endpoint, and 100 ms of simulated latency.
//!
//! ```sh
//! # Defaults: db.json on port 10000 (or $PORT)
//! library-api
//!
//! # Another dataset and port
//! library-api --db fixtures/db.json --port 3000
//!
//! # Validate config and dataset without starting
//! library-api --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use library_api::config::AppConfig;
use library_api::domain::Dataset;
use library_api::server::{init_tracing, run};
use library_api::shared::ShutdownSignal;

#[derive(Parser, Debug)]
#[command(
    name = "library-api",
    version,
    about = "Mock REST server for the library dataset"
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "LIBRARY_API_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the bind address.
    #[arg(long)]
    host: Option<String>,

    /// Override the dataset path.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and dataset, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_optional(cli.config.as_deref())?;
    config.apply_env();

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(db) = cli.db {
        config.dataset.path = db;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);

    if cli.check {
        let dataset = Dataset::from_path(&config.dataset.path)?;
        println!("Configuration is valid");
        println!("   Listen address : {}", config.address());
        println!("   Dataset        : {}", config.dataset.path.display());
        println!("   Resources      : {}", dataset.resource_names().join(", "));
        println!("   Log level      : {}", config.logging.level);
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_os_signals();

    if let Err(e) = run(config, shutdown).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Goodbye");
    Ok(())
}
