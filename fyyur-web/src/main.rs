use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use fyyur_core::seed::seed_demo_catalog;
use fyyur_core::SqliteStorage;
use fyyur_web::{app_router, logging, metrics, AppState, Config};

#[derive(Parser)]
#[command(name = "fyyur")]
#[command(about = "Booking directory for venues, artists and shows")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./fyyur.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Console-only logging
        #[arg(long)]
        debug: bool,
    },
    /// Create or upgrade the database schema and exit
    Migrate,
    /// Load the demo catalog into an empty database
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        debug: false,
    });
    if let Commands::Serve { host, port, debug } = &command {
        if let Some(host) = host {
            config.host = host.clone();
        }
        if let Some(port) = port {
            config.port = *port;
        }
        config.debug |= *debug;
    }

    let _log_guard = logging::init_logging(&config);

    let storage = SqliteStorage::open(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.display()))?;

    match command {
        Commands::Migrate => {
            info!("Schema is up to date in {}", config.database.display());
        }
        Commands::Seed => {
            if seed_demo_catalog(&storage).await? {
                info!("Demo catalog loaded into {}", config.database.display());
            }
        }
        Commands::Serve { .. } => serve(config, storage).await?,
    }

    Ok(())
}

async fn serve(config: Config, storage: SqliteStorage) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let state = AppState::new(Arc::new(storage), config, metrics::init_metrics());
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("Fyyur listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
