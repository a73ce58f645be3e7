use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passgate::auth::cookie;
use passgate::config::ConfigStore;
use passgate::db::Database;
use passgate::state::AppState;
use passgate::utils::bind_tcp_listener;
use passgate::web;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
    Trace,
}

/// passgate command line arguments
#[derive(Parser, Debug)]
#[command(name = "passgate")]
#[command(version, about = "Password login and signup with server-side sessions", long_about = None)]
struct CliArgs {
    /// Listen address (overrides database config)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    address: Option<String>,

    /// HTTP port (overrides database config)
    #[arg(short = 'p', long, value_name = "PORT")]
    http_port: Option<u16>,

    /// Data directory path (default: /var/lib/passgate)
    #[arg(short = 'd', long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, verbose, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for verbose, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(args.log_level, args.verbose);

    tracing::info!("Starting passgate v{}", env!("CARGO_PKG_VERSION"));

    // Determine data directory (CLI arg takes precedence)
    let data_dir = args.data_dir.unwrap_or_else(get_data_dir);
    tracing::info!("Data directory: {}", data_dir.display());
    tokio::fs::create_dir_all(&data_dir).await?;

    // Open the database; it stays open until shutdown
    let db = Database::open(&data_dir.join("passgate.db")).await?;
    let config_store = ConfigStore::new(&db).await?;
    let cookie_key = cookie::signing_key(&config_store).await?;

    // Apply CLI argument overrides to the runtime copy only
    let mut web_config = config_store.get().web.clone();
    if let Some(addr) = args.address {
        web_config.bind_address = addr;
    }
    if let Some(port) = args.http_port {
        web_config.http_port = port;
    }
    let addr = web_config.socket_addr()?;

    let state = AppState::new(db, &config_store, cookie_key)?;

    let seeded = state.trainings.seed_defaults().await?;
    if seeded > 0 {
        tracing::info!("Seeded {} trainings", seeded);
    }

    let app = web::create_router(state.clone());

    let listener = bind_tcp_listener(addr)?;
    tracing::info!("Starting HTTP server on http://{}", listener.local_addr()?);
    let listener = tokio::net::TcpListener::from_std(listener)?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
    {
        tracing::error!("HTTP server error: {}", e);
    }

    cleanup(&state).await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Verbose,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "passgate=error,tower_http=error",
        LogLevel::Warn => "passgate=warn,tower_http=warn",
        LogLevel::Info => "passgate=info,tower_http=info",
        LogLevel::Verbose => "passgate=debug,tower_http=info",
        LogLevel::Debug => "passgate=debug,tower_http=debug",
        LogLevel::Trace => "passgate=trace,tower_http=debug",
    };

    // Environment variable takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}

/// Get the application data directory
fn get_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("PASSGATE_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("/var/lib/passgate")
}

/// Release resources on shutdown
async fn cleanup(state: &Arc<AppState>) {
    state.db.close().await;
    tracing::info!("Database closed");
}
