use std::sync::Arc;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use license_server::config::Config;
use license_server::db::{AppState, queries};
use license_server::handlers;
use license_server::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(name = "license-server")]
#[command(about = "License key issuing and machine-bound validation server")]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,

    /// Create the database schema and exit
    #[arg(long)]
    init_only: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "license_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    tracing::debug!("Loaded configuration: {:?}", config);

    let store = SqliteStore::open(&config.database_path, config.db_pool_size).unwrap_or_else(|e| {
        eprintln!("Failed to open database {}: {}", config.database_path, e);
        std::process::exit(1);
    });

    match store.pool().get().map_err(|e| e.to_string()).and_then(|conn| {
        queries::count_licenses(&conn).map_err(|e| e.to_string())
    }) {
        Ok(count) => tracing::info!("Database {} ready ({} licenses)", config.database_path, count),
        Err(e) => tracing::warn!("Failed to count licenses: {}", e),
    }

    if cli.init_only {
        return;
    }

    let state = AppState::new(Arc::new(store), config.admin_key.clone());

    let mut app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    if config.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("License server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
