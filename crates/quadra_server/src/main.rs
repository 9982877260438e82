//! Quadra server
//!
//! HTTP API for collaborative Eisenhower matrices: shared workspaces of
//! labeled tasks sorted into quadrants, backed by SQLite.
//!
//! Usage:
//!     quadra-server --bind 127.0.0.1:8080 --database quadra.db

use clap::Parser;
use quadra_server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "quadra-server", about = "HTTP API for collaborative Eisenhower matrices")]
struct Args {
    /// Listen address for the HTTP API
    #[arg(long, default_value = "127.0.0.1:8080", env = "QUADRA_BIND")]
    bind: String,

    /// SQLite database file path
    #[arg(long, default_value = "quadra.db", env = "QUADRA_DATABASE")]
    database: std::path::PathBuf,

    /// Public base URL embedded in sharable matrix links
    #[arg(long, default_value = "http://localhost:8080", env = "QUADRA_PUBLIC_URL")]
    public_url: String,

    /// Allowed CORS origin (repeatable); every origin is allowed when unset
    #[arg(long = "cors-origin", env = "QUADRA_CORS_ORIGIN", value_delimiter = ',')]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quadra_server=info,quadra_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    tracing::info!("Starting Quadra server");
    tracing::info!("  Bind: {}", args.bind);
    tracing::info!("  Database: {}", args.database.display());
    tracing::info!("  Public URL: {}", args.public_url);

    let config = ServerConfig {
        bind_addr: args.bind,
        database_path: args.database,
        public_url: args.public_url,
        cors_origins: args.cors_origins,
    };

    // Bind and run
    let server = Server::bind(config).await?;
    server.run().await?;

    Ok(())
}
