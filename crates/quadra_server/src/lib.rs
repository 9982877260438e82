//! HTTP surface for Quadra.
//!
//! Wires the database layer to an axum router: one route per operation,
//! CORS, request tracing, and the server lifecycle. Tests drive [`router`]
//! directly; the binary goes through [`Server`].

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use quadra_db::QuadraDb;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server configuration, assembled in `main` from CLI flags and env vars.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub public_url: String,
    /// Exact allowed CORS origins; empty means allow any origin
    pub cors_origins: Vec<String>,
}

/// The Quadra HTTP server: a bound listener plus the configured router.
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Open the database, build the router, and bind the listener.
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let db = QuadraDb::open(&config.database_path)
            .await
            .context("Failed to open database")?;

        let state = AppState::new(db, config.public_url.clone());
        let router = router(state)
            .layer(cors_layer(&config.cors_origins)?)
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
        info!(addr = %listener.local_addr()?, "Listening");

        Ok(Self { listener, router })
    }

    /// Address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until ctrl-c.
    pub async fn run(self) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

/// Build the application router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/matrices", post(handlers::matrices::create_matrix))
        .route(
            "/matrices/{matrix_id}",
            get(handlers::matrices::get_matrix).delete(handlers::matrices::delete_matrix),
        )
        .route(
            "/matrices/{matrix_id}/labels",
            post(handlers::labels::create_label).get(handlers::labels::list_labels),
        )
        .route(
            "/matrices/{matrix_id}/labels/{label_id}",
            put(handlers::labels::update_label).delete(handlers::labels::delete_label),
        )
        .route(
            "/matrices/{matrix_id}/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
        )
        .route(
            "/matrices/{matrix_id}/tasks/{task_id}",
            put(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        .with_state(state)
}

/// CORS layer for the configured origins.
///
/// With an explicit origin list, credentials are allowed and methods/headers
/// mirror the request (credentialed responses cannot use wildcards). With no
/// origins configured, everything is allowed.
fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        let value = origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin: {}", origin))?;
        allowed.push(value);
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, stopping server");
}
