mod backends;
mod config;
mod errors;
mod extract;
mod history;
mod pipeline;
mod render;
mod routes;
mod sanitize;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backends::{HttpModelClient, HOSTED_PREFIX};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::{AppState, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Covercraft API v{}", env!("CARGO_PKG_VERSION"));

    let hosted = config.hosted_backend();
    match &hosted {
        Some(hosted) => info!(
            "Hosted streaming backend configured ({HOSTED_PREFIX}{})",
            hosted.model
        ),
        None => info!("No hosted streaming backend configured"),
    }

    let client = HttpModelClient::new(config.local_backend(), hosted);
    info!(
        "Model client initialized (local endpoint: {})",
        config.local_endpoint
    );

    let state = AppState {
        backend: Arc::new(client),
        session: Arc::new(Mutex::new(Session::default())),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
