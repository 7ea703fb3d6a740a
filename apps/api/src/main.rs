mod config;
mod conversion;
mod errors;
mod intake;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversion::template::TemplateSource;
use crate::conversion::Converter;
use crate::llm_client::build_provider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing provider key or bad values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume LaTeX API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation provider
    let provider = build_provider(&config)?;
    info!(
        "Generation provider initialized ({}, timeout {}s, attachments {:?})",
        provider.name(),
        config.llm_timeout.as_secs(),
        config.attachment_mode
    );

    let converter = Converter::new(
        provider,
        TemplateSource::from_path(&config.template_path),
        config.attachment_mode,
    );
    converter.template().preload();

    let state = AppState {
        config: config.clone(),
        converter: Arc::new(converter),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
