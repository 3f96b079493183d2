//! Translate Relay Web - JSON API in front of the translation provider chain.

mod helpers;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter, prelude::*};
use translate_relay_core::AppConfig;

use state::AppState;

/// Request bodies are short learner texts.
const BODY_LIMIT_BYTES: usize = 100 * 1024;

#[derive(Parser, Debug)]
#[command(name = "translate-relay-web")]
#[command(author, version, about = "Translate Relay Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "TRANSLATE_RELAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Config file (defaults to ./config.toml and the user config dir)
    #[arg(short, long, env = "TRANSLATE_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing args so env-backed flags see it
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},hyper=warn,reqwest=warn")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let state = Arc::new(AppState::new(config).context("Failed to initialize application state")?);

    let chain: Vec<_> = state.translator.providers().iter().map(|p| p.name()).collect();
    info!("Translation chain: {}", chain.join(" -> "));
    if !state.translator.has_available_provider() {
        warn!("No translation provider is configured; /api/translate will return 500");
    }

    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
    );

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
