//! Cardstack publishing engine server.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardstack_engine::config::Config;
use cardstack_engine::state::AppState;
use cardstack_engine::{db, routes, schema};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Cardstack publishing engine");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let pool = db::create_pool(&config)
        .await
        .context("failed to create database pool")?;

    // Migrations run once at startup; no handler touches the schema lazily
    schema::migrate(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState::new(&config, pool);

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::files::router())
        .merge(routes::items::router())
        .merge(routes::taxonomy::router())
        .merge(routes::navigation::router())
        .merge(routes::testimonials::router())
        .merge(routes::settings::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
