mod api;
mod config;
mod db;
mod engine;
mod models;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use db::Store;
use engine::Engine;

pub struct AppState {
    pub store: Arc<Store>,
    pub engine: Engine,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cfg.log_level.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting accrual engine v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_uri)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(Store::new(pool));
    let engine = Engine::new(Arc::clone(&store));
    let state = Arc::new(AppState { store, engine });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.run_address).await?;
    tracing::info!(address = %cfg.run_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
