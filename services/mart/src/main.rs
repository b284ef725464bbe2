mod api;
mod auth;
mod config;
mod db;
mod models;
mod operations;
mod processor;

use std::sync::Arc;

use gophermart_core::accrual_client::{ClientOptions, HttpAccrualClient};
use gophermart_core::sign::Signer;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::Auth;
use config::Config;
use db::Store;
use operations::Operations;
use processor::Processor;

pub struct AppState {
    pub store: Arc<Store>,
    pub auth: Auth,
    pub operations: Operations,
    pub processor: Processor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cfg.log_level.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting mart gateway v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_uri)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let secret = std::fs::read(&cfg.secret_key_path)?;
    let mut signer = Signer::new(&secret);
    if let Some(ttl) = cfg.token_ttl {
        signer = signer.with_ttl(ttl);
    }

    let store = Arc::new(Store::new(pool));
    let auth = Auth::new(Arc::clone(&store), Arc::new(signer));
    let operations = Operations::new(Arc::clone(&store));

    let client: Arc<dyn gophermart_core::accrual_client::AccrualClient> = Arc::new(
        HttpAccrualClient::new(cfg.accrual_system_address.clone(), ClientOptions::default()),
    );
    let processor = Processor::start(Arc::clone(&store), client);

    for order in store.list_unsettled_orders().await? {
        processor.submit(order).await;
    }

    let state = Arc::new(AppState { store, auth, operations, processor });

    let app = api::router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&cfg.run_address).await?;
    tracing::info!(address = %cfg.run_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.processor.close().await;

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
