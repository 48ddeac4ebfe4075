use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &usersync::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let secret_state = if cfg.webhook_secret().is_some() {
        "<set>"
    } else {
        "<none>"
    };
    info!(
        database_url = %cfg.database_url().unwrap_or("<none>"),
        webhook_secret = %secret_state,
        loglevel = %cfg.loglevel
    );

    if cfg.database_url().is_none() {
        warn!("DATABASE_URL is not set; storage-backed routes will fail");
    }
    if cfg.webhook_secret().is_none() {
        warn!("WEBHOOK_SECRET is not set; webhook deliveries will be refused");
    }

    let state = usersync::router::SyncState::from_config(cfg);
    let app = usersync::router::sync_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
