use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &autoduo_web::config::CONFIG;

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

    info!(
        backend_url = %cfg.backend_url,
        public_url = %cfg.public_url,
        loglevel = %cfg.loglevel,
        insecure_cookie = cfg.insecure_cookie
    );
    if cfg.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
    }

    let state = autoduo_web::AutoDuoState::new(autoduo_web::config::Config::clone(cfg))?;
    let app = autoduo_web::autoduo_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
