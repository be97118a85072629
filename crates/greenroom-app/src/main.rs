use std::sync::Arc;
use std::time::Duration;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use greenroom_app::app::api::routes;
use greenroom_app::config::ConfigHandler;
use greenroom_app::db_handler::DbProviderHandler;
use greenroom_app::notifier_handler::NotifierHandler;
use greenroom_core::config::load_config;
use greenroom_db::db::connection::create_pool;
use greenroom_db::db::migrate::run_pending_migrations;
use greenroom_service::notify::Notifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Greenroom booking server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    if config.schedule.dev_mode {
        tracing::warn!("Dev mode is ON: demo tokens and the plain admin key are honored");
    }

    let database_url = config.database.url.clone();
    tokio::task::spawn_blocking(move || run_pending_migrations(&database_url)).await??;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
        Duration::from_secs(config.database.acquire_timeout_seconds),
    )
    .await?;

    tracing::info!("Database connection pool created.");

    let notifier = Notifier::from_config(&config.email)?;
    if !notifier.enabled() {
        tracing::warn!("Outbound email is not configured; confirmations will be skipped");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(DbProviderHandler { provider: pool })
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .hoop(NotifierHandler {
            notifier: Arc::new(notifier),
        })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
