use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod domain;
mod http;
mod infra;
mod jobs;

use crate::config::AppConfig;
use crate::infra::broadcast::{Broadcaster, SocketRegistry};
use crate::infra::db::Db;
use crate::infra::discord::{DiscordResolver, UserResolver};
use crate::infra::webhook_queue::WebhookQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub resolver: Arc<dyn UserResolver>,
    pub broadcaster: Broadcaster,
    pub sockets: SocketRegistry,
    pub webhook_queue: WebhookQueue,
    pub api_key: [u8; 32],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = Db::connect(&config).await?;
    let resolver = Arc::new(DiscordResolver::new(config.discord_bot_token.clone())?);

    let state = AppState {
        db: db.clone(),
        resolver,
        broadcaster: Broadcaster::new(),
        sockets: SocketRegistry::new(),
        webhook_queue: WebhookQueue::new(),
        api_key: config.api_key,
    };

    // The dispatcher shares the in-memory queue, so it lives in this
    // process, detached from any request.
    tokio::spawn(jobs::webhook_dispatcher::run(
        state.db.clone(),
        state.webhook_queue.clone(),
    ));

    let app: Router = http::router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
