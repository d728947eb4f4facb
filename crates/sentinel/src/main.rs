use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use sentinel_core::{
    commands::CommandService,
    config::Config,
    events::EventLog,
    gateway::{CommandReply, Dispatcher, EventPipeline, ReplySink},
    guilds::GuildStore,
    links::LinkDirectory,
    status::{Census, StatusGateway},
    Result,
};
use sentinel_http::AppState;

/// Reply sink for a headless deployment: every reply the dispatcher produces
/// is logged. A chat platform adapter replaces this with real delivery.
struct LoggingSink;

#[async_trait]
impl ReplySink for LoggingSink {
    async fn deliver(&self, reply: CommandReply) -> Result<()> {
        info!(?reply, "command reply");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sentinel_core::logging::init("sentinel")?;

    let cfg = Config::load().context("loading configuration")?;

    let guilds = Arc::new(GuildStore::new());
    let events = Arc::new(EventLog::new(guilds.clone()));
    let links = Arc::new(LinkDirectory::new());
    let census = Arc::new(Census::new());
    let status = Arc::new(StatusGateway::new(Some(Utc::now())));

    let commands = Arc::new(CommandService::new(
        guilds.clone(),
        events,
        links.clone(),
        cfg.public_base_url().map(str::to_string),
    ));
    let dispatcher = Dispatcher::new(commands, census.clone(), Arc::new(LoggingSink));

    // The sender half is the seam where a chat platform adapter plugs in.
    let (event_tx, pipeline) = EventPipeline::spawn(dispatcher);

    let app = sentinel_http::build_app(AppState {
        guilds,
        links,
        census,
        status,
    });

    let listener = tokio::net::TcpListener::bind(cfg.http_addr)
        .await
        .with_context(|| format!("binding {}", cfg.http_addr))?;
    info!(addr = %cfg.http_addr, "sentinel listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("http server failed")?;

    // Dropping the sender lets the dispatcher drain its queue and exit.
    drop(event_tx);
    pipeline.await.context("event pipeline task failed")?;

    info!("sentinel stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
