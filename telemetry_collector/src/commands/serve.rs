//! Entrypoint for the telemetry collector server

use std::sync::Arc;

use telemetry_collector_clap_blocks::{
    document_store::{DocumentStoreConfig, ParseError},
    ingest::IngestConfig,
    logging::LoggingConfig,
    socket_addr::{DEFAULT_HTTP_BIND_ADDR, SocketAddr},
};
use telemetry_collector_ingest::{IngestPipeline, SystemProvider};
use telemetry_collector_server::{ServerBuilder, serve};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("Cannot create document store: {0}")]
    DocumentStore(#[from] ParseError),

    #[error("Failed to bind address")]
    BindAddress(#[source] std::io::Error),

    #[error("Server error: {0}")]
    Server(#[from] telemetry_collector_server::Error),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    /// document store options
    #[clap(flatten)]
    pub(crate) document_store_config: DocumentStoreConfig,

    /// ingest options
    #[clap(flatten)]
    pub(crate) ingest_config: IngestConfig,

    /// logging options
    #[clap(flatten)]
    pub(crate) logging_config: LoggingConfig,

    /// Maximum size of HTTP requests.
    #[clap(
        long = "max-http-request-size",
        env = "TELEMETRY_MAX_HTTP_REQUEST_SIZE",
        default_value = "1048576", // 1 MiB
        action,
    )]
    pub(crate) max_http_request_size: usize,

    /// The address on which the collector will serve HTTP API requests
    #[clap(
        long = "http-bind",
        env = "TELEMETRY_HTTP_BIND_ADDR",
        default_value = DEFAULT_HTTP_BIND_ADDR,
        action,
    )]
    pub(crate) http_bind_address: SocketAddr,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let startup_timer = Instant::now();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "telemetry collector starting"
    );

    let store = config.document_store_config.make_document_store()?;
    let allow_list = config.ingest_config.allow_list();
    info!(
        num_scan_types = allow_list.len(),
        partition_granularity = %config.ingest_config.partition_granularity,
        "allow-list loaded"
    );
    let pipeline = Arc::new(IngestPipeline::new(
        allow_list,
        config.ingest_config.partition_granularity,
        store,
    ));

    let listener = TcpListener::bind(*config.http_bind_address)
        .await
        .map_err(Error::BindAddress)?;

    let server = ServerBuilder::new()
        .max_request_size(config.max_http_request_size)
        .pipeline(pipeline)
        .time_provider(Arc::new(SystemProvider::new()))
        .tcp_listener(listener)
        .build();

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    serve(server, shutdown, startup_timer).await?;

    info!("telemetry collector stopped");
    Ok(())
}

/// Cancel `shutdown` once the process is asked to stop.
async fn cancel_on_signal(shutdown: CancellationToken) {
    match wait_for_signal().await {
        Ok(()) => shutdown.cancel(),
        Err(e) => error!(%e, "cannot listen for shutdown signals"),
    }
}

/// Wait for a SIGTERM or SIGINT to stop the process on UNIX systems
#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = term.recv() => info!("Received SIGTERM"),
        _ = int.recv() => info!("Received SIGINT"),
    }
    Ok(())
}

/// Wait for a `ctrl+c` to stop the process on Windows systems
#[cfg(windows)]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received SIGINT");
    Ok(())
}
