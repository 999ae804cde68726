//! Telemetry collector server implementation
//!
//! The server is responsible for handling the HTTP API
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

pub mod all_paths;
pub mod builder;
pub mod http;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::http::{HttpApi, route_request};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

pub use builder::ServerBuilder;

/// How long in-flight connections may take to finish once shutdown starts.
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit on the size of a request body, 1 MiB.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub struct Server {
    http: Arc<HttpApi>,
    listener: TcpListener,
}

impl Server {
    /// Address the server accepts connections on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

/// Accept connections until `shutdown` is cancelled, then wait for in-flight connections.
///
/// Each connection is served on its own task. The peer address of a connection is never
/// recorded.
pub async fn serve(server: Server, shutdown: CancellationToken, startup_timer: Instant) -> Result<()> {
    let Server { http, listener } = server;
    let graceful = GracefulShutdown::new();

    let addr = listener.local_addr()?;
    let startup_time = Instant::now().duration_since(startup_timer);
    info!(
        address = %addr,
        "startup time: {}ms",
        startup_time.as_millis()
    );

    // Connection handling loop
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            res = listener.accept() => {
                let (stream, _) = res?;
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(err = %e, "cannot set TCP_NODELAY on the incoming socket");
                }
                let io = TokioIo::new(stream);
                let http = Arc::clone(&http);
                let graceful_watcher = graceful.watcher();

                tokio::spawn(async move {
                    let service = service_fn(move |req| route_request(Arc::clone(&http), req));

                    let conn = ConnectionBuilder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .into_owned();
                    let conn = graceful_watcher.watch(conn);

                    if let Err(e) = conn.await {
                        error!("Error serving connection: {:?}", e);
                    }
                });
            }
        }
    }

    // stop accepting before waiting on the open connections
    drop(listener);

    trace!("Starting graceful shutdown, waiting for connections to close");
    tokio::select! {
        _ = graceful.shutdown() => {
            info!("All connections closed gracefully");
        }
        _ = tokio::time::sleep(GRACEFUL_SHUTDOWN_TIMEOUT) => {
            info!(
                "Graceful shutdown timed out after {} seconds",
                GRACEFUL_SHUTDOWN_TIMEOUT.as_secs()
            );
        }
    }

    Ok(())
}
