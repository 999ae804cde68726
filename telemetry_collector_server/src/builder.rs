use std::sync::Arc;

use telemetry_collector_ingest::{IngestPipeline, TimeProvider};
use tokio::net::TcpListener;

use crate::{DEFAULT_MAX_REQUEST_BYTES, Server, http::HttpApi};

/// Assembles a [`Server`]. `build` is only available once the pipeline, time provider, and
/// listener have all been supplied.
#[derive(Debug)]
pub struct ServerBuilder<P, T, L> {
    max_request_size: usize,
    pipeline: P,
    time_provider: T,
    listener: L,
}

impl ServerBuilder<NoPipeline, NoTimeProvider, NoListener> {
    pub fn new() -> Self {
        Self {
            max_request_size: DEFAULT_MAX_REQUEST_BYTES,
            pipeline: NoPipeline,
            time_provider: NoTimeProvider,
            listener: NoListener,
        }
    }
}

impl Default for ServerBuilder<NoPipeline, NoTimeProvider, NoListener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, T, L> ServerBuilder<P, T, L> {
    pub fn max_request_size(mut self, max_request_size: usize) -> Self {
        self.max_request_size = max_request_size;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoPipeline;
#[derive(Debug)]
pub struct WithPipeline(Arc<IngestPipeline>);
#[derive(Debug, Clone, Copy)]
pub struct NoTimeProvider;
#[derive(Debug)]
pub struct WithTimeProvider<T>(Arc<T>);
#[derive(Debug, Clone, Copy)]
pub struct NoListener;
#[derive(Debug)]
pub struct WithListener(TcpListener);

impl<T, L> ServerBuilder<NoPipeline, T, L> {
    pub fn pipeline(self, pipeline: Arc<IngestPipeline>) -> ServerBuilder<WithPipeline, T, L> {
        ServerBuilder {
            max_request_size: self.max_request_size,
            pipeline: WithPipeline(pipeline),
            time_provider: self.time_provider,
            listener: self.listener,
        }
    }
}

impl<P, L> ServerBuilder<P, NoTimeProvider, L> {
    pub fn time_provider<T>(self, tp: Arc<T>) -> ServerBuilder<P, WithTimeProvider<T>, L> {
        ServerBuilder {
            max_request_size: self.max_request_size,
            pipeline: self.pipeline,
            time_provider: WithTimeProvider(tp),
            listener: self.listener,
        }
    }
}

impl<P, T> ServerBuilder<P, T, NoListener> {
    pub fn tcp_listener(self, listener: TcpListener) -> ServerBuilder<P, T, WithListener> {
        ServerBuilder {
            max_request_size: self.max_request_size,
            pipeline: self.pipeline,
            time_provider: self.time_provider,
            listener: WithListener(listener),
        }
    }
}

impl<T: TimeProvider> ServerBuilder<WithPipeline, WithTimeProvider<T>, WithListener> {
    pub fn build(self) -> Server {
        let http = Arc::new(HttpApi::new(
            self.pipeline.0,
            self.time_provider.0,
            self.max_request_size,
        ));
        Server {
            http,
            listener: self.listener.0,
        }
    }
}
