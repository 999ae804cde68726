//! HTTP API service implementations for `server`

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use telemetry_collector_ingest::{IngestError, IngestPipeline, SubmissionRequest, TimeProvider};
use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::all_paths;

/// Body sent to clients whenever the document store could not be written to. The underlying
/// cause is only logged.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "elasticsearch connection failed";

/// Maximum length for untrusted input when logging to prevent log flooding
const MAX_PATH_LENGTH_FOR_LOGGING: usize = 256;

/// Truncate a string for logging untrusted input to prevent log flooding
fn truncate_for_logging(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub type Response = hyper::Response<Full<Bytes>>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested path has no registered handler.
    #[error("not found")]
    NoHandler,

    /// The requested path exists but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The client disconnected.
    #[error("client disconnected")]
    ClientHangup(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The client sent a request body that exceeds the configured maximum.
    #[error("max request size ({0} bytes) exceeded")]
    RequestSizeExceeded(usize),

    /// The request body is not a valid submission.
    #[error(transparent)]
    InvalidJson(#[from] serde_json::Error),

    /// The submission has an empty `version`.
    #[error("missing required field 'version'")]
    MissingVersion,

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

trait IntoResponse {
    fn into_response(self) -> Response;
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoHandler => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RequestSizeExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ClientHangup(_)
            | Self::InvalidJson(_)
            | Self::MissingVersion
            | Self::Ingest(IngestError::InvalidIdentifier(_)) => StatusCode::BAD_REQUEST,
            Self::Ingest(IngestError::StoreUnavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    /// Convert this error into an HTTP [`Response`]
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Ingest(IngestError::StoreUnavailable(_)) => STORE_UNAVAILABLE_MESSAGE.to_string(),
            err => err.to_string(),
        };
        text_response(status, body)
    }
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response {
    let mut response = hyper::Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[derive(Debug)]
pub struct HttpApi {
    pipeline: Arc<IngestPipeline>,
    time_provider: Arc<dyn TimeProvider>,
    max_request_bytes: usize,
}

impl HttpApi {
    pub fn new(
        pipeline: Arc<IngestPipeline>,
        time_provider: Arc<dyn TimeProvider>,
        max_request_bytes: usize,
    ) -> Self {
        Self {
            pipeline,
            time_provider,
            max_request_bytes,
        }
    }

    fn ready(&self) -> Result<Response> {
        Ok(text_response(StatusCode::OK, "ok"))
    }

    async fn submit<B>(&self, req: hyper::Request<B>) -> Result<Response>
    where
        B: Body<Data = Bytes> + Send + Unpin,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let body = self.read_body(req).await?;
        let submission: SubmissionRequest = serde_json::from_slice(&body)?;
        if submission.version.is_empty() {
            return Err(Error::MissingVersion);
        }

        let now = self.time_provider.now();
        self.pipeline.ingest(submission, now).await?;

        Ok(text_response(StatusCode::OK, "ok"))
    }

    /// Read the request's body into raw bytes, applying the configured size limit.
    async fn read_body<B>(&self, req: hyper::Request<B>) -> Result<Bytes>
    where
        B: Body<Data = Bytes> + Send + Unpin,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let content_length = req.headers().get(&CONTENT_LENGTH).cloned();
        let mut payload = req.into_body();

        // we can't trust the content-length header, but if it's present and seems reasonable,
        // defined here as a quarter of the max or less, we will preallocate that amount
        let quarter_of_max: usize = self.max_request_bytes / 4;
        let mut body = match content_length
            .as_ref()
            .and_then(|len| len.to_str().ok())
            .and_then(|len_str| len_str.parse().ok())
        {
            Some(len) if len < quarter_of_max => BytesMut::with_capacity(len),
            _ => BytesMut::new(),
        };
        while let Some(frame) = payload.frame().await {
            let frame = frame.map_err(|e| Error::ClientHangup(e.into()))?;
            if let Some(chunk) = frame.data_ref() {
                // limit max size of in-memory payload
                if (body.len() + chunk.len()) > self.max_request_bytes {
                    return Err(Error::RequestSizeExceeded(self.max_request_bytes));
                }
                body.extend_from_slice(chunk);
            }
        }
        Ok(body.freeze())
    }
}

/// Route a request and turn any error into a plain text response.
///
/// Every request is logged once it completes. The access log never includes the client address
/// or the request body.
pub async fn route_request<B>(
    http_server: Arc<HttpApi>,
    req: hyper::Request<B>,
) -> Result<Response, Infallible>
where
    B: Body<Data = Bytes> + Send + Unpin,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // extract from the request for logging before we pass it to perform_routing, which consumes it
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = truncate_for_logging(uri.path(), MAX_PATH_LENGTH_FOR_LOGGING);
    let start = Instant::now();

    let response = match perform_routing(http_server, req).await {
        Ok(response) => response,
        Err(error) => {
            let status = error.status_code();
            if status.is_server_error() {
                error!(%error, %method, %path, "Error while handling request");
            } else {
                debug!(%error, %method, %path, "Rejected request");
            }
            error.into_response()
        }
    };

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response)
}

async fn perform_routing<B>(http_server: Arc<HttpApi>, req: hyper::Request<B>) -> Result<Response>
where
    B: Body<Data = Bytes> + Send + Unpin,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let uri = req.uri().clone();
    trace!(%method, path = uri.path(), "Processing request");

    match (method, uri.path()) {
        (Method::GET, all_paths::API_READY) => http_server.ready(),
        (Method::POST, all_paths::API_V1_SUBMIT) => http_server.submit(req).await,
        (_, all_paths::API_READY | all_paths::API_V1_SUBMIT) => Err(Error::MethodNotAllowed),
        _ => Err(Error::NoHandler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use telemetry_collector_ingest::store::memory::InMemoryDocumentStore;
    use telemetry_collector_ingest::{AllowList, DocumentStore, MockProvider, PartitionGranularity};

    const MAX_REQUEST_BYTES: usize = 1024;

    struct TestApi {
        api: Arc<HttpApi>,
        store: Arc<InMemoryDocumentStore>,
        time_provider: Arc<MockProvider>,
    }

    impl TestApi {
        fn new() -> Self {
            let store = Arc::new(InMemoryDocumentStore::new());
            let time_provider = Arc::new(MockProvider::new(now()));
            let pipeline = Arc::new(IngestPipeline::new(
                AllowList::official(),
                PartitionGranularity::Year,
                Arc::clone(&store) as Arc<dyn DocumentStore>,
            ));
            let api = Arc::new(HttpApi::new(
                pipeline,
                Arc::clone(&time_provider) as Arc<dyn TimeProvider>,
                MAX_REQUEST_BYTES,
            ));
            Self {
                api,
                store,
                time_provider,
            }
        }

        async fn request(
            &self,
            method: Method,
            path: &str,
            body: impl Into<Bytes>,
        ) -> (StatusCode, String) {
            let req = hyper::Request::builder()
                .method(method)
                .uri(path)
                .body(Full::new(body.into()))
                .unwrap();
            let response = route_request(Arc::clone(&self.api), req).await.unwrap();
            let status = response.status();
            assert_eq!(
                response.headers().get(CONTENT_TYPE).unwrap(),
                "text/plain; charset=utf-8"
            );
            let body = response.into_body().collect().await.unwrap().to_bytes();
            (status, String::from_utf8(body.to_vec()).unwrap())
        }

        async fn submit(&self, body: &str) -> (StatusCode, String) {
            self.request(Method::POST, all_paths::API_V1_SUBMIT, body.to_string())
                .await
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 15, 0).unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn ready() {
        let api = TestApi::new();
        assert_eq!(
            api.request(Method::GET, all_paths::API_READY, "").await,
            (StatusCode::OK, "ok".to_string())
        );

        // independent of the store health
        api.store.set_unavailable(true);
        assert_eq!(
            api.request(Method::GET, all_paths::API_READY, "").await,
            (StatusCode::OK, "ok".to_string())
        );
        assert_eq!(api.store.create_calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn submit_valid_scan_types() {
        let api = TestApi::new();
        let (status, body) = api
            .submit(r#"{"version":"v2.0.42","installedScanTypes":["nmap","sslyze"]}"#)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let stored = api.store.documents();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].index, "telemetry-2026");
        assert_eq!(stored[0].document.timestamp, now());
        assert_eq!(stored[0].document.version, "v2.0.42");
        assert_eq!(
            stored[0].document.installed_scan_types,
            vec!["nmap".to_string(), "sslyze".to_string()]
        );
    }

    #[test_log::test(tokio::test)]
    async fn submit_uses_server_time() {
        let api = TestApi::new();
        let later = api.time_provider.inc(chrono::Duration::days(365));
        let (status, _) = api
            .submit(r#"{"version":"v2.0.42","installedScanTypes":[]}"#)
            .await;
        assert_eq!(status, StatusCode::OK);

        let stored = api.store.documents();
        assert_eq!(stored[0].index, "telemetry-2027");
        assert_eq!(stored[0].document.timestamp, later);
    }

    #[test_log::test(tokio::test)]
    async fn submit_other() {
        let api = TestApi::new();
        let (status, body) = api
            .submit(r#"{"version":"v1.0.0","installedScanTypes":["other"]}"#)
            .await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "ok"));
        assert_eq!(api.store.documents().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn submit_invalid_scan_type() {
        let api = TestApi::new();
        let (status, body) = api
            .submit(r#"{"version":"v2.0.42","installedScanTypes":["fooooobarrrrrrrrr"]}"#)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid ScanType 'fooooobarrrrrrrrr'");
        assert_eq!(api.store.create_calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn submit_with_store_failure() {
        let api = TestApi::new();
        api.store.set_unavailable(true);

        for body in [
            r#"{"version":"v2.0.42","installedScanTypes":["nmap","sslyze"]}"#,
            r#"{"version":"v2.0.42","installedScanTypes":[]}"#,
        ] {
            let (status, body) = api.submit(body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, STORE_UNAVAILABLE_MESSAGE);
        }
        assert!(api.store.documents().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn submit_malformed() {
        let api = TestApi::new();
        for body in [
            "",
            "not json",
            r#"{"version":"v2.0.42"}"#,
            r#"{"installedScanTypes":["nmap"]}"#,
            r#"{"version":"v2.0.42","installedScanTypes":"nmap"}"#,
            r#"{"version":2,"installedScanTypes":["nmap"]}"#,
        ] {
            let (status, message) = api.submit(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            let expected = serde_json::from_str::<SubmissionRequest>(body)
                .unwrap_err()
                .to_string();
            assert_eq!(message, expected);
        }
        assert_eq!(api.store.create_calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn submit_empty_version() {
        let api = TestApi::new();
        let (status, body) = api
            .submit(r#"{"version":"","installedScanTypes":["nmap"]}"#)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "missing required field 'version'");
        assert_eq!(api.store.create_calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn submit_too_large() {
        let api = TestApi::new();
        let scan_types = vec!["nmap"; MAX_REQUEST_BYTES / 4];
        let body = serde_json::json!({
            "version": "v2.0.42",
            "installedScanTypes": scan_types,
        })
        .to_string();
        let (status, message) = api.submit(&body).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(message, "max request size (1024 bytes) exceeded");
        assert_eq!(api.store.create_calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn unknown_routes() {
        let api = TestApi::new();
        assert_eq!(
            api.request(Method::GET, "/v2/submit", "").await,
            (StatusCode::NOT_FOUND, "not found".to_string())
        );
        assert_eq!(
            api.request(Method::GET, all_paths::API_V1_SUBMIT, "").await,
            (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
        );
        assert_eq!(
            api.request(Method::POST, all_paths::API_READY, "").await,
            (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_for_logging("/ready", 256), "/ready");
        assert_eq!(truncate_for_logging("abcdef", 3), "abc");
        // 'é' is two bytes
        assert_eq!(truncate_for_logging("aé", 2), "a");
    }
}
