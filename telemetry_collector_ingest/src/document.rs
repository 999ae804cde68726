use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A telemetry submission as sent by a client to `/v1/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub version: String,
    pub installed_scan_types: Vec<String>,
}

/// The document written to the store for an accepted [`SubmissionRequest`].
///
/// `@timestamp` is the field name Elasticsearch and Kibana pick up as the document time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub installed_scan_types: Vec<String>,
}

impl PersistedDocument {
    /// Stamp a submission with the server time. Fields are moved over untouched.
    pub fn new(request: SubmissionRequest, timestamp: DateTime<Utc>) -> Self {
        let SubmissionRequest {
            version,
            installed_scan_types,
        } = request;
        Self {
            timestamp,
            version,
            installed_scan_types,
        }
    }
}
