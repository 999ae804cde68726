//! Paths served by the HTTP API.

/// Readiness probe, does not touch the document store.
pub const API_READY: &str = "/ready";

/// Telemetry submissions.
pub const API_V1_SUBMIT: &str = "/v1/submit";
