//! Validation and ingestion of anonymous telemetry submissions
//!
//! A submission reports the version of a client installation and the scan types installed
//! alongside it. Before anything is persisted, every reported scan type is checked against the
//! [`AllowList`] so that names of private, custom scan types never reach the document store.
//! Accepted submissions are stamped with the server time and written to a time-partitioned
//! index through the [`DocumentStore`] capability.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

pub mod allow_list;
pub mod document;
pub mod partition;
pub mod pipeline;
pub mod store;
pub mod time;

pub use allow_list::{AllowList, InvalidIdentifierError, OTHER_SCAN_TYPE};
pub use document::{PersistedDocument, SubmissionRequest};
pub use partition::{PARTITION_PREFIX, PartitionGranularity};
pub use pipeline::{IngestError, IngestPipeline};
pub use store::{DocumentStore, DocumentStoreError};
pub use time::{MockProvider, SystemProvider, TimeProvider};
