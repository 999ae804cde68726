//! The document store capability the pipeline writes to.

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::PersistedDocument;

pub mod memory;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("failed to encode document to json: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to reach document store: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("document store rejected write to index '{index}' with status code {status}")]
    Rejected { index: String, status: u16 },
}

/// Writes documents into a named index.
///
/// Implementations are shared by all in-flight requests and must tolerate concurrent calls to
/// [`create`][DocumentStore::create] without outside synchronization. Any I/O timeout is
/// enforced by the implementation and reported as an error like any other failure.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync + 'static {
    /// Persist `document` into `index` as a single write. The store takes ownership of the
    /// document.
    async fn create(
        &self,
        index: &str,
        document: PersistedDocument,
    ) -> Result<(), DocumentStoreError>;
}
