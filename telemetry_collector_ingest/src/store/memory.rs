//! An in-memory [`DocumentStore`], for local runs and tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::document::PersistedDocument;
use crate::store::{DocumentStore, DocumentStoreError};

/// A document along with the index it was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub index: String,
    pub document: PersistedDocument,
}

/// Keeps every created document in a list.
///
/// The store can be switched to an unavailable state, in which every
/// [`create`][DocumentStore::create] fails without storing anything. All calls are counted,
/// including failed ones.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<Vec<StoredDocument>>,
    create_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (`true`) or succeed (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of the documents stored so far, in write order.
    pub fn documents(&self) -> Vec<StoredDocument> {
        self.documents.lock().clone()
    }

    /// Number of times [`create`][DocumentStore::create] was called, successful or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(
        &self,
        index: &str,
        document: PersistedDocument,
    ) -> Result<(), DocumentStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Connection(
                "in-memory document store is unavailable".into(),
            ));
        }
        debug!(index, "storing document in memory");
        self.documents.lock().push(StoredDocument {
            index: index.to_string(),
            document,
        });
        Ok(())
    }
}
