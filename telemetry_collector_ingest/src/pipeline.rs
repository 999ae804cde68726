//! The validate, stamp, partition and write sequence for a single submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::allow_list::{AllowList, InvalidIdentifierError};
use crate::document::{PersistedDocument, SubmissionRequest};
use crate::partition::PartitionGranularity;
use crate::store::{DocumentStore, DocumentStoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    /// A reported scan type is not on the allow-list. Nothing was written.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifierError),

    /// The write to the document store failed. It is not retried.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(#[source] DocumentStoreError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;

/// Validates submissions and writes accepted ones to the document store.
///
/// Holds no mutable state, so a single pipeline is shared by all requests.
#[derive(Debug)]
pub struct IngestPipeline {
    allow_list: Arc<AllowList>,
    granularity: PartitionGranularity,
    store: Arc<dyn DocumentStore>,
}

impl IngestPipeline {
    pub fn new(
        allow_list: Arc<AllowList>,
        granularity: PartitionGranularity,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            allow_list,
            granularity,
            store,
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn granularity(&self) -> PartitionGranularity {
        self.granularity
    }

    /// Ingest a single submission received at `now`.
    ///
    /// Performs at most one write. A submission with any scan type that is not on the
    /// allow-list is rejected before the store is touched.
    pub async fn ingest(&self, request: SubmissionRequest, now: DateTime<Utc>) -> Result<()> {
        self.allow_list.validate(&request.installed_scan_types)?;

        let index = self.granularity.partition_name(now);
        let document = PersistedDocument::new(request, now);
        let num_scan_types = document.installed_scan_types.len();

        if let Err(error) = self.store.create(&index, document).await {
            warn!(%error, %index, "failed to persist telemetry submission");
            return Err(IngestError::StoreUnavailable(error));
        }

        debug!(%index, num_scan_types, "persisted telemetry submission");
        Ok(())
    }
}
