//! Config for validating and partitioning submissions.

use std::sync::Arc;

use telemetry_collector_ingest::{AllowList, PartitionGranularity};

/// CLI config for the ingestion pipeline.
#[derive(Debug, Clone, clap::Parser)]
pub struct IngestConfig {
    /// Size of the time bucket each `telemetry-*` index covers.
    ///
    /// Can be one of: year, month, day
    #[clap(
        long = "partition-granularity",
        env = "TELEMETRY_PARTITION_GRANULARITY",
        default_value = "year",
        action
    )]
    pub partition_granularity: PartitionGranularity,

    /// Scan types accepted on top of the official ones, comma separated.
    ///
    /// `other` is always accepted and does not need to be listed.
    #[clap(
        long = "additional-scan-types",
        env = "TELEMETRY_ADDITIONAL_SCAN_TYPES",
        value_delimiter = ',',
        action
    )]
    pub additional_scan_types: Vec<String>,
}

impl IngestConfig {
    /// Build the allow-list once for the lifetime of the process.
    pub fn allow_list(&self) -> Arc<AllowList> {
        if self.additional_scan_types.is_empty() {
            AllowList::official()
        } else {
            Arc::new(AllowList::official_with(
                self.additional_scan_types.iter().map(|s| s.trim()),
            ))
        }
    }
}
