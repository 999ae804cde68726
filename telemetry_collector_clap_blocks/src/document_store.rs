//! CLI handling for document store config (via CLI arguments and environment variables).

use std::sync::Arc;
use std::time::Duration;

use telemetry_collector_elasticsearch::Client as ElasticsearchClient;
use telemetry_collector_ingest::DocumentStore;
use telemetry_collector_ingest::store::memory::InMemoryDocumentStore;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("error configuring elasticsearch: {0}")]
    InvalidElasticsearchConfig(#[from] telemetry_collector_elasticsearch::Error),

    #[error("a password for elasticsearch was given without a username")]
    PasswordWithoutUsername,
}

/// Document store type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentStoreType {
    /// Elasticsearch.
    #[default]
    Elasticsearch,

    /// In-memory. Documents are lost on shutdown.
    Memory,
}

impl DocumentStoreType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Elasticsearch => "elasticsearch",
            Self::Memory => "memory",
        }
    }
}

/// CLI config for the document store submissions are written to.
#[derive(Debug, Clone, clap::Parser)]
pub struct DocumentStoreConfig {
    /// Which document store to use.
    ///
    /// Possible values (case insensitive):
    ///
    /// * elasticsearch: Elasticsearch cluster at `--elasticsearch-url`.
    /// * memory: Keeps documents in memory only. Useful for local runs.
    #[clap(
        value_enum,
        long = "document-store",
        env = "TELEMETRY_DOCUMENT_STORE",
        ignore_case = true,
        default_value = "elasticsearch",
        action,
        verbatim_doc_comment
    )]
    pub document_store: DocumentStoreType,

    /// Base URL of the Elasticsearch cluster.
    #[clap(
        long = "elasticsearch-url",
        env = "ELASTIC_URL",
        default_value = "http://localhost:9200",
        action
    )]
    pub elasticsearch_url: String,

    /// Username for HTTP basic auth against Elasticsearch.
    #[clap(long = "elasticsearch-username", env = "ELASTIC_USERNAME", action)]
    pub elasticsearch_username: Option<String>,

    /// Password for HTTP basic auth against Elasticsearch.
    #[clap(
        long = "elasticsearch-password",
        env = "ELASTIC_PASSWORD",
        hide_env_values = true,
        action
    )]
    pub elasticsearch_password: Option<String>,

    /// Timeout for a single write to Elasticsearch.
    ///
    /// Writes that take longer fail with a 500 to the client.
    #[clap(
        long = "elasticsearch-request-timeout",
        env = "ELASTIC_REQUEST_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    pub elasticsearch_request_timeout: Duration,
}

impl DocumentStoreConfig {
    /// Create the config-dependent document store.
    pub fn make_document_store(&self) -> Result<Arc<dyn DocumentStore>, ParseError> {
        let store: Arc<dyn DocumentStore> = match self.document_store {
            DocumentStoreType::Memory => {
                warn!("documents are kept in memory only and are lost on shutdown");
                info!(document_store_type = "Memory", "Document Store");
                Arc::new(InMemoryDocumentStore::new())
            }
            DocumentStoreType::Elasticsearch => Arc::new(self.new_elasticsearch()?),
        };
        Ok(store)
    }

    fn new_elasticsearch(&self) -> Result<ElasticsearchClient, ParseError> {
        let client = ElasticsearchClient::with_request_timeout(
            self.elasticsearch_url.as_str(),
            self.elasticsearch_request_timeout,
        )?;
        let client = match (&self.elasticsearch_username, &self.elasticsearch_password) {
            (Some(username), password) => {
                client.with_basic_auth(username.as_str(), password.as_deref())
            }
            (None, Some(_)) => return Err(ParseError::PasswordWithoutUsername),
            (None, None) => client,
        };
        info!(
            document_store_type = "Elasticsearch",
            url = %client.base_url(),
            timeout = ?self.elasticsearch_request_timeout,
            basic_auth = self.elasticsearch_username.is_some(),
            "Document Store"
        );
        Ok(client)
    }
}
