//! Building blocks for the [`clap`]-driven configuration of the telemetry collector.
//!
//! Every block can be flattened into a command's config and reads each of its flags from an
//! environment variable as well.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

pub mod document_store;
pub mod ingest;
pub mod logging;
pub mod socket_addr;
pub mod tokio;
