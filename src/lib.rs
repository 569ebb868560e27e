//! dataset-ingest: document ingestion and chunk dispatch for dataset training
//!
//! Takes uploaded files from raw bytes to committed training items: external
//! partitioning for PDFs, vision-LLM description of embedded images and
//! tables, markdown image sidebanding, extension-based dispatch for other
//! formats, sentence-aware chunking, and a background queue that commits each
//! upload atomically before waking the training consumer.

pub mod chunking;
pub mod config;
pub mod describe;
pub mod error;
pub mod extract;
pub mod markdown;
pub mod partition;
pub mod processing;
pub mod providers;
pub mod service;
pub mod types;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use service::{IngestService, UploadParams, UploadReceipt};
pub use types::{
    Chunk, DatasetContext, ExtractionRequest, ExtractionResult, PartitionElement, TrainingMode,
};

/// Initialize tracing with an env-filter, for binaries and integration tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}
