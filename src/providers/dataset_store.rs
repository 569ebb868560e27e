//! Dataset store provider
//!
//! Owns the collection records, the quota accounting, and the transactional
//! ingestion commit. Atomicity of `commit_ingestion` is part of this trait's
//! contract: either every write in the commit lands or none does.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IngestionCommit, TrainingMode};

/// A placeholder collection record created before extraction begins.
///
/// `hash_raw_text`, `raw_text_length` and `file_id` stay empty/zero until the
/// commit step of a successful ingestion job writes them.
#[derive(Debug, Clone)]
pub struct CollectionPlaceholder {
    pub team_id: String,
    pub dataset_id: String,
    /// Collection name (the original filename)
    pub name: String,
    pub training_mode: TrainingMode,
    pub chunk_size: usize,
    pub chunk_splitter: Option<String>,
    pub qa_prompt: Option<String>,
    /// Correlation id linking side-uploaded images to this upload
    pub related_id: String,
}

/// Trait for the dataset/collection backing store
#[async_trait]
pub trait DatasetStoreProvider: Send + Sync {
    /// Create a placeholder collection record, returning its id
    async fn create_collection(&self, placeholder: &CollectionPlaceholder) -> Result<String>;

    /// Verify the team's remaining capacity can accommodate `insert_len`
    /// training items. Returns `Error::QuotaExceeded` otherwise.
    async fn check_dataset_limit(&self, team_id: &str, insert_len: usize) -> Result<()>;

    /// Apply the full ingestion commit atomically: collection update, usage
    /// record, training item inserts, and clearing of image expirations for
    /// the commit's correlation id. Returns the created billing record id.
    async fn commit_ingestion(&self, commit: IngestionCommit) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
