//! Blob storage provider for original uploaded files

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

/// A blob read back from storage
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Raw bytes
    pub data: Vec<u8>,
    /// Original filename
    pub filename: String,
}

/// Trait for durable storage of original file bytes
#[async_trait]
pub trait BlobStoreProvider: Send + Sync {
    /// Upload file bytes, returning the storage id
    async fn upload(
        &self,
        data: &[u8],
        filename: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<String>;

    /// Read a blob back by its storage id
    async fn read_by_id(&self, file_id: &str) -> Result<StoredBlob>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
