//! Chunk and training dispatch types

use serde::{Deserialize, Serialize};

/// A contiguous, possibly overlapping slice of raw text sized for downstream
/// embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// 0-based position in the split sequence
    pub chunk_index: u32,
}

impl Chunk {
    pub fn new(text: impl Into<String>, chunk_index: u32) -> Self {
        Self {
            text: text.into(),
            chunk_index,
        }
    }
}

/// Training mode for a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    /// Plain chunk embedding; chunks overlap
    #[default]
    Chunk,
    /// Q/A generation; each chunk fans out into several training items
    Qa,
}

impl TrainingMode {
    /// Overlap ratio the splitter uses for this mode
    pub fn overlap_ratio(&self) -> f32 {
        match self {
            TrainingMode::Chunk => 0.2,
            TrainingMode::Qa => 0.0,
        }
    }

    /// Predicted number of training items produced from `chunk_count` chunks,
    /// used for the quota check before any write happens.
    pub fn predicted_items(&self, chunk_count: usize) -> usize {
        match self {
            TrainingMode::Chunk => chunk_count,
            TrainingMode::Qa => chunk_count * 20,
        }
    }
}

/// One unit of work handed to the training subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingQueueItem {
    pub team_id: String,
    pub dataset_id: String,
    pub collection_id: String,
    /// Chunk text
    pub text: String,
    /// 0-based chunk index
    pub chunk_index: u32,
    pub training_mode: TrainingMode,
    /// Billing record id; assigned by the store during the commit transaction
    #[serde(default)]
    pub bill_id: Option<String>,
}

/// Collection fields written once extraction completes.
///
/// These stay empty/zero on the placeholder record until the commit step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionUpdate {
    pub collection_id: String,
    /// SHA-256 hex of the raw text
    pub hash_raw_text: String,
    /// Raw text length in characters
    pub raw_text_length: usize,
    /// Blob storage id of the original file
    pub file_id: String,
}

/// Usage/billing record created alongside the training items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingUsage {
    pub team_id: String,
    /// Collection name, shown on the bill
    pub app_name: String,
    pub vector_model: Option<String>,
    pub agent_model: Option<String>,
}

/// Everything the commit step writes in one atomic transaction: the collection
/// update, the usage record, the training items, and the correlation id whose
/// side-uploaded images lose their expiration marker.
#[derive(Debug, Clone)]
pub struct IngestionCommit {
    pub collection: CollectionUpdate,
    pub usage: TrainingUsage,
    pub items: Vec<TrainingQueueItem>,
    pub team_id: String,
    pub related_id: String,
}
