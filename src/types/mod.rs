//! Core data types for the ingestion pipeline

mod chunk;
mod element;
mod extraction;

pub use chunk::{Chunk, CollectionUpdate, IngestionCommit, TrainingMode, TrainingQueueItem, TrainingUsage};
pub use element::{ElementMetadata, PartitionElement};
pub use extraction::{DatasetContext, ExtractionRequest, ExtractionResult, RELATED_ID_KEY};
