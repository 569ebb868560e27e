//! Provider abstractions for the pipeline's external collaborators
//!
//! Trait-based seams for the services the pipeline drives but does not own:
//! the vision LLM, the image sideband store, blob storage, the dataset store,
//! the training consumer, and format-specific parsing.

pub mod blob_store;
pub mod dataset_store;
pub mod format_parser;
pub mod image_store;
pub mod training;
pub mod vision;

pub use blob_store::{BlobStoreProvider, StoredBlob};
pub use dataset_store::{CollectionPlaceholder, DatasetStoreProvider};
pub use format_parser::{FormatParser, ParsedFormat, PlainTextParser};
pub use image_store::ImageStoreProvider;
pub use training::TrainingDispatchProvider;
pub use vision::{OpenAiVision, VisionProvider};
