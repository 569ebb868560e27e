//! Extraction request and result types

use bytes::Bytes;
use std::collections::HashMap;

/// Metadata key carrying the correlation id that ties side-uploaded images to
/// their originating extraction job.
pub const RELATED_ID_KEY: &str = "related_id";

/// Immutable input to the extraction pipeline, created once per upload
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Owning team id
    pub team_id: String,
    /// Raw file bytes
    pub content: Bytes,
    /// Caller-declared file extension (never sniffed from content)
    pub extension: String,
    /// Detected content encoding
    pub encoding: String,
    /// Dataset the upload belongs to, when known
    pub dataset: Option<DatasetContext>,
    /// Preview mode: PDFs are truncated to a page cap before partitioning
    pub preview: bool,
    /// Whether the caller is importing structured Q/A pairs (affects tabular
    /// formats)
    pub qa_import: bool,
    /// Request metadata, including the correlation id
    pub metadata: HashMap<String, String>,
}

impl ExtractionRequest {
    pub fn new(team_id: impl Into<String>, content: Bytes, extension: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            content,
            extension: extension.into().to_lowercase(),
            encoding: "utf-8".to_string(),
            dataset: None,
            preview: false,
            qa_import: false,
            metadata: HashMap::new(),
        }
    }

    /// Attach the correlation id
    pub fn with_related_id(mut self, related_id: impl Into<String>) -> Self {
        self.metadata
            .insert(RELATED_ID_KEY.to_string(), related_id.into());
        self
    }

    /// Correlation id for this request, when set
    pub fn related_id(&self) -> Option<&str> {
        self.metadata.get(RELATED_ID_KEY).map(String::as_str)
    }
}

/// Dataset context forwarded into the pipeline
#[derive(Debug, Clone, Default)]
pub struct DatasetContext {
    /// Dataset id
    pub dataset_id: String,
    /// Vision/agent model pinned by the dataset, overriding the configured
    /// default
    pub agent_model: Option<String>,
    /// Vector model name, recorded on the usage record
    pub vector_model: Option<String>,
}

/// Terminal output of an extraction run
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Concatenated element texts in original order
    pub raw_text: String,
    /// Pre-formatted tabular representation, for formats that produce one
    pub format_text: Option<String>,
    /// Metadata passthrough from the request
    pub metadata: HashMap<String, String>,
}
