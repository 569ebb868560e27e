//! PDF extraction pipeline
//!
//! PDFs go through the partition service and then the describe pass. In
//! preview mode the document is truncated to its first pages before
//! partitioning, keeping preview latency independent of document size.

use lopdf::Document;
use std::sync::Arc;
use tracing::{debug, info};

use crate::describe::{DescribeContext, ElementDescriber};
use crate::error::{Error, Result};
use crate::partition::PartitionClient;
use crate::types::{ExtractionRequest, ExtractionResult, PartitionElement};

/// Page cap applied in preview mode
const PREVIEW_PAGE_CAP: usize = 3;

/// Fixed filename presented to the partition service
const UPLOAD_FILENAME: &str = "input_file.pdf";

/// Orchestrates partition and describe for PDF uploads
pub struct PdfExtractor {
    partition: Arc<PartitionClient>,
    describer: Arc<ElementDescriber>,
    /// Model used when the dataset does not pin one
    default_model: String,
}

impl PdfExtractor {
    pub fn new(
        partition: Arc<PartitionClient>,
        describer: Arc<ElementDescriber>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            partition,
            describer,
            default_model: default_model.into(),
        }
    }

    /// Extract raw text from a PDF upload
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        let related_id = request.related_id().unwrap_or_default().to_string();

        let data = if request.preview {
            truncate_to_preview(&request.content, PREVIEW_PAGE_CAP)?
        } else {
            request.content.to_vec()
        };

        debug!(%related_id, bytes = data.len(), preview = request.preview, "partitioning pdf");
        let elements = self.partition.partition(UPLOAD_FILENAME, &data).await?;
        info!(%related_id, elements = elements.len(), "pdf partitioned");

        let model = request
            .dataset
            .as_ref()
            .and_then(|d| d.agent_model.clone())
            .unwrap_or_else(|| self.default_model.clone());
        let ctx = DescribeContext {
            team_id: request.team_id.clone(),
            related_id,
            model,
        };
        let elements = self.describer.describe(elements, &ctx).await;

        Ok(ExtractionResult {
            raw_text: assemble_text(&elements),
            format_text: None,
            metadata: request.metadata.clone(),
        })
    }
}

/// Join element texts in reading order, one trailing newline per element
fn assemble_text(elements: &[PartitionElement]) -> String {
    elements
        .iter()
        .map(|e| format!("{}\n", e.text))
        .collect()
}

/// Drop every page past `max_pages`, re-serializing the document.
/// Documents at or under the cap pass through unchanged.
fn truncate_to_preview(data: &[u8], max_pages: usize) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(data)
        .map_err(|e| Error::file_parse(UPLOAD_FILENAME, e.to_string()))?;
    let page_count = doc.get_pages().len();
    if page_count <= max_pages {
        return Ok(data.to_vec());
    }

    let to_delete: Vec<u32> = ((max_pages as u32 + 1)..=page_count as u32).collect();
    doc.delete_pages(&to_delete);
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| Error::file_parse(UPLOAD_FILENAME, e.to_string()))?;
    Ok(out)
}
