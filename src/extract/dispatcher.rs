//! Extension-based extraction dispatch
//!
//! One entry point for every upload: PDFs go through the partition pipeline,
//! markdown-bearing formats get their inline images side-uploaded, tabular
//! formats choose raw or formatted text depending on the import mode, and
//! everything else is handed to the injected format parser as-is.

use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::markdown::MarkdownImageRewriter;
use crate::providers::FormatParser;
use crate::types::{ExtractionRequest, ExtractionResult};

use super::pdf::PdfExtractor;

/// Detect the text encoding of a buffer from its BOM, falling back to a
/// UTF-8 validity check.
pub fn detect_encoding(buffer: &[u8]) -> &'static str {
    if buffer.starts_with(&[0xFF, 0xFE]) {
        "utf-16le"
    } else if buffer.starts_with(&[0xFE, 0xFF]) {
        "utf-16be"
    } else if std::str::from_utf8(buffer).is_ok() || buffer.starts_with(&[0xEF, 0xBB, 0xBF]) {
        "utf-8"
    } else {
        "latin1"
    }
}

/// Dispatches extraction by declared file extension
pub struct RawTextExtractor {
    pdf: Arc<PdfExtractor>,
    parser: Arc<dyn FormatParser>,
    rewriter: Arc<MarkdownImageRewriter>,
}

impl RawTextExtractor {
    pub fn new(
        pdf: Arc<PdfExtractor>,
        parser: Arc<dyn FormatParser>,
        rewriter: Arc<MarkdownImageRewriter>,
    ) -> Self {
        Self {
            pdf,
            parser,
            rewriter,
        }
    }

    /// Extract raw text from an upload according to its extension
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        debug!(
            extension = %request.extension,
            encoding = %request.encoding,
            "dispatching extraction"
        );

        match request.extension.as_str() {
            "pdf" => self.pdf.extract(request).await,
            "md" | "html" | "docx" => self.extract_markdown(request).await,
            "csv" | "xlsx" => self.extract_tabular(request).await,
            _ => self.extract_plain(request).await,
        }
    }

    /// Markdown-bearing formats: parse, then move inline images to the store
    async fn extract_markdown(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        let parsed = self
            .parser
            .parse(&request.content, &request.extension, &request.encoding)
            .await?;
        let related_id = request.related_id().unwrap_or_default();
        let raw_text = self
            .rewriter
            .rewrite(&parsed.raw_text, &request.team_id, related_id)
            .await;

        Ok(ExtractionResult {
            raw_text,
            format_text: parsed.format_text,
            metadata: request.metadata.clone(),
        })
    }

    /// Tabular formats: Q/A imports keep the raw cell text, everything else
    /// trains on the formatted rendering.
    async fn extract_tabular(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        let parsed = self
            .parser
            .parse(&request.content, &request.extension, &request.encoding)
            .await?;

        let raw_text = if request.qa_import {
            parsed.raw_text
        } else {
            parsed.format_text.clone().unwrap_or(parsed.raw_text)
        };

        Ok(ExtractionResult {
            raw_text,
            format_text: parsed.format_text,
            metadata: request.metadata.clone(),
        })
    }

    async fn extract_plain(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        let parsed = self
            .parser
            .parse(&request.content, &request.extension, &request.encoding)
            .await?;

        Ok(ExtractionResult {
            raw_text: parsed.raw_text,
            format_text: parsed.format_text,
            metadata: request.metadata.clone(),
        })
    }
}
