//! Format-specific parsing provider
//!
//! Parsing of individual file formats is a collaborator concern: the pipeline
//! dispatches on extension and post-processes, but the per-format parser is
//! injected. `PlainTextParser` ships as the default for text-bearing formats
//! (txt/md/html/csv); deployments inject richer parsers for binary formats.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Output of a format parser
#[derive(Debug, Clone, Default)]
pub struct ParsedFormat {
    /// Raw extracted text
    pub raw_text: String,
    /// Pre-formatted tabular representation, for formats that have one
    pub format_text: Option<String>,
}

/// Trait for format-specific text extraction
#[async_trait]
pub trait FormatParser: Send + Sync {
    /// Extract text from a buffer of the declared extension and encoding
    async fn parse(&self, buffer: &[u8], extension: &str, encoding: &str) -> Result<ParsedFormat>;

    /// Get parser name for logging
    fn name(&self) -> &str;
}

/// Default parser for text-bearing formats
pub struct PlainTextParser;

impl PlainTextParser {
    /// Decode a buffer according to a detected encoding label
    fn decode(buffer: &[u8], encoding: &str) -> String {
        match encoding {
            "utf-16le" => {
                let body = buffer.get(2..).unwrap_or(&[]);
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            "utf-16be" => {
                let body = buffer.get(2..).unwrap_or(&[]);
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            "latin1" => buffer.iter().map(|&b| b as char).collect(),
            // utf-8, with or without BOM
            _ => {
                let body = buffer.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(buffer);
                String::from_utf8_lossy(body).into_owned()
            }
        }
    }

    /// Render CSV content as a markdown table
    fn csv_format_text(text: &str) -> Result<String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::file_parse("csv", e.to_string()))?;
            rows.push(record.iter().map(String::from).collect());
        }
        if rows.is_empty() {
            return Ok(String::new());
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut out = String::new();
        for (i, row) in rows.iter().enumerate() {
            out.push('|');
            for col in 0..width {
                out.push_str(row.get(col).map(String::as_str).unwrap_or(""));
                out.push('|');
            }
            out.push('\n');
            if i == 0 {
                out.push('|');
                for _ in 0..width {
                    out.push_str("---|");
                }
                out.push('\n');
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl FormatParser for PlainTextParser {
    async fn parse(&self, buffer: &[u8], extension: &str, encoding: &str) -> Result<ParsedFormat> {
        match extension {
            "txt" | "md" | "html" | "json" | "log" => Ok(ParsedFormat {
                raw_text: Self::decode(buffer, encoding),
                format_text: None,
            }),
            "csv" => {
                let raw_text = Self::decode(buffer, encoding);
                let format_text = Self::csv_format_text(&raw_text)?;
                Ok(ParsedFormat {
                    raw_text,
                    format_text: Some(format_text),
                })
            }
            other => Err(Error::UnsupportedFileType(other.to_string())),
        }
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decodes_utf8_with_bom() {
        let parser = PlainTextParser;
        let mut buffer = vec![0xEF, 0xBB, 0xBF];
        buffer.extend_from_slice("hello".as_bytes());
        let parsed = parser.parse(&buffer, "txt", "utf-8").await.unwrap();
        assert_eq!(parsed.raw_text, "hello");
    }

    #[tokio::test]
    async fn csv_produces_format_text() {
        let parser = PlainTextParser;
        let parsed = parser
            .parse(b"q,a\nwhat,that\n", "csv", "utf-8")
            .await
            .unwrap();
        let format_text = parsed.format_text.unwrap();
        assert!(format_text.starts_with("|q|a|\n|---|---|\n"));
        assert!(format_text.contains("|what|that|"));
        assert_eq!(parsed.raw_text, "q,a\nwhat,that\n");
    }

    #[tokio::test]
    async fn unsupported_extension_is_an_error() {
        let parser = PlainTextParser;
        let err = parser.parse(b"PK..", "docx", "utf-8").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(ext) if ext == "docx"));
    }

    #[tokio::test]
    async fn decodes_utf16le() {
        let parser = PlainTextParser;
        let mut buffer = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            buffer.extend_from_slice(&unit.to_le_bytes());
        }
        let parsed = parser.parse(&buffer, "txt", "utf-16le").await.unwrap();
        assert_eq!(parsed.raw_text, "hi");
    }
}
