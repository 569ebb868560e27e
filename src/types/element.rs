//! Partitioned document elements
//!
//! One element is one structural unit of a partitioned document (paragraph,
//! image, table, header), as returned by the partition service.

use serde::{Deserialize, Serialize};

/// A structural element produced by the partition service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionElement {
    /// Element type as reported by the service ("Header", "Image", "Table",
    /// "NarrativeText", ...)
    #[serde(rename = "type")]
    pub element_type: String,
    /// Extracted text for this element
    #[serde(default)]
    pub text: String,
    /// Service-assigned element id, when present
    #[serde(default)]
    pub element_id: Option<String>,
    /// Element metadata
    #[serde(default)]
    pub metadata: ElementMetadata,
}

/// Metadata attached to a partition element
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Base64-carried embedded image payload (images and tables)
    #[serde(default)]
    pub image_base64: Option<String>,
    /// Detected languages, most confident first
    #[serde(default)]
    pub languages: Vec<String>,
}

impl PartitionElement {
    /// Header elements are discarded before any further processing
    pub fn is_header(&self) -> bool {
        self.element_type == "Header"
    }

    /// Whether the describe stage should rewrite this element's text:
    /// image or table type, non-trivial original text, embedded image present.
    pub fn qualifies_for_description(&self) -> bool {
        matches!(self.element_type.as_str(), "Image" | "Table")
            && self.text.chars().count() >= 2
            && self
                .metadata
                .image_base64
                .as_deref()
                .is_some_and(|b64| !b64.is_empty())
    }

    /// Most confident detected language, if any
    pub fn primary_language(&self) -> Option<&str> {
        self.metadata.languages.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(element_type: &str, text: &str, image: Option<&str>) -> PartitionElement {
        PartitionElement {
            element_type: element_type.to_string(),
            text: text.to_string(),
            element_id: None,
            metadata: ElementMetadata {
                image_base64: image.map(String::from),
                languages: vec![],
            },
        }
    }

    #[test]
    fn describe_predicate() {
        assert!(element("Image", "fig", Some("aGk=")).qualifies_for_description());
        assert!(element("Table", "t1", Some("aGk=")).qualifies_for_description());
        // too-short text
        assert!(!element("Image", "x", Some("aGk=")).qualifies_for_description());
        // no embedded image
        assert!(!element("Image", "fig", None).qualifies_for_description());
        assert!(!element("Image", "fig", Some("")).qualifies_for_description());
        // wrong type
        assert!(!element("NarrativeText", "some text", Some("aGk=")).qualifies_for_description());
    }

    #[test]
    fn deserializes_service_json() {
        let json = r#"{
            "type": "Image",
            "text": "Figure 1",
            "element_id": "abc123",
            "metadata": {"image_base64": "aGVsbG8=", "languages": ["eng", "fra"]}
        }"#;
        let element: PartitionElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.element_type, "Image");
        assert_eq!(element.primary_language(), Some("eng"));
        assert!(element.qualifies_for_description());
    }

    #[test]
    fn missing_metadata_defaults() {
        let json = r#"{"type": "Title", "text": "Intro"}"#;
        let element: PartitionElement = serde_json::from_str(json).unwrap();
        assert!(element.metadata.image_base64.is_none());
        assert!(element.primary_language().is_none());
    }
}
