//! Vision LLM provider for image and table description

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::VisionConfig;
use crate::error::{Error, Result};

/// Trait for multimodal LLM calls that describe one image
///
/// Implementations:
/// - `OpenAiVision`: any OpenAI-compatible chat completions endpoint
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Describe an image given a text prompt and an inline data URL.
    ///
    /// `model` overrides the configured default when non-empty.
    async fn describe_image(&self, prompt: &str, image_url: &str, model: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// OpenAI-compatible vision provider over a chat completions endpoint
pub struct OpenAiVision {
    client: reqwest::Client,
    config: VisionConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiVision {
    /// Create a new vision provider
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build vision HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl VisionProvider for OpenAiVision {
    async fn describe_image(&self, prompt: &str, image_url: &str, model: &str) -> Result<String> {
        let model = if model.is_empty() {
            self.config.model.as_str()
        } else {
            model
        };

        let body = ChatRequest {
            model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::vision(format!("vision endpoint returned {status}: {text}")));
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "openai-vision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_content_parts() {
        let body = ChatRequest {
            model: "gemini-pro-vision",
            temperature: 0.1,
            max_tokens: 500,
            stream: false,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: "describe" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,aGk=",
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,aGk="
        );
    }

    #[test]
    fn response_tolerates_missing_content() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());

        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
