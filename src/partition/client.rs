//! HTTP client for the document partition service
//!
//! The service takes a file upload and returns a JSON array of structural
//! elements. Connection-level failures are retried with exponential backoff;
//! HTTP error responses are terminal.

use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::{PartitionConfig, RetryStrategy};
use crate::error::{Error, Result};
use crate::types::PartitionElement;

const PARTITION_PATH: &str = "/general/v0/general";

/// Client for the external partition service
pub struct PartitionClient {
    client: Client,
    config: PartitionConfig,
}

impl PartitionClient {
    /// Create a new partition client
    pub fn new(config: PartitionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Partition a document into structural elements.
    ///
    /// Header elements are dropped and an empty response body normalizes to
    /// an empty vector. Element order is the service's reading order.
    pub async fn partition(&self, filename: &str, data: &[u8]) -> Result<Vec<PartitionElement>> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            PARTITION_PATH
        );

        let policy = &self.config.retry;
        let started = Instant::now();
        let mut interval = policy.initial_interval();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.partition_once(&url, filename, data).await {
                Ok(elements) => {
                    debug!(
                        attempt,
                        elements = elements.len(),
                        "partition service returned elements"
                    );
                    return Ok(filter_elements(elements));
                }
                Err(e) if is_retryable(&e) && policy.strategy == RetryStrategy::Backoff => {
                    if started.elapsed() + interval > policy.max_elapsed() {
                        return Err(Error::partition(format!(
                            "gave up after {attempt} attempts over {:?}: {e}",
                            started.elapsed()
                        )));
                    }
                    warn!(attempt, retry_in = ?interval, error = %e, "partition request failed, retrying");
                    tokio::time::sleep(interval).await;
                    interval = policy.next_interval(interval);
                }
                Err(e) if is_retryable(&e) => {
                    return Err(Error::partition(format!("connection failed: {e}")));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn partition_once(
        &self,
        url: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<Vec<PartitionElement>> {
        let form = reqwest::multipart::Form::new()
            .part(
                "files",
                reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename.to_string()),
            )
            .text("strategy", "hi_res")
            .text("hi_res_model_name", self.config.layout_model.clone())
            .text("extract_image_block_types", r#"["image","table"]"#)
            .text("encoding", "utf-8");

        let response = self.client.post(url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::partition(format!("HTTP {status}: {body}")));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let elements: Vec<PartitionElement> = serde_json::from_str(&body)
            .map_err(|e| Error::partition(format!("invalid response body: {e}")))?;
        Ok(elements)
    }
}

/// Drop header elements, keeping the rest in reading order
fn filter_elements(elements: Vec<PartitionElement>) -> Vec<PartitionElement> {
    elements.into_iter().filter(|e| !e.is_header()).collect()
}

/// Connection-level failures are worth retrying; HTTP status errors are not
fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
        _ => false,
    }
}
