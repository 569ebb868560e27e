//! Configuration for the ingestion pipeline
//!
//! All configuration is injected at construction time. Components never read
//! process-global state, so two pipelines with different settings can coexist
//! in one process (and in one test).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main ingestion pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Partition service configuration
    #[serde(default)]
    pub partition: PartitionConfig,
    /// Vision LLM configuration
    #[serde(default)]
    pub vision: VisionConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// File queue configuration
    #[serde(default)]
    pub queue: QueueConfig,
}

impl IngestConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }
}

/// Partition service (external document partitioner) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Base URL of the partition service
    pub base_url: String,
    /// Per-call HTTP timeout in seconds
    #[serde(default = "default_partition_timeout")]
    pub timeout_secs: u64,
    /// Layout-detection model requested from the service
    #[serde(default = "default_layout_model")]
    pub layout_model: String,
    /// Retry policy for connection-level failures
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: default_partition_timeout(),
            layout_model: default_layout_model(),
            retry: RetryPolicy::default(),
        }
    }
}

fn default_partition_timeout() -> u64 {
    100
}

fn default_layout_model() -> String {
    "yolox".to_string()
}

/// Retry strategy selector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetryStrategy {
    /// Exponential backoff up to a max elapsed ceiling
    #[default]
    Backoff,
    /// Fail on the first connection error
    None,
}

/// Exponential backoff retry policy
///
/// Applies to connection-level errors only. HTTP responses with error status
/// are terminal regardless of policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Strategy selector
    #[serde(default)]
    pub strategy: RetryStrategy,
    /// Initial sleep between attempts in milliseconds
    #[serde(default = "default_initial_interval")]
    pub initial_interval_ms: u64,
    /// Maximum sleep between attempts in milliseconds
    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,
    /// Ceiling on total retry time in milliseconds; once reached, the call
    /// fails permanently
    #[serde(default = "default_max_elapsed")]
    pub max_elapsed_ms: u64,
    /// Multiplier applied to the interval after each attempt
    #[serde(default = "default_exponent")]
    pub exponent: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            strategy: RetryStrategy::Backoff,
            initial_interval_ms: default_initial_interval(),
            max_interval_ms: default_max_interval(),
            max_elapsed_ms: default_max_elapsed(),
            exponent: default_exponent(),
        }
    }
}

fn default_initial_interval() -> u64 {
    500
}

fn default_max_interval() -> u64 {
    60_000
}

fn default_max_elapsed() -> u64 {
    300_000
}

fn default_exponent() -> f64 {
    1.5
}

impl RetryPolicy {
    /// Next sleep interval given the current one
    pub fn next_interval(&self, current: Duration) -> Duration {
        let next = current.mul_f64(self.exponent);
        next.min(Duration::from_millis(self.max_interval_ms))
    }

    /// Initial sleep interval
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    /// Total retry time ceiling
    pub fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }
}

/// Vision LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// OpenAI-compatible chat completions base URL
    pub base_url: String,
    /// API key, sent as a bearer token when non-empty
    #[serde(default)]
    pub api_key: String,
    /// Default model when the dataset does not pin one
    #[serde(default = "default_vision_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u64,
    /// Sampling temperature
    #[serde(default = "default_vision_temperature")]
    pub temperature: f32,
    /// Completion token cap
    #[serde(default = "default_vision_max_tokens")]
    pub max_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: String::new(),
            model: default_vision_model(),
            timeout_secs: default_vision_timeout(),
            temperature: default_vision_temperature(),
            max_tokens: default_vision_max_tokens(),
        }
    }
}

fn default_vision_model() -> String {
    "gemini-pro-vision".to_string()
}

fn default_vision_timeout() -> u64 {
    480
}

fn default_vision_temperature() -> f32 {
    0.1
}

fn default_vision_max_tokens() -> u32 {
    500
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Default target chunk size in characters
    pub chunk_size: usize,
    /// Overlap ratio for chunk-mode training
    pub overlap_ratio: f32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap_ratio: 0.2,
        }
    }
}

/// File queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum concurrent ingestion jobs
    pub concurrency: usize,
    /// Minimum spacing between job dispatches in milliseconds
    pub dispatch_interval_ms: u64,
    /// Bound on element-level describe fan-out within one job
    pub describe_concurrency: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            dispatch_interval_ms: 3000,
            describe_concurrency: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = IngestConfig::default();
        assert_eq!(config.queue.concurrency, 2);
        assert_eq!(config.queue.dispatch_interval_ms, 3000);
        assert_eq!(config.queue.describe_concurrency, 3);
        assert_eq!(config.partition.retry.strategy, RetryStrategy::Backoff);
        assert_eq!(config.chunking.chunk_size, 512);
    }

    #[test]
    fn backoff_interval_grows_and_caps() {
        let policy = RetryPolicy {
            strategy: RetryStrategy::Backoff,
            initial_interval_ms: 500,
            max_interval_ms: 1000,
            max_elapsed_ms: 10_000,
            exponent: 2.0,
        };
        let first = policy.initial_interval();
        let second = policy.next_interval(first);
        let third = policy.next_interval(second);
        assert_eq!(second, Duration::from_millis(1000));
        assert_eq!(third, Duration::from_millis(1000));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: IngestConfig = toml::from_str(
            r#"
            [partition]
            base_url = "http://partition.internal:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.partition.base_url, "http://partition.internal:8000");
        assert_eq!(config.partition.timeout_secs, 100);
        assert_eq!(config.partition.layout_model, "yolox");
        assert_eq!(config.vision.max_tokens, 500);
    }
}
