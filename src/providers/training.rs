//! Training consumer wake-up provider

use async_trait::async_trait;

/// Trait for nudging the training consumer after a commit
#[async_trait]
pub trait TrainingDispatchProvider: Send + Sync {
    /// Notify the training consumer that new work is available.
    ///
    /// Idempotent and fire-and-forget: absence of a listener is not an error,
    /// and the call never fails the ingestion job.
    async fn wake(&self);

    /// Get provider name for logging
    fn name(&self) -> &str;
}
