//! Image sideband store provider
//!
//! Side-uploaded images start life with an expiration so that failed or
//! abandoned extractions are garbage-collected. The commit step clears the
//! expiration once a training write references the images.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Trait for the persistent image store backing markdown rewrites
#[async_trait]
pub trait ImageStoreProvider: Send + Sync {
    /// Persist one base64 image and return the URL to reference it by.
    ///
    /// `related_id` ties the image to its originating extraction job;
    /// `expires_at` marks it for garbage collection until the commit step
    /// clears the marker.
    async fn upload_image(
        &self,
        base64_img: &str,
        team_id: &str,
        related_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
