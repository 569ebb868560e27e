//! Element-level description fan-out
//!
//! Qualifying image and table elements have their text replaced by a vision
//! LLM description plus a markdown reference to the side-uploaded image. Both
//! sub-calls are fault-isolated: either one failing degrades to an empty
//! string for that element, never failing the extraction.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

use crate::markdown::MarkdownImageRewriter;
use crate::providers::VisionProvider;

use super::prompt::render_description_prompt;
use crate::types::PartitionElement;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Context for one describe pass
#[derive(Debug, Clone)]
pub struct DescribeContext {
    pub team_id: String,
    pub related_id: String,
    /// Vision model to use for this pass
    pub model: String,
}

/// Rewrites qualifying elements through the vision LLM and image sideband
pub struct ElementDescriber {
    vision: Arc<dyn VisionProvider>,
    rewriter: Arc<MarkdownImageRewriter>,
    concurrency: usize,
}

impl ElementDescriber {
    pub fn new(
        vision: Arc<dyn VisionProvider>,
        rewriter: Arc<MarkdownImageRewriter>,
        concurrency: usize,
    ) -> Self {
        Self {
            vision,
            rewriter,
            concurrency: concurrency.max(1),
        }
    }

    /// Describe all qualifying elements, preserving input order.
    ///
    /// At most `concurrency` elements are in flight at once.
    pub async fn describe(
        &self,
        elements: Vec<PartitionElement>,
        ctx: &DescribeContext,
    ) -> Vec<PartitionElement> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let futures = elements.into_iter().map(|mut element| {
            let semaphore = semaphore.clone();
            async move {
                if !element.qualifies_for_description() {
                    return element;
                }
                let _permit = semaphore.acquire().await.unwrap();
                element.text = self.describe_one(&element, ctx).await;
                element
            }
        });

        futures::future::join_all(futures).await
    }

    /// Run both sub-calls for one element and assemble its replacement text
    async fn describe_one(&self, element: &PartitionElement, ctx: &DescribeContext) -> String {
        // qualifies_for_description guarantees the payload is present
        let base64_img = element.metadata.image_base64.as_deref().unwrap_or_default();
        let prompt = render_description_prompt(element.primary_language(), &element.text);
        let image_url = format!("{DATA_URL_PREFIX}{base64_img}");

        let (description, image_ref) = tokio::join!(
            self.vision.describe_image(&prompt, &image_url, &ctx.model),
            self.rewriter
                .image_ref(base64_img, &ctx.team_id, &ctx.related_id),
        );

        let description = description.unwrap_or_else(|e| {
            error!(related_id = %ctx.related_id, error = %e, "vision description failed");
            String::new()
        });
        let image_ref = image_ref.unwrap_or_else(|e| {
            error!(related_id = %ctx.related_id, error = %e, "image sideband upload failed");
            String::new()
        });

        format!("{description}{image_ref}\n")
    }
}
