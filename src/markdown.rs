//! Markdown image sideband
//!
//! Inline base64 images are moved out of markdown text into the image store,
//! and the text is rewritten to reference them by URL. Stored images carry a
//! short expiration until the ingestion commit clears it, so abandoned
//! extractions do not leak storage.

use base64::Engine;
use chrono::{Duration, Utc};
use regex::Regex;
use std::sync::Arc;
use tracing::error;

use crate::error::{Error, Result};
use crate::providers::ImageStoreProvider;

/// How long a side-uploaded image survives without a committing ingestion
const IMAGE_EXPIRY_HOURS: i64 = 2;

/// Rewrites inline markdown images into image-store references
pub struct MarkdownImageRewriter {
    image_store: Arc<dyn ImageStoreProvider>,
    inline_image: Regex,
}

impl MarkdownImageRewriter {
    pub fn new(image_store: Arc<dyn ImageStoreProvider>) -> Self {
        // ![alt](data:image/<fmt>;base64,<payload>)
        let inline_image =
            Regex::new(r"!\[([^\]]*)\]\(data:image/[a-zA-Z0-9.+-]+;base64,([A-Za-z0-9+/=\s]+)\)")
                .expect("inline image pattern is valid");
        Self {
            image_store,
            inline_image,
        }
    }

    /// Replace every inline base64 image in `text` with a stored reference.
    ///
    /// A failed upload degrades that one image to an empty reference and the
    /// rest of the text survives untouched.
    pub async fn rewrite(&self, text: &str, team_id: &str, related_id: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;

        for captures in self.inline_image.captures_iter(text) {
            let whole = captures.get(0).expect("capture group 0 always present");
            let alt = &captures[1];
            let payload: String = captures[2]
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();

            out.push_str(&text[last_end..whole.start()]);
            match self.upload(&payload, team_id, related_id).await {
                Ok(url) => out.push_str(&format!("![{alt}]({url})")),
                Err(e) => {
                    error!(related_id, error = %e, "inline image upload failed");
                    out.push_str(&format!("![{alt}]()"));
                }
            }
            last_end = whole.end();
        }
        out.push_str(&text[last_end..]);
        out
    }

    /// Store a single base64 image and return a markdown reference to it
    pub async fn image_ref(&self, base64_img: &str, team_id: &str, related_id: &str) -> Result<String> {
        let url = self.upload(base64_img, team_id, related_id).await?;
        Ok(format!("![]({url})"))
    }

    async fn upload(&self, base64_img: &str, team_id: &str, related_id: &str) -> Result<String> {
        if base64::engine::general_purpose::STANDARD
            .decode(base64_img)
            .is_err()
        {
            return Err(Error::ImageStore("invalid base64 image payload".to_string()));
        }
        let expires_at = Utc::now() + Duration::hours(IMAGE_EXPIRY_HOURS);
        self.image_store
            .upload_image(base64_img, team_id, related_id, expires_at)
            .await
    }
}
