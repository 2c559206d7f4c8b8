//! Media Uploader
//!
//! Stores and deletes binary image content against the hosted image host.
//! An upload that the host refuses comes back with empty url/id; callers
//! must check before trusting the result. Deletions during cleanup are
//! best-effort.

use async_trait::async_trait;
use serde_json::Value;

use crate::issue::Image;
use crate::shared::error::Result;

mod cloudinary;

pub use cloudinary::CloudinaryMedia;

/// Result of an upload attempt. Both fields present means success; anything
/// else is a refusal the caller may skip.
#[derive(Debug, Clone, Default)]
pub struct UploadOutcome {
    pub url: Option<String>,
    pub public_id: Option<String>,
}

impl UploadOutcome {
    /// A stored image, only when the host returned both the retrieval URL
    /// and the deletion key.
    pub fn into_image(self) -> Option<Image> {
        match (self.url, self.public_id) {
            (Some(url), Some(public_id)) => Some(Image { url, public_id }),
            _ => None,
        }
    }
}

/// Binary object storage for issue photos.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload one image. Refusals are an empty [`UploadOutcome`], not an
    /// error; transport failures do error.
    async fn upload(&self, bytes: Vec<u8>, filename: &str, folder: &str) -> Result<UploadOutcome>;

    /// Delete by deletion key, returning the host's raw answer.
    async fn delete(&self, public_id: &str) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_needs_both_fields() {
        let full = UploadOutcome {
            url: Some("https://img/x.jpg".to_string()),
            public_id: Some("issues/x".to_string()),
        };
        assert!(full.into_image().is_some());

        let missing_id = UploadOutcome {
            url: Some("https://img/x.jpg".to_string()),
            public_id: None,
        };
        assert!(missing_id.into_image().is_none());
        assert!(UploadOutcome::default().into_image().is_none());
    }
}
