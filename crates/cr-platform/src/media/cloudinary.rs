//! Cloudinary-backed [`MediaStore`].

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{MediaStore, UploadOutcome};
use crate::shared::error::Result;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CloudinaryMedia {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryMedia {
    pub fn new(
        http: reqwest::Client,
        cloud_name: impl AsRef<str>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: format!("https://api.cloudinary.com/v1_1/{}", cloud_name.as_ref()),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Point the client at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MediaStore for CloudinaryMedia {
    async fn upload(&self, bytes: Vec<u8>, filename: &str, folder: &str) -> Result<UploadOutcome> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        let response = self
            .http
            .post(format!("{}/image/upload", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;

        let body: Value = response.json().await.unwrap_or(Value::Null);
        Ok(UploadOutcome {
            url: body
                .get("secure_url")
                .and_then(Value::as_str)
                .map(String::from),
            public_id: body
                .get("public_id")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<Value> {
        let response = self
            .http
            .delete(format!("{}/resources/image/upload", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", public_id)])
            .send()
            .await?;

        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| serde_json::json!({ "text": body })))
    }
}
