use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::UploadsConfig;
use crate::services::{ImageHost, UploadedImage};

/// Unsigned-preset uploads against the Cloudinary HTTP API.
pub struct CloudinaryClient {
    client: Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorResponse {
    error: UploadErrorBody,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl CloudinaryClient {
    #[must_use]
    pub fn new(config: &UploadsConfig) -> Self {
        Self::with_shared_client(config, Client::new())
    }

    #[must_use]
    pub fn with_shared_client(config: &UploadsConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            upload_preset: config.upload_preset.clone(),
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    fn name(&self) -> &'static str {
        "Cloudinary"
    }

    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedImage> {
        let url = format!("{}/v1_1/{}/image/upload", self.base_url, self.cloud_name);

        debug!(filename, size = bytes.len(), "Uploading image");

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadErrorResponse>(&body)
                .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
            return Err(anyhow!("Upload rejected: {message}"));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .context("Invalid upload response body")?;

        info!(filename, url = %parsed.secure_url, "Image uploaded");

        Ok(UploadedImage {
            url: parsed.secure_url,
        })
    }
}
