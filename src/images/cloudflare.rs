// src/images/cloudflare.rs
//! Cloudflare Images client.

use super::ImageHost;
use crate::constants::{
    CLOUDFLARE_API_BASE_URL, CLOUDFLARE_DELIVERY_HOST, IMAGE_DOWNLOAD_TIMEOUT_SECS,
    IMAGE_DOWNLOAD_USER_AGENT, IMAGE_UPLOAD_TIMEOUT_SECS,
};
use crate::error::AppError;
use crate::types::CloudflareCredentials;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Uploads images to a Cloudflare Images account.
#[derive(Clone)]
pub struct CloudflareImages {
    upload_client: Client,
    download_client: Client,
    credentials: CloudflareCredentials,
    /// Needed only when a response lists no variants.
    account_hash: Option<String>,
    api_base: String,
}

/// Body of `POST /accounts/{account}/images/v1`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub result: Option<UploadedImage>,
    #[serde(default)]
    pub errors: Vec<CloudflareMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareMessage {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl CloudflareImages {
    pub fn new(
        credentials: CloudflareCredentials,
        account_hash: Option<String>,
    ) -> Result<Self, AppError> {
        Self::with_api_base(credentials, account_hash, CLOUDFLARE_API_BASE_URL)
    }

    pub fn with_api_base(
        credentials: CloudflareCredentials,
        account_hash: Option<String>,
        api_base: &str,
    ) -> Result<Self, AppError> {
        let upload_client = Client::builder()
            .timeout(Duration::from_secs(IMAGE_UPLOAD_TIMEOUT_SECS))
            .build()?;
        let download_client = Client::builder()
            .timeout(Duration::from_secs(IMAGE_DOWNLOAD_TIMEOUT_SECS))
            .user_agent(IMAGE_DOWNLOAD_USER_AGENT)
            .build()?;

        Ok(Self {
            upload_client,
            download_client,
            credentials,
            account_hash,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/accounts/{}/images/v1",
            self.api_base,
            self.credentials.account_id()
        )
    }
}

/// Chooses the URL to store for an uploaded image.
///
/// Prefers the `public` variant, then the first variant, then a delivery
/// URL built from the account hash and image id.
pub fn pick_delivery_url(image: &UploadedImage, account_hash: Option<&str>) -> Option<String> {
    if let Some(public) = image.variants.iter().find(|v| v.contains("/public")) {
        return Some(public.clone());
    }
    if let Some(first) = image.variants.first() {
        return Some(first.clone());
    }
    match (account_hash, image.id.as_deref()) {
        (Some(hash), Some(id)) if !hash.is_empty() && !id.is_empty() => Some(format!(
            "https://{}/{}/{}/public",
            CLOUDFLARE_DELIVERY_HOST, hash, id
        )),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ImageHost for CloudflareImages {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.download_client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::ImageHost(format!(
                "downloaded image is empty: {}",
                url
            )));
        }
        Ok(bytes.to_vec())
    }

    async fn upload(&self, bytes: Vec<u8>, image_id: Option<&str>) -> Result<String, AppError> {
        let file_name = image_id.unwrap_or("image.jpg").to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .upload_client
            .post(self.upload_url())
            .bearer_auth(self.credentials.api_token())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::ImageHost(format!("unreadable upload response ({}): {}", status, e))
        })?;

        if !status.is_success() || !parsed.success {
            let messages: Vec<String> = parsed
                .errors
                .iter()
                .map(|e| match e.code {
                    Some(code) => format!("{} ({})", e.message, code),
                    None => e.message.clone(),
                })
                .collect();
            return Err(AppError::ImageHost(format!(
                "upload rejected with {}: {}",
                status,
                messages.join("; ")
            )));
        }

        parsed
            .result
            .as_ref()
            .and_then(|image| pick_delivery_url(image, self.account_hash.as_deref()))
            .ok_or_else(|| AppError::ImageHost("upload response carried no image URL".into()))
    }
}
