// src/images/mod.rs
//! Image hosting: moving images off expiring Notion URLs onto permanent ones.
//!
//! Notion serves uploaded files from signed S3 URLs that stop working after
//! about an hour. Anything the site keeps must point somewhere stable, so
//! such images are downloaded and re-uploaded to Cloudflare Images.

mod cloudflare;
mod resolver;

pub use cloudflare::{pick_delivery_url, CloudflareImages, UploadResponse, UploadedImage};
pub use resolver::AssetResolver;

use crate::constants::CLOUDFLARE_DELIVERY_HOST;
use crate::error::AppError;

/// Somewhere images can be fetched from and stored permanently.
#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError>;

    /// Stores `bytes` and returns their permanent public URL.
    async fn upload(&self, bytes: Vec<u8>, image_id: Option<&str>) -> Result<String, AppError>;
}

/// Whether `url` is already served by Cloudflare.
pub fn is_cloudflare_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    match url::Url::parse(url) {
        Ok(parsed) => parsed.host_str().is_some_and(|host| {
            host == CLOUDFLARE_DELIVERY_HOST
                || host.ends_with(".imagedelivery.net")
                || host == "cloudflare.com"
                || host.ends_with(".cloudflare.com")
        }),
        Err(_) => url.contains(CLOUDFLARE_DELIVERY_HOST) || url.contains("cloudflare.com"),
    }
}

/// Whether `url` can be stored as-is without expiring.
///
/// Signed S3 URLs (Notion-hosted files) expire; everything else, including
/// plain external links, is taken to be permanent. An empty URL is not.
pub fn is_permanent_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if url.contains("X-Amz-Expires") || url.contains("X-Amz-Signature") {
        return false;
    }
    if is_cloudflare_url(url) {
        return true;
    }
    let notion_hosted = url.contains("prod-files-secure.s3")
        || url.contains("secure.notion-static.com")
        || url.contains("notion-static.com");
    !(notion_hosted && url.contains("X-Amz-"))
}

/// Image id for a file attached to a page property:
/// `{dataset}-{first 16 hex of page id}-{file name}`.
pub fn property_image_id(dataset: &str, page_id: &str, file_name: &str) -> String {
    let name = file_name.trim();
    if name.is_empty() {
        body_image_id(dataset, page_id)
    } else {
        format!("{}-{}", body_image_id(dataset, page_id), name)
    }
}

/// Image id for an image block: `{dataset}-{first 16 hex of block id}`.
pub fn body_image_id(dataset: &str, owner_id: &str) -> String {
    let short: String = owner_id.chars().filter(|c| *c != '-').take(16).collect();
    format!("{}-{}", dataset, short)
}
