// src/images/resolver.rs
//! Memoized URL resolution for a whole sync run.

use super::{is_permanent_url, ImageHost};
use dashmap::DashMap;
use std::sync::Arc;

/// Turns image URLs into permanent ones, at most once per URL.
///
/// Resolution never fails: when the host is missing or an upload goes
/// wrong, the original URL comes back and the problem is logged.
#[derive(Clone)]
pub struct AssetResolver {
    host: Option<Arc<dyn ImageHost>>,
    resolved: Arc<DashMap<String, String>>,
}

impl AssetResolver {
    pub fn new(host: Arc<dyn ImageHost>) -> Self {
        Self {
            host: Some(host),
            resolved: Arc::new(DashMap::new()),
        }
    }

    /// A resolver that leaves every URL as it is.
    pub fn passthrough() -> Self {
        Self {
            host: None,
            resolved: Arc::new(DashMap::new()),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.host.is_none()
    }

    /// The permanent URL for `url`, uploading it under `image_id` if needed.
    pub async fn resolve(&self, url: &str, image_id: Option<&str>) -> String {
        if is_permanent_url(url) || url.trim().is_empty() {
            return url.to_string();
        }
        let Some(host) = &self.host else {
            return url.to_string();
        };
        if let Some(cached) = self.resolved.get(url) {
            return cached.value().clone();
        }

        let resolved = match host.download(url).await {
            Ok(bytes) => match host.upload(bytes, image_id).await {
                Ok(permanent) => {
                    log::info!("Uploaded image to {}", permanent);
                    permanent
                }
                Err(e) => {
                    log::warn!(
                        "Image upload failed, keeping original URL {}: {}",
                        preview(url),
                        e
                    );
                    url.to_string()
                }
            },
            Err(e) => {
                log::warn!(
                    "Image download failed, keeping original URL {}: {}",
                    preview(url),
                    e
                );
                url.to_string()
            }
        };

        self.resolved.insert(url.to_string(), resolved.clone());
        resolved
    }

    /// Number of distinct URLs looked at so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

/// Signed URLs are long; log only their head.
fn preview(url: &str) -> String {
    let head: String = url.chars().take(100).collect();
    if head.len() < url.len() {
        format!("{}...", head)
    } else {
        head
    }
}
