// src/formatting/assets.rs
//! Two-pass handling of what a render cannot finish on its own.
//!
//! Rendering never performs I/O. When an image URL would expire, the
//! renderer writes a placeholder token into the `src` attribute and records
//! the URL here. [`resolve_assets`] later asks the [`AssetResolver`] for a
//! permanent URL for each one and swaps the tokens out.
//!
//! Code blocks are parked the same way: their markup is replaced by a token
//! so that sanitizing never sees it, and [`restore_code`] puts it back.
//!
//! Tokens are wrapped in private-use characters and carry a per-render
//! nonce, so page text can never spell one.

use super::rich_text::html_escape;
use crate::images::{is_permanent_url, AssetResolver};
use uuid::Uuid;

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// An image URL waiting to be made permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAsset {
    pub token: String,
    pub url: String,
    /// Id the uploaded image should be stored under.
    pub image_id: Option<String>,
}

/// A code block's finished markup, held back from sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedCode {
    pub token: String,
    pub html: String,
}

/// Collects pending assets and protected code during one render.
#[derive(Debug)]
pub struct AssetCollector {
    nonce: String,
    pending: Vec<PendingAsset>,
    code: Vec<ProtectedCode>,
}

impl Default for AssetCollector {
    fn default() -> Self {
        Self {
            nonce: Uuid::new_v4().as_simple().to_string(),
            pending: Vec::new(),
            code: Vec::new(),
        }
    }
}

impl AssetCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn token(&self, kind: &str, index: usize) -> String {
        format!("{}{}-{}-{}{}", TOKEN_OPEN, kind, self.nonce, index, TOKEN_CLOSE)
    }

    /// The attribute-ready value to put in `src` for `url`.
    ///
    /// Permanent URLs are escaped and used directly; anything else gets a
    /// placeholder token. The same URL always maps to the same token.
    pub fn src_for(&mut self, url: &str, image_id: Option<String>) -> String {
        if is_permanent_url(url) || url.trim().is_empty() {
            return html_escape(url);
        }
        if let Some(existing) = self.pending.iter().find(|a| a.url == url) {
            return existing.token.clone();
        }
        let token = self.token("img", self.pending.len());
        self.pending.push(PendingAsset {
            token: token.clone(),
            url: url.to_string(),
            image_id,
        });
        token
    }

    /// Parks a code block's markup and returns the token standing in for it.
    pub fn protect_code(&mut self, html: String) -> String {
        let token = self.token("code", self.code.len());
        self.code.push(ProtectedCode {
            token: token.clone(),
            html,
        });
        token
    }

    pub fn into_parts(self) -> (Vec<PendingAsset>, Vec<ProtectedCode>) {
        (self.pending, self.code)
    }
}

/// Replaces each placeholder `src` in `html` with its resolved URL.
pub async fn resolve_assets(html: &str, assets: &[PendingAsset], resolver: &AssetResolver) -> String {
    let mut output = html.to_string();
    for asset in assets {
        let resolved = resolver.resolve(&asset.url, asset.image_id.as_deref()).await;
        output = output.replace(
            &format!("src=\"{}\"", asset.token),
            &format!("src=\"{}\"", html_escape(&resolved)),
        );
    }
    output
}

/// Puts parked code blocks back in place of their tokens.
pub fn restore_code(html: &str, code: &[ProtectedCode]) -> String {
    code.iter()
        .fold(html.to_string(), |output, block| output.replace(&block.token, &block.html))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED: &str = "https://prod-files-secure.s3.amazonaws.com/a.png?X-Amz-Expires=1&b=2";

    #[test]
    fn permanent_urls_are_emitted_directly() {
        let mut collector = AssetCollector::new();
        assert_eq!(
            collector.src_for("https://e.com/a.png?x=1&y=2", None),
            "https://e.com/a.png?x=1&amp;y=2"
        );
        let (pending, _) = collector.into_parts();
        assert!(pending.is_empty());
    }

    #[test]
    fn expiring_urls_get_stable_tokens() {
        let mut collector = AssetCollector::new();
        let first = collector.src_for(SIGNED, Some("note-1".into()));
        let again = collector.src_for(SIGNED, None);
        assert_eq!(first, again);
        assert!(first.starts_with(TOKEN_OPEN) && first.ends_with(TOKEN_CLOSE));
        assert_eq!(collector.into_parts().0.len(), 1);
    }

    #[test]
    fn tokens_differ_between_renders() {
        let first = AssetCollector::new().src_for(SIGNED, None);
        let second = AssetCollector::new().src_for(SIGNED, None);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn passthrough_resolution_restores_originals() {
        let mut collector = AssetCollector::new();
        let token = collector.src_for(SIGNED, None);
        let html = format!("<img src=\"{}\" />", token);
        let (pending, _) = collector.into_parts();

        let resolved = resolve_assets(&html, &pending, &AssetResolver::passthrough()).await;
        assert_eq!(
            resolved,
            "<img src=\"https://prod-files-secure.s3.amazonaws.com/a.png?X-Amz-Expires=1&amp;b=2\" />"
        );
    }

    #[tokio::test]
    async fn only_src_attributes_are_substituted() {
        let mut collector = AssetCollector::new();
        let token = collector.src_for(SIGNED, None);
        let html = format!("<p>{0}</p><img src=\"{0}\" />", token);
        let (pending, _) = collector.into_parts();

        let resolved = resolve_assets(&html, &pending, &AssetResolver::passthrough()).await;
        assert!(resolved.starts_with(&format!("<p>{}</p>", token)));
        assert!(!resolved.ends_with(&format!("src=\"{}\" />", token)));
    }

    #[test]
    fn parked_code_comes_back_verbatim() {
        let mut collector = AssetCollector::new();
        let markup = "<pre><code><pre>a</pre>\n\n\n\n<hr><hr></code></pre>".to_string();
        let token = collector.protect_code(markup.clone());
        let (_, code) = collector.into_parts();

        assert_eq!(restore_code(&format!("<p>x</p>\n{}", token), &code), format!("<p>x</p>\n{}", markup));
    }
}
