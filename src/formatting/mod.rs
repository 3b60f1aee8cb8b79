// src/formatting/mod.rs
//! Renders Notion block trees into the HTML stored in exported records.

// Sub-modules
pub mod assets;
pub mod block_renderer;
pub mod html;
pub mod rich_text;
pub mod sanitize;

pub use self::block_renderer::{render_blocks, RenderContext, RenderedHtml};
pub use self::sanitize::{sanitize, sanitize_markup, TrackingPixelRules};

use crate::images::AssetResolver;
use crate::model::Block;

// --- Page body rendering (top-level entry point) ---

/// Renders a fetched block tree to final, sanitized HTML.
///
/// Images with expiring URLs are resolved through `resolver`; with a
/// pass-through resolver they keep their original URLs. Code blocks skip
/// sanitizing and come back byte for byte.
pub async fn render_content(
    blocks: &[Block],
    context: &RenderContext,
    rules: &TrackingPixelRules,
    resolver: &AssetResolver,
) -> String {
    let rendered = render_blocks(blocks, context);
    log::debug!(
        "Rendered {} bytes with {} pending images",
        rendered.html.len(),
        rendered.assets.len()
    );
    let resolved = assets::resolve_assets(&rendered.html, &rendered.assets, resolver).await;
    let cleaned = sanitize(&resolved, rules, resolver).await;
    rendered.restore_code(&cleaned)
}
