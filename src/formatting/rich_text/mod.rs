// src/formatting/rich_text/mod.rs
//! Renders rich text runs as inline HTML.
//!
//! Every run is escaped exactly once, then wrapped in style tags, then in
//! its link. Runs are concatenated without separators.

mod annotations;

pub use annotations::{html_escape, HtmlStyleRenderer};

use crate::types::{RichTextItem, RichTextType};

/// Renders a sequence of rich text runs to inline HTML.
pub fn render_rich_text(items: &[RichTextItem]) -> String {
    items.iter().map(render_span).collect()
}

/// Renders one run. Runs with no text render as nothing.
pub fn render_span(item: &RichTextItem) -> String {
    let text = item.raw_text();
    if text.is_empty() {
        return String::new();
    }

    let escaped = match &item.text_type {
        RichTextType::Equation { .. } => {
            format!("<span class=\"equation\">{}</span>", html_escape(text))
        }
        RichTextType::Text { .. } | RichTextType::Mention(_) => html_escape(text),
    };

    HtmlStyleRenderer::apply_styles(&escaped, &item.annotations, item.link_url())
}
