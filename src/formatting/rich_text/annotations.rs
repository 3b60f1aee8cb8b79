// src/formatting/rich_text/annotations.rs
//! Annotation processing for rich text.
//!
//! Styles wrap already-escaped text in a fixed order, innermost first:
//! bold, italic, code, underline, strikethrough, then the link.

use crate::types::Annotations;

/// Renderer for text styles to HTML.
pub struct HtmlStyleRenderer;

impl HtmlStyleRenderer {
    /// Wraps `escaped` in the tags its annotations call for.
    ///
    /// `escaped` must already be HTML-escaped. Inline code replaces bold and
    /// italic: it wraps the escaped text alone, not the styled result.
    pub fn apply_styles(escaped: &str, annotations: &Annotations, link: Option<&str>) -> String {
        let mut result = escaped.to_string();

        if annotations.bold {
            result = format!("<strong>{}</strong>", result);
        }

        if annotations.italic {
            result = format!("<em>{}</em>", result);
        }

        if annotations.code {
            result = format!("<code>{}</code>", escaped);
        }

        if annotations.underline {
            result = format!("<u>{}</u>", result);
        }

        if annotations.strikethrough {
            result = format!("<s>{}</s>", result);
        }

        if let Some(url) = link {
            result = format!("<a href=\"{}\">{}</a>", html_escape(url), result);
        }

        result
    }
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
