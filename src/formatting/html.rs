// src/formatting/html.rs
//! HTML fragments for single blocks.
//!
//! Nothing here recurses: container kinds receive their children already
//! rendered. A block with nothing to show yields an empty string, which the
//! tree walker drops.

use super::assets::AssetCollector;
use super::rich_text::{html_escape, render_rich_text};
use crate::model::blocks::*;
use crate::model::Block;
use crate::types::plain_text_of;

/// Code languages whose source is emitted verbatim instead of escaped.
const MARKUP_LANGUAGES: &[&str] = &["html", "xml", "svg", "markup"];

/// Fragment for a block that does not own its children.
///
/// `image_id` names the upload for image blocks; other kinds ignore it.
pub fn render_leaf(block: &Block, assets: &mut AssetCollector, image_id: Option<String>) -> String {
    match block {
        Block::Paragraph(b) => wrap_inline("p", &b.content),
        Block::Heading1(b) => wrap_inline("h1", &b.content),
        Block::Heading2(b) => wrap_inline("h2", &b.content),
        Block::Heading3(b) => wrap_inline("h3", &b.content),
        Block::Quote(b) => {
            let inline = render_rich_text(&b.content.rich_text);
            if inline.is_empty() {
                String::new()
            } else {
                format!("<blockquote><p>{}</p></blockquote>", inline)
            }
        }
        Block::Callout(b) => callout(b),
        Block::ToDo(b) => to_do(b),
        Block::Code(b) => code(b, assets),
        Block::Image(b) => image(b, assets, image_id),
        Block::Divider(_) => "<hr />".to_string(),
        Block::Bookmark(b) | Block::LinkPreview(b) => bookmark(b),
        Block::Embed(b) => embed(b),
        // Rendered by their parents, or not at all.
        Block::TableOfContents(_)
        | Block::TableRow(_)
        | Block::Unsupported(_)
        | Block::Toggle(_)
        | Block::Table(_)
        | Block::ColumnList(_)
        | Block::Column(_)
        | Block::BulletedListItem(_)
        | Block::NumberedListItem(_) => String::new(),
    }
}

fn wrap_inline(tag: &str, content: &TextBlockContent) -> String {
    let inline = render_rich_text(&content.rich_text);
    if inline.is_empty() {
        String::new()
    } else {
        format!("<{tag}>{inline}</{tag}>")
    }
}

fn callout(block: &CalloutBlock) -> String {
    let inline = render_rich_text(&block.content.rich_text);
    if inline.is_empty() {
        return String::new();
    }
    let icon = match &block.icon {
        Some(Icon::Emoji(emoji)) if !emoji.is_empty() => {
            format!("<span class=\"callout-icon\">{}</span>", html_escape(emoji))
        }
        _ => String::new(),
    };
    format!("<div class=\"callout\">{}<p>{}</p></div>", icon, inline)
}

fn to_do(block: &ToDoBlock) -> String {
    let inline = render_rich_text(&block.content.rich_text);
    if inline.is_empty() {
        return String::new();
    }
    let checked = if block.checked { " checked" } else { "" };
    format!(
        "<div class=\"todo\"><input type=\"checkbox\" disabled{} /> {}</div>",
        checked, inline
    )
}

/// Code markup is parked in `assets` and only a token is returned.
fn code(block: &CodeBlock, assets: &mut AssetCollector) -> String {
    let source = plain_text_of(&block.content.rich_text);
    if source.is_empty() {
        return String::new();
    }

    let language = block.language.trim().to_lowercase();
    let body = if MARKUP_LANGUAGES.contains(&language.as_str()) {
        source
    } else {
        html_escape(&source)
    };

    let class = match language.as_str() {
        "" => String::new(),
        lang => format!(" class=\"language-{}\"", html_escape(&lang.replace(' ', "-"))),
    };
    assets.protect_code(format!("<pre><code{}>{}</code></pre>", class, body))
}

fn image(block: &ImageBlock, assets: &mut AssetCollector, image_id: Option<String>) -> String {
    let url = block.source.url();
    if url.trim().is_empty() {
        return String::new();
    }
    let src = assets.src_for(url, image_id);
    let alt = html_escape(plain_text_of(&block.caption).trim());
    let caption = render_rich_text(&block.caption);
    let figcaption = if caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", caption)
    };
    format!(
        "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\" />{}</figure>",
        src, alt, figcaption
    )
}

fn bookmark(block: &LinkBlock) -> String {
    if block.url.trim().is_empty() {
        return String::new();
    }
    let caption = render_rich_text(&block.caption);
    let label = if caption.is_empty() {
        html_escape(&block.url)
    } else {
        caption
    };
    format!(
        "<p class=\"bookmark\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></p>",
        html_escape(&block.url),
        label
    )
}

fn embed(block: &LinkBlock) -> String {
    if block.url.trim().is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"embed\"><iframe src=\"{}\" loading=\"lazy\"></iframe></div>",
        html_escape(&block.url)
    )
}

/// `<details>` with the toggle's text as summary.
pub fn toggle(block: &TextBlock, children_html: &str) -> String {
    let summary = render_rich_text(&block.content.rich_text);
    if summary.is_empty() && children_html.is_empty() {
        return String::new();
    }
    format!(
        "<details><summary>{}</summary>{}</details>",
        summary, children_html
    )
}

/// One `<li>`; children go inside it after the item's own text.
pub fn list_item(content: &TextBlockContent, children_html: &str) -> String {
    let inline = render_rich_text(&content.rich_text);
    match (inline.is_empty(), children_html.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("<li>{}</li>", inline),
        (true, false) => format!("<li>{}</li>", children_html),
        (false, false) => format!("<li>{}\n{}</li>", inline, children_html),
    }
}

/// Wraps rendered `<li>` items in one list container.
pub fn list(ordered: bool, items: &[String]) -> String {
    let body: String = items.iter().filter(|i| !i.is_empty()).map(String::as_str).collect();
    if body.is_empty() {
        return String::new();
    }
    let tag = if ordered { "ol" } else { "ul" };
    format!("<{tag}>{body}</{tag}>")
}

/// A table built from its `table_row` children; other children are ignored.
pub fn table(block: &TableBlock, rows: &[Block]) -> String {
    let mut html = String::new();
    let mut row_index = 0;
    for row in rows {
        let Block::TableRow(row) = row else {
            continue;
        };
        html.push_str("<tr>");
        for (col_index, cell) in row.cells.iter().enumerate() {
            let header = (block.has_column_header && row_index == 0)
                || (block.has_row_header && col_index == 0);
            let tag = if header { "th" } else { "td" };
            html.push_str(&format!("<{tag}>{}</{tag}>", render_rich_text(cell)));
        }
        html.push_str("</tr>");
        row_index += 1;
    }
    if row_index == 0 {
        return String::new();
    }
    format!("<table>{}</table>", html)
}

/// One column's rendered content.
pub fn column(children_html: &str) -> String {
    format!("<div class=\"column\">{}</div>", children_html)
}

/// Side-by-side columns.
pub fn columns(rendered_columns: &[String]) -> String {
    if rendered_columns.is_empty() {
        return String::new();
    }
    format!("<div class=\"columns\">{}</div>", rendered_columns.concat())
}
