// src/formatting/block_renderer.rs
//! Block tree rendering engine: converts a fetched block tree to HTML.
//!
//! Rendering is pure. Children must already be attached to their blocks
//! (see [`crate::api::BlockTreeFetcher`]). Images whose URLs would expire
//! come out as placeholder tokens listed in [`RenderedHtml::assets`], and
//! code blocks as tokens listed in [`RenderedHtml::code`].

use super::assets::{restore_code, AssetCollector, PendingAsset, ProtectedCode};
use super::html;
use crate::constants::{BLOCK_MAX_RENDER_DEPTH, CHARS_PER_BLOCK_ESTIMATE};
use crate::images::body_image_id;
use crate::model::Block;

// --- Core Types ---

/// Options for one render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Nesting level past which children are dropped.
    pub max_depth: usize,
    /// Dataset key used to name uploaded body images.
    pub image_id_prefix: Option<String>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            max_depth: BLOCK_MAX_RENDER_DEPTH,
            image_id_prefix: None,
        }
    }
}

impl RenderContext {
    pub fn for_dataset(dataset: &str) -> Self {
        Self {
            image_id_prefix: Some(dataset.to_string()),
            ..Self::default()
        }
    }
}

/// Markup plus the images still waiting for permanent URLs and the code
/// blocks held back from sanitizing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedHtml {
    pub html: String,
    pub assets: Vec<PendingAsset>,
    pub code: Vec<ProtectedCode>,
}

impl RenderedHtml {
    /// Puts this render's code blocks back into `html`.
    pub fn restore_code(&self, html: &str) -> String {
        restore_code(html, &self.code)
    }
}

// --- Public API ---

/// Renders a sequence of sibling blocks and everything below them.
pub fn render_blocks(blocks: &[Block], context: &RenderContext) -> RenderedHtml {
    log::debug!("Rendering {} top-level blocks", blocks.len());

    let mut renderer = TreeRenderer {
        context,
        assets: AssetCollector::new(),
        truncated: false,
    };
    let html = renderer.render_siblings(blocks, 0);
    if renderer.truncated {
        log::warn!(
            "Block tree deeper than {} levels; deeper content was dropped",
            context.max_depth
        );
    }

    let (assets, code) = renderer.assets.into_parts();
    RenderedHtml { html, assets, code }
}

// --- Tree walk ---

struct TreeRenderer<'a> {
    context: &'a RenderContext,
    assets: AssetCollector,
    truncated: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
}

fn list_kind(block: &Block) -> Option<ListKind> {
    match block {
        Block::BulletedListItem(_) => Some(ListKind::Bulleted),
        Block::NumberedListItem(_) => Some(ListKind::Numbered),
        _ => None,
    }
}

impl TreeRenderer<'_> {
    fn render_siblings(&mut self, blocks: &[Block], depth: usize) -> String {
        if depth > self.context.max_depth {
            self.truncated |= !blocks.is_empty();
            return String::new();
        }

        let mut fragments: Vec<String> = Vec::with_capacity(blocks.len());
        let mut cursor = 0;
        while cursor < blocks.len() {
            let block = &blocks[cursor];

            if let Some(kind) = list_kind(block) {
                let run = blocks[cursor..]
                    .iter()
                    .take_while(|b| list_kind(b) == Some(kind))
                    .count();
                fragments.push(self.render_list(&blocks[cursor..cursor + run], kind, depth));
                cursor += run;
                continue;
            }

            fragments.push(self.render_block(block, depth));
            if !block.owns_children() && !block.children().is_empty() {
                fragments.push(self.render_siblings(block.children(), depth + 1));
            }
            cursor += 1;
        }

        join_fragments(fragments)
    }

    fn render_list(&mut self, items: &[Block], kind: ListKind, depth: usize) -> String {
        let rendered: Vec<String> = items
            .iter()
            .map(|item| {
                let children = self.render_siblings(item.children(), depth + 1);
                match item {
                    Block::BulletedListItem(b) | Block::NumberedListItem(b) => {
                        html::list_item(&b.content, &children)
                    }
                    _ => String::new(),
                }
            })
            .collect();
        html::list(kind == ListKind::Numbered, &rendered)
    }

    fn render_block(&mut self, block: &Block, depth: usize) -> String {
        match block {
            Block::Toggle(toggle) => {
                let children = self.render_siblings(block.children(), depth + 1);
                html::toggle(toggle, &children)
            }
            Block::Table(table) => html::table(table, block.children()),
            Block::ColumnList(_) => {
                let columns: Vec<String> = block
                    .children()
                    .iter()
                    .filter(|child| matches!(child, Block::Column(_)))
                    .map(|column| {
                        let inner = self.render_siblings(column.children(), depth + 2);
                        html::column(&inner)
                    })
                    .collect();
                html::columns(&columns)
            }
            Block::Column(_) => {
                let inner = self.render_siblings(block.children(), depth + 1);
                html::column(&inner)
            }
            _ => {
                let image_id = match (block, &self.context.image_id_prefix) {
                    (Block::Image(_), Some(prefix)) => {
                        Some(body_image_id(prefix, block.id().as_str()))
                    }
                    _ => None,
                };
                html::render_leaf(block, &mut self.assets, image_id)
            }
        }
    }
}

fn join_fragments(fragments: Vec<String>) -> String {
    let mut output = String::with_capacity(fragments.len() * CHARS_PER_BLOCK_ESTIMATE);
    for fragment in fragments.into_iter().filter(|f| !f.is_empty()) {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&fragment);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageSource;
    use crate::types::RichTextItem;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Vec<RichTextItem> {
        vec![RichTextItem::plain_text(s)]
    }

    fn html_of(blocks: &[Block]) -> String {
        let rendered = render_blocks(blocks, &RenderContext::default());
        rendered.restore_code(&rendered.html)
    }

    #[test]
    fn coalesces_adjacent_list_items() {
        let blocks = vec![
            Block::paragraph(text("Hello <b>")),
            Block::bulleted_item(text("A")),
            Block::bulleted_item(text("B")),
        ];
        assert_eq!(
            html_of(&blocks),
            "<p>Hello &lt;b&gt;</p>\n<ul><li>A</li><li>B</li></ul>"
        );
    }

    #[test]
    fn different_list_kinds_start_new_lists() {
        let blocks = vec![
            Block::bulleted_item(text("a")),
            Block::numbered_item(text("1")),
            Block::numbered_item(text("2")),
            Block::paragraph(text("end")),
            Block::bulleted_item(text("b")),
        ];
        assert_eq!(
            html_of(&blocks),
            "<ul><li>a</li></ul>\n<ol><li>1</li><li>2</li></ol>\n<p>end</p>\n<ul><li>b</li></ul>"
        );
    }

    #[test]
    fn skipped_blocks_leave_no_blank_lines() {
        let blocks = vec![
            Block::paragraph(text("one")),
            Block::table_of_contents(),
            Block::unsupported("audio"),
            Block::paragraph(vec![]),
            Block::paragraph(text("two")),
        ];
        assert_eq!(html_of(&blocks), "<p>one</p>\n<p>two</p>");
    }

    #[test]
    fn plain_block_children_follow_the_parent() {
        let blocks = vec![Block::paragraph(text("parent"))
            .with_children(vec![Block::quote(text("child"))])];
        assert_eq!(
            html_of(&blocks),
            "<p>parent</p>\n<blockquote><p>child</p></blockquote>"
        );
    }

    #[test]
    fn empty_parent_still_renders_children() {
        let blocks = vec![Block::paragraph(vec![]).with_children(vec![Block::divider()])];
        assert_eq!(html_of(&blocks), "<hr />");
    }

    #[test]
    fn nested_lists_live_inside_their_item() {
        let blocks = vec![
            Block::bulleted_item(text("A")).with_children(vec![
                Block::numbered_item(text("A.1")),
                Block::numbered_item(text("A.2")),
            ]),
            Block::bulleted_item(text("B")),
        ];
        assert_eq!(
            html_of(&blocks),
            "<ul><li>A\n<ol><li>A.1</li><li>A.2</li></ol></li><li>B</li></ul>"
        );
    }

    #[test]
    fn toggles_consume_their_children() {
        let blocks = vec![Block::toggle(text("More"))
            .with_children(vec![Block::paragraph(text("hidden"))])];
        assert_eq!(
            html_of(&blocks),
            "<details><summary>More</summary><p>hidden</p></details>"
        );
    }

    #[test]
    fn column_lists_render_each_column() {
        let column = |s: &str| {
            Block::Column(Default::default()).with_children(vec![Block::paragraph(text(s))])
        };
        let blocks =
            vec![Block::ColumnList(Default::default()).with_children(vec![column("L"), column("R")])];
        assert_eq!(
            html_of(&blocks),
            "<div class=\"columns\"><div class=\"column\"><p>L</p></div><div class=\"column\"><p>R</p></div></div>"
        );
    }

    #[test]
    fn depth_guard_drops_deep_content() {
        let mut block = Block::paragraph(text("leaf"));
        for level in 0..5 {
            block = Block::paragraph(text(&format!("level {}", level))).with_children(vec![block]);
        }
        let context = RenderContext {
            max_depth: 2,
            image_id_prefix: None,
        };
        let rendered = render_blocks(&[block], &context);
        assert_eq!(rendered.html, "<p>level 4</p>\n<p>level 3</p>\n<p>level 2</p>");
    }

    #[test]
    fn expiring_images_become_pending_assets() {
        let signed = "https://prod-files-secure.s3.us-west-2.amazonaws.com/a.png?X-Amz-Expires=3600";
        let image = Block::image(ImageSource::Hosted {
            url: signed.to_string(),
            expiry_time: None,
        });
        let expected_id = body_image_id("note", image.id().as_str());

        let rendered = render_blocks(&[image], &RenderContext::for_dataset("note"));

        assert_eq!(
            rendered.html,
            format!(
                "<figure><img src=\"{}\" alt=\"\" loading=\"lazy\" /></figure>",
                rendered.assets[0].token
            )
        );
        assert_eq!(rendered.assets.len(), 1);
        assert_eq!(rendered.assets[0].url, signed);
        assert_eq!(rendered.assets[0].image_id.as_deref(), Some(expected_id.as_str()));
    }

    #[test]
    fn rendering_is_deterministic() {
        let blocks = vec![
            Block::heading(1, text("Title")),
            Block::code("python", "print('<hi>')"),
            Block::divider(),
        ];
        insta::assert_snapshot!(html_of(&blocks), @r###"
        <h1>Title</h1>
        <pre><code class="language-python">print(&#39;&lt;hi&gt;&#39;)</code></pre>
        <hr />
        "###);
    }
}
