use super::blocks::*;
use super::common::BlockCommon;
use crate::types::{BlockId, RichTextItem};
use serde::{Deserialize, Serialize};

/// Macro to reduce boilerplate in Block enum methods
macro_rules! match_all_blocks {
    ($self:expr, $pattern:pat => $result:expr) => {
        match $self {
            Block::Paragraph($pattern) => $result,
            Block::Heading1($pattern) => $result,
            Block::Heading2($pattern) => $result,
            Block::Heading3($pattern) => $result,
            Block::BulletedListItem($pattern) => $result,
            Block::NumberedListItem($pattern) => $result,
            Block::Quote($pattern) => $result,
            Block::Toggle($pattern) => $result,
            Block::ToDo($pattern) => $result,
            Block::Callout($pattern) => $result,
            Block::Code($pattern) => $result,
            Block::Image($pattern) => $result,
            Block::Divider($pattern) => $result,
            Block::TableOfContents($pattern) => $result,
            Block::Table($pattern) => $result,
            Block::TableRow($pattern) => $result,
            Block::ColumnList($pattern) => $result,
            Block::Column($pattern) => $result,
            Block::Bookmark($pattern) => $result,
            Block::LinkPreview($pattern) => $result,
            Block::Embed($pattern) => $result,
            Block::Unsupported($pattern) => $result,
        }
    };
}

/// One node of a Notion page body, restricted to the kinds the site renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    Quote(TextBlock),
    Toggle(TextBlock),
    ToDo(ToDoBlock),
    Callout(CalloutBlock),
    Code(CodeBlock),
    Image(ImageBlock),
    Divider(StructuralBlock),
    TableOfContents(StructuralBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    ColumnList(StructuralBlock),
    Column(StructuralBlock),
    Bookmark(LinkBlock),
    LinkPreview(LinkBlock),
    Embed(LinkBlock),
    Unsupported(UnsupportedBlock),
}

impl Block {
    pub fn id(&self) -> &BlockId {
        match_all_blocks!(self, b => &b.common.id)
    }

    pub fn children(&self) -> &[Block] {
        match_all_blocks!(self, b => &b.common.children)
    }

    pub fn has_children(&self) -> bool {
        self.common().has_children
    }

    pub fn common(&self) -> &BlockCommon {
        match_all_blocks!(self, b => &b.common)
    }

    pub fn common_mut(&mut self) -> &mut BlockCommon {
        match_all_blocks!(self, b => &mut b.common)
    }

    pub fn set_children(&mut self, children: Vec<Block>) {
        self.common_mut().children = children;
    }

    /// Attaches children and flags the block as having them.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        let common = self.common_mut();
        common.has_children = !children.is_empty();
        common.children = children;
        self
    }

    /// Notion's wire name for this block kind.
    pub fn block_type(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading1(_) => "heading_1",
            Block::Heading2(_) => "heading_2",
            Block::Heading3(_) => "heading_3",
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::Quote(_) => "quote",
            Block::Toggle(_) => "toggle",
            Block::ToDo(_) => "to_do",
            Block::Callout(_) => "callout",
            Block::Code(_) => "code",
            Block::Image(_) => "image",
            Block::Divider(_) => "divider",
            Block::TableOfContents(_) => "table_of_contents",
            Block::Table(_) => "table",
            Block::TableRow(_) => "table_row",
            Block::ColumnList(_) => "column_list",
            Block::Column(_) => "column",
            Block::Bookmark(_) => "bookmark",
            Block::LinkPreview(_) => "link_preview",
            Block::Embed(_) => "embed",
            Block::Unsupported(b) => &b.block_type,
        }
    }

    /// Whether the block renders its own children inside its markup.
    ///
    /// Everything else gets its children rendered right after it.
    pub fn owns_children(&self) -> bool {
        matches!(
            self,
            Block::Toggle(_)
                | Block::Table(_)
                | Block::ColumnList(_)
                | Block::Column(_)
                | Block::BulletedListItem(_)
                | Block::NumberedListItem(_)
        )
    }
}

// --- Construction helpers ---

fn text(rich_text: Vec<RichTextItem>) -> TextBlock {
    TextBlock {
        common: BlockCommon::default(),
        content: TextBlockContent::new(rich_text),
    }
}

impl Block {
    pub fn paragraph(rich_text: Vec<RichTextItem>) -> Self {
        Block::Paragraph(text(rich_text))
    }

    /// Heading at `level` 1..=3; anything deeper is clamped to 3.
    pub fn heading(level: u8, rich_text: Vec<RichTextItem>) -> Self {
        match level {
            0 | 1 => Block::Heading1(text(rich_text)),
            2 => Block::Heading2(text(rich_text)),
            _ => Block::Heading3(text(rich_text)),
        }
    }

    pub fn bulleted_item(rich_text: Vec<RichTextItem>) -> Self {
        Block::BulletedListItem(text(rich_text))
    }

    pub fn numbered_item(rich_text: Vec<RichTextItem>) -> Self {
        Block::NumberedListItem(text(rich_text))
    }

    pub fn quote(rich_text: Vec<RichTextItem>) -> Self {
        Block::Quote(text(rich_text))
    }

    pub fn toggle(rich_text: Vec<RichTextItem>) -> Self {
        Block::Toggle(text(rich_text))
    }

    pub fn to_do(rich_text: Vec<RichTextItem>, checked: bool) -> Self {
        Block::ToDo(ToDoBlock {
            common: BlockCommon::default(),
            content: TextBlockContent::new(rich_text),
            checked,
        })
    }

    pub fn code(language: &str, source: &str) -> Self {
        Block::Code(CodeBlock {
            common: BlockCommon::default(),
            language: language.to_string(),
            caption: Vec::new(),
            content: TextBlockContent::new(vec![RichTextItem::plain_text(source)]),
        })
    }

    pub fn image(source: ImageSource) -> Self {
        Block::Image(ImageBlock {
            common: BlockCommon::default(),
            source,
            caption: Vec::new(),
        })
    }

    pub fn divider() -> Self {
        Block::Divider(StructuralBlock::default())
    }

    pub fn table_of_contents() -> Self {
        Block::TableOfContents(StructuralBlock::default())
    }

    pub fn unsupported(block_type: &str) -> Self {
        Block::Unsupported(UnsupportedBlock {
            common: BlockCommon::default(),
            block_type: block_type.to_string(),
        })
    }
}
