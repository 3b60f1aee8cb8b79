use super::common::BlockCommon;
use crate::types::RichTextItem;
use serde::{Deserialize, Serialize};

/// Inline content of a text-bearing block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlockContent {
    pub rich_text: Vec<RichTextItem>,
}

impl TextBlockContent {
    pub fn new(rich_text: Vec<RichTextItem>) -> Self {
        Self { rich_text }
    }
}

/// Paragraphs, headings, list items, quotes and toggles: an id and some text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// To-do block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToDoBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub checked: bool,
}

/// Callout block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalloutBlock {
    pub common: BlockCommon,
    pub icon: Option<Icon>,
    pub content: TextBlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Icon {
    Emoji(String),
    Image { url: String },
}

/// Code block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeBlock {
    pub common: BlockCommon,
    /// Notion's wire name for the language, e.g. `html` or `plain text`.
    pub language: String,
    pub caption: Vec<RichTextItem>,
    pub content: TextBlockContent,
}

/// Image block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub common: BlockCommon,
    pub source: ImageSource,
    pub caption: Vec<RichTextItem>,
}

/// Where an image lives.
///
/// `Hosted` files are uploaded to Notion and served from signed URLs that
/// expire; `External` images are plain links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    External {
        url: String,
    },
    Hosted {
        url: String,
        expiry_time: Option<chrono::DateTime<chrono::Utc>>,
    },
}

impl ImageSource {
    pub fn url(&self) -> &str {
        match self {
            Self::External { url } | Self::Hosted { url, .. } => url,
        }
    }
}

/// Blocks that carry nothing but structure: dividers, tables of contents,
/// column lists and columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuralBlock {
    pub common: BlockCommon,
}

/// Table block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableBlock {
    pub common: BlockCommon,
    pub table_width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
}

/// Table row block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRowBlock {
    pub common: BlockCommon,
    pub cells: Vec<Vec<RichTextItem>>,
}

/// Bookmarks, link previews and embeds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkBlock {
    pub common: BlockCommon,
    pub url: String,
    pub caption: Vec<RichTextItem>,
}

/// Any block kind the site does not render.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnsupportedBlock {
    pub common: BlockCommon,
    pub block_type: String,
}
