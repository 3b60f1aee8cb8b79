use crate::types::{plain_text_of, RichTextItem};
use serde::{Deserialize, Serialize};

/// A file attached to a `files` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub url: String,
}

/// The value of one page property, reduced to what records are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Title(Vec<RichTextItem>),
    RichText(Vec<RichTextItem>),
    Number(Option<f64>),
    Select(Option<String>),
    MultiSelect(Vec<String>),
    Status(Option<String>),
    /// Start of the date range, as Notion sent it (`YYYY-MM-DD` or RFC 3339).
    Date(Option<String>),
    Url(Option<String>),
    Files(Vec<FileRef>),
    Checkbox(bool),
    Other { type_name: String },
}

impl PropertyValue {
    /// Plain-text view used by text-like fields. Selects and statuses yield
    /// their option name; non-textual kinds yield an empty string.
    pub fn as_plain_text(&self) -> String {
        match self {
            Self::Title(items) | Self::RichText(items) => plain_text_of(items).trim().to_string(),
            Self::Select(name) | Self::Status(name) => name.clone().unwrap_or_default(),
            Self::Date(start) | Self::Url(start) => start.clone().unwrap_or_default(),
            Self::Number(Some(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Title(_) => "title",
            Self::RichText(_) => "rich_text",
            Self::Number(_) => "number",
            Self::Select(_) => "select",
            Self::MultiSelect(_) => "multi_select",
            Self::Status(_) => "status",
            Self::Date(_) => "date",
            Self::Url(_) => "url",
            Self::Files(_) => "files",
            Self::Checkbox(_) => "checkbox",
            Self::Other { type_name } => type_name,
        }
    }
}
