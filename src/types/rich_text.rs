use serde::{Deserialize, Serialize};

/// The kind of rich text content.
///
/// Each variant carries its specific data: a text run with an optional
/// link, a mention of another Notion object, or an inline equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RichTextType {
    Text { content: String, link: Option<Link> },
    Mention(MentionKind),
    Equation { expression: String },
}

/// What a mention points at. Only the distinctions the renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MentionKind {
    User,
    Page,
    Database,
    Date,
    LinkPreview { url: String },
    Other,
}

/// A run of text sharing one set of annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    pub text_type: RichTextType,
    pub annotations: Annotations,
    pub plain_text: String,
    pub href: Option<String>,
}

impl RichTextItem {
    /// Create an unstyled text item.
    /// ```ignore
    /// RichTextItem::plain_text("hello")
    /// ```
    pub fn plain_text(text: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
                link: None,
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: None,
        }
    }

    /// Same text with the given annotations.
    pub fn styled(text: &str, annotations: Annotations) -> Self {
        Self {
            annotations,
            ..Self::plain_text(text)
        }
    }

    /// Same text wrapped in a structured link.
    pub fn linked(text: &str, url: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
                link: Some(Link {
                    url: url.to_string(),
                }),
            },
            ..Self::plain_text(text)
        }
    }

    /// The raw text of this run, preferring the typed content for text runs.
    pub fn raw_text(&self) -> &str {
        match &self.text_type {
            RichTextType::Text { content, .. } => content,
            RichTextType::Equation { expression } if self.plain_text.is_empty() => expression,
            _ => &self.plain_text,
        }
    }

    /// The link target, from either the structured link or the flat `href`.
    pub fn link_url(&self) -> Option<&str> {
        let structured = match &self.text_type {
            RichTextType::Text {
                link: Some(link), ..
            } => Some(link.url.as_str()),
            RichTextType::Mention(MentionKind::LinkPreview { url }) => Some(url.as_str()),
            _ => None,
        };
        structured
            .or(self.href.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

/// Concatenates the plain text of a rich text sequence.
pub fn plain_text_of(items: &[RichTextItem]) -> String {
    items.iter().map(RichTextItem::raw_text).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}
