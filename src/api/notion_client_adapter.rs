//! Adapter layer for converting notion-client types to our domain model.
//!
//! notion-client owns the wire format; everything downstream only sees
//! [`Block`], [`Page`] and [`RichTextItem`].

use crate::error::{AppError, NotionClientError};
use crate::model::blocks::*;
use crate::model::common::BlockCommon;
use crate::model::{Block, FileRef, Page, PropertyValue, SearchHit};
use crate::types::{BlockId, Link, MentionKind, NotionId, PageId, RichTextItem, RichTextType};
use notion_client::objects::block::BlockType;
use notion_client::objects::file::File as NcFile;
use notion_client::objects::page::PageProperty;
use notion_client::objects::rich_text::RichText as NcRichText;
use std::collections::HashMap;

/// Convert notion-client Page to our domain Page
pub fn convert_page(notion_page: notion_client::objects::page::Page) -> Result<Page, AppError> {
    Ok(Page {
        id: PageId::parse(&notion_page.id)?,
        url: notion_page.url,
        archived: notion_page.archived,
        properties: convert_page_properties(notion_page.properties),
    })
}

/// Convert notion-client Block to our domain Block
pub fn convert_block(
    notion_block: notion_client::objects::block::Block,
) -> Result<Block, AppError> {
    let common = convert_block_common(&notion_block)?;

    let block = match notion_block.block_type {
        BlockType::Paragraph { paragraph } => Block::Paragraph(text_block(common, paragraph.rich_text)),
        BlockType::Heading1 { heading_1 } => Block::Heading1(text_block(common, heading_1.rich_text)),
        BlockType::Heading2 { heading_2 } => Block::Heading2(text_block(common, heading_2.rich_text)),
        BlockType::Heading3 { heading_3 } => Block::Heading3(text_block(common, heading_3.rich_text)),
        BlockType::BulletedListItem { bulleted_list_item } => {
            Block::BulletedListItem(text_block(common, bulleted_list_item.rich_text))
        }
        BlockType::NumberedListItem { numbered_list_item } => {
            Block::NumberedListItem(text_block(common, numbered_list_item.rich_text))
        }
        BlockType::Quote { quote } => Block::Quote(text_block(common, quote.rich_text)),
        BlockType::Toggle { toggle } => Block::Toggle(text_block(common, toggle.rich_text)),

        BlockType::ToDo { to_do } => Block::ToDo(ToDoBlock {
            common,
            content: TextBlockContent::new(convert_rich_text_array(to_do.rich_text)),
            checked: to_do.checked.unwrap_or(false),
        }),

        BlockType::Callout { callout } => Block::Callout(CalloutBlock {
            common,
            icon: callout.icon.and_then(convert_icon),
            content: TextBlockContent::new(convert_rich_text_array(callout.rich_text)),
        }),

        BlockType::Code { code } => Block::Code(CodeBlock {
            common,
            language: language_wire_name(&code.language),
            caption: convert_rich_text_array(code.caption),
            content: TextBlockContent::new(convert_rich_text_array(code.rich_text)),
        }),

        // ImageValue carries no caption in this notion-client version
        BlockType::Image { image } => Block::Image(ImageBlock {
            common,
            source: convert_image_source(image.file_type),
            caption: Vec::new(),
        }),

        BlockType::Divider { .. } => Block::Divider(StructuralBlock { common }),
        BlockType::TableOfContents { .. } => Block::TableOfContents(StructuralBlock { common }),
        BlockType::ColumnList { .. } => Block::ColumnList(StructuralBlock { common }),
        BlockType::Column { .. } => Block::Column(StructuralBlock { common }),

        BlockType::Table { table } => Block::Table(TableBlock {
            common,
            table_width: table.table_width as usize,
            has_column_header: table.has_column_header,
            has_row_header: table.has_row_header,
        }),

        BlockType::TableRow { table_row } => Block::TableRow(TableRowBlock {
            common,
            cells: table_row
                .cells
                .into_iter()
                .map(convert_rich_text_array)
                .collect(),
        }),

        BlockType::Bookmark { bookmark } => Block::Bookmark(LinkBlock {
            common,
            url: bookmark.url,
            caption: convert_rich_text_array(bookmark.caption),
        }),

        BlockType::LinkPreview { link_preview } => Block::LinkPreview(LinkBlock {
            common,
            url: link_preview.url,
            caption: Vec::new(),
        }),

        BlockType::Embed { embed } => Block::Embed(LinkBlock {
            common,
            url: embed.url,
            caption: Vec::new(),
        }),

        other => Block::Unsupported(UnsupportedBlock {
            common,
            block_type: wire_type_name(&other),
        }),
    };

    Ok(block)
}

/// Extract the id and title of one search result, whatever its object kind.
///
/// Results that notion-client cannot read are skipped with a warning rather
/// than failing the whole search.
pub fn convert_search_hit(value: serde_json::Value) -> Option<SearchHit> {
    let object = value.get("object").and_then(|v| v.as_str()).unwrap_or("");
    let converted = match object {
        "database" => serde_json::from_value::<notion_client::objects::database::Database>(value)
            .map_err(|e| e.to_string())
            .and_then(|db| {
                let id = db.id.ok_or_else(|| "database without id".to_string())?;
                Ok((id, plain_text(db.title)))
            }),
        "page" => serde_json::from_value::<notion_client::objects::page::Page>(value)
            .map_err(|e| e.to_string())
            .map(|page| {
                let title = page
                    .properties
                    .into_values()
                    .find_map(|property| match property {
                        PageProperty::Title { title, .. } => Some(plain_text(title)),
                        _ => None,
                    })
                    .unwrap_or_default();
                (page.id, title)
            }),
        other => Err(format!("unexpected object kind '{}'", other)),
    };

    match converted {
        Ok((id, title)) => match NotionId::parse(&id) {
            Ok(id) => Some(SearchHit {
                id: id.as_str().to_string(),
                title,
            }),
            Err(e) => {
                log::warn!("Skipping search result with bad id '{}': {}", id, e);
                None
            }
        },
        Err(e) => {
            log::warn!("Skipping unreadable search result: {}", e);
            None
        }
    }
}

fn plain_text(rich_text: Vec<NcRichText>) -> String {
    crate::types::plain_text_of(&convert_rich_text_array(rich_text))
}

/// Convert block common fields
fn convert_block_common(
    notion_block: &notion_client::objects::block::Block,
) -> Result<BlockCommon, AppError> {
    let id = BlockId::parse(&notion_block.id.clone().ok_or_else(|| {
        NotionClientError::ConversionError {
            message: "Block missing required ID field".to_string(),
        }
    })?)?;

    Ok(BlockCommon {
        id,
        children: Vec::new(), // Will be populated during fetch stage
        has_children: notion_block.has_children.unwrap_or(false),
        archived: notion_block.archived.unwrap_or(false),
    })
}

fn text_block(common: BlockCommon, rich_text: Vec<NcRichText>) -> TextBlock {
    TextBlock {
        common,
        content: TextBlockContent::new(convert_rich_text_array(rich_text)),
    }
}

/// The serde name notion-client gives a value, e.g. `"plain text"` or
/// `"table_of_contents"`.
fn serde_name<T: serde::Serialize>(value: &T) -> Option<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => Some(name),
        Ok(serde_json::Value::Object(map)) => match map.get("type") {
            Some(serde_json::Value::String(tag)) => Some(tag.clone()),
            _ => map.keys().next().cloned(),
        },
        _ => None,
    }
}

fn language_wire_name<T: serde::Serialize>(language: &T) -> String {
    serde_name(language).unwrap_or_else(|| "plain text".to_string())
}

fn wire_type_name(block_type: &BlockType) -> String {
    serde_name(block_type).unwrap_or_else(|| "unsupported".to_string())
}

/// Convert array of rich text items
fn convert_rich_text_array(rich_texts: Vec<NcRichText>) -> Vec<RichTextItem> {
    rich_texts.into_iter().filter_map(convert_rich_text).collect()
}

/// Convert single rich text item; kinds we cannot represent are dropped.
fn convert_rich_text(rich_text: NcRichText) -> Option<RichTextItem> {
    match rich_text {
        NcRichText::Text {
            text,
            annotations,
            plain_text,
            href,
        } => Some(RichTextItem {
            plain_text: plain_text.unwrap_or_else(|| text.content.clone()),
            text_type: RichTextType::Text {
                content: text.content,
                link: text.link.map(|link| Link { url: link.url }),
            },
            annotations: convert_annotations(annotations.unwrap_or_default()),
            href,
        }),

        NcRichText::Mention {
            mention,
            annotations,
            plain_text,
            href,
        } => Some(RichTextItem {
            text_type: RichTextType::Mention(convert_mention(mention)),
            annotations: convert_annotations(annotations),
            plain_text,
            href,
        }),

        NcRichText::Equation {
            equation,
            annotations,
            plain_text,
            href,
        } => Some(RichTextItem {
            text_type: RichTextType::Equation {
                expression: equation.expression,
            },
            annotations: convert_annotations(annotations),
            plain_text,
            href,
        }),

        #[allow(unreachable_patterns)]
        _ => {
            log::debug!("Dropping unsupported rich text item");
            None
        }
    }
}

/// Convert annotations
fn convert_annotations(
    annotations: notion_client::objects::rich_text::Annotations,
) -> crate::types::Annotations {
    crate::types::Annotations {
        bold: annotations.bold,
        italic: annotations.italic,
        strikethrough: annotations.strikethrough,
        underline: annotations.underline,
        code: annotations.code,
    }
}

fn convert_mention(mention: notion_client::objects::rich_text::Mention) -> MentionKind {
    use notion_client::objects::rich_text::Mention as NcMention;

    match mention {
        NcMention::User { .. } => MentionKind::User,
        NcMention::Page { .. } => MentionKind::Page,
        NcMention::Database { .. } => MentionKind::Database,
        NcMention::Date { .. } => MentionKind::Date,
        NcMention::LinkPreview { link_preview } => MentionKind::LinkPreview {
            url: link_preview.url,
        },
        #[allow(unreachable_patterns)]
        _ => MentionKind::Other,
    }
}

fn convert_image_source(file: NcFile) -> ImageSource {
    match file {
        NcFile::External { external } => ImageSource::External { url: external.url },
        NcFile::File { file } => ImageSource::Hosted {
            url: file.url,
            expiry_time: Some(file.expiry_time),
        },
    }
}

fn file_url(file: &NcFile) -> &str {
    match file {
        NcFile::External { external } => &external.url,
        NcFile::File { file } => &file.url,
    }
}

/// Icon kinds without an emoji or image (such as Notion's native icons) are dropped.
fn convert_icon(icon: notion_client::objects::block::Icon) -> Option<Icon> {
    use notion_client::objects::block::Icon as NcIcon;

    match icon {
        NcIcon::Emoji(notion_client::objects::emoji::Emoji::Emoji { emoji }) => {
            Some(Icon::Emoji(emoji))
        }
        NcIcon::File(file) => Some(Icon::Image {
            url: file_url(&file).to_string(),
        }),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Converts a Notion `DateOrDateTime` to the string Notion sent.
fn format_date(dod: notion_client::objects::page::DateOrDateTime) -> String {
    use notion_client::objects::page::DateOrDateTime;

    match dod {
        DateOrDateTime::Date(d) => d.format("%Y-%m-%d").to_string(),
        DateOrDateTime::DateTime(dt) => dt.to_rfc3339(),
    }
}

fn convert_page_properties(
    properties: HashMap<String, PageProperty>,
) -> HashMap<String, PropertyValue> {
    properties
        .into_iter()
        .map(|(name, property)| (name, convert_page_property(property)))
        .collect()
}

fn convert_page_property(property: PageProperty) -> PropertyValue {
    match property {
        PageProperty::Title { title, .. } => PropertyValue::Title(convert_rich_text_array(title)),
        PageProperty::RichText { rich_text, .. } => {
            PropertyValue::RichText(convert_rich_text_array(rich_text))
        }
        PageProperty::Number { number, .. } => {
            PropertyValue::Number(number.and_then(|n| n.as_f64()))
        }
        PageProperty::Select { select, .. } => {
            PropertyValue::Select(select.and_then(|s| s.name))
        }
        PageProperty::MultiSelect { multi_select, .. } => {
            PropertyValue::MultiSelect(multi_select.into_iter().filter_map(|s| s.name).collect())
        }
        PageProperty::Status { status, .. } => {
            PropertyValue::Status(status.and_then(|s| s.name))
        }
        PageProperty::Date { date, .. } => {
            PropertyValue::Date(date.and_then(|d| d.start).map(format_date))
        }
        PageProperty::Url { url, .. } => PropertyValue::Url(url),
        PageProperty::Files { files, .. } => PropertyValue::Files(
            files
                .into_iter()
                .map(|f| FileRef {
                    url: file_url(&f.file).to_string(),
                    name: f.name,
                })
                .collect(),
        ),
        PageProperty::Checkbox { checkbox, .. } => PropertyValue::Checkbox(checkbox),
        other => PropertyValue::Other {
            type_name: serde_name(&other).unwrap_or_else(|| "unknown".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notion_client::objects::block::Icon as NcIcon;
    use notion_client::objects::emoji::Emoji;

    #[test]
    fn emoji_icons_keep_their_character() {
        let icon = NcIcon::Emoji(Emoji::Emoji {
            emoji: "💡".to_string(),
        });
        assert_eq!(convert_icon(icon), Some(Icon::Emoji("💡".to_string())));
    }
}
