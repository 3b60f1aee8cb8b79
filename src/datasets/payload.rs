// src/datasets/payload.rs
//! Request bodies for pushing records back into Notion.

use super::{DatasetSpec, FieldKind, Record};
use crate::constants::NOTION_RICH_TEXT_LIMIT;
use regex::Regex;
use serde_json::{json, Map, Value};

lazy_static::lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").expect("HTML tag regex is valid");
}

/// The `properties` object used when creating a dataset's database.
pub fn database_schema(spec: &DatasetSpec) -> Value {
    let mut properties = Map::new();
    for field in spec.fields {
        let definition = match field.kind {
            FieldKind::Title => json!({ "title": {} }),
            FieldKind::RichText => json!({ "rich_text": {} }),
            FieldKind::Select => json!({ "select": { "options": option_list(field.options) } }),
            FieldKind::MultiSelect => {
                json!({ "multi_select": { "options": option_list(field.options) } })
            }
            FieldKind::Date => json!({ "date": {} }),
            FieldKind::Number => json!({ "number": { "format": "number" } }),
            FieldKind::Url => json!({ "url": {} }),
            FieldKind::Files | FieldKind::FirstFileUrl => json!({ "files": {} }),
        };
        properties.insert(field.property.to_string(), definition);
    }
    Value::Object(properties)
}

fn option_list(options: &[&str]) -> Vec<Value> {
    options.iter().map(|name| json!({ "name": name })).collect()
}

/// Page properties for `record`. Keys the dataset does not define are ignored.
pub fn record_properties(spec: &DatasetSpec, record: &Record) -> Value {
    let mut properties = Map::new();
    for field in spec.fields {
        let value = record.get(field.key).unwrap_or(&Value::Null);
        let property = match field.kind {
            FieldKind::Title => json!({ "title": rich_text_chunks(&text_of(value)) }),
            FieldKind::RichText => json!({ "rich_text": rich_text_chunks(&text_of(value)) }),
            FieldKind::Select => match non_empty(value) {
                Some(name) => json!({ "select": { "name": name } }),
                None => json!({ "select": null }),
            },
            FieldKind::MultiSelect => {
                let names: Vec<Value> = value
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(non_empty)
                            .map(|name| json!({ "name": name }))
                            .collect()
                    })
                    .unwrap_or_default();
                json!({ "multi_select": names })
            }
            FieldKind::Date => match non_empty(value) {
                Some(start) => json!({ "date": { "start": start } }),
                None => json!({ "date": null }),
            },
            FieldKind::Number => json!({ "number": value.as_f64() }),
            FieldKind::Url => json!({ "url": non_empty(value) }),
            FieldKind::Files => {
                let files: Vec<Value> = value
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| {
                                let url = item.get("url").and_then(non_empty)?;
                                let name = item.get("name").and_then(non_empty).unwrap_or_else(|| url.clone());
                                Some(external_file(&name, &url))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                json!({ "files": files })
            }
            FieldKind::FirstFileUrl => match non_empty(value) {
                Some(url) => json!({ "files": [external_file(field.property, &url)] }),
                None => json!({ "files": [] }),
            },
        };
        properties.insert(field.property.to_string(), property);
    }
    Value::Object(properties)
}

fn external_file(name: &str, url: &str) -> Value {
    json!({ "name": name, "type": "external", "external": { "url": url } })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn non_empty(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Removes HTML tags, leaving text content.
pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

/// Splits `text` into Notion text objects of at most 2000 characters each,
/// after stripping HTML tags. Empty text yields no objects.
pub fn rich_text_chunks(text: &str) -> Vec<Value> {
    let plain = strip_html_tags(text);
    let chars: Vec<char> = plain.chars().collect();
    chars
        .chunks(NOTION_RICH_TEXT_LIMIT)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}
