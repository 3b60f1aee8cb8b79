// src/datasets/extract.rs
//! Turns Notion pages into exported records.

use super::{DatasetSpec, Fallback, FieldKind, FieldSpec, Record};
use crate::images::{property_image_id, AssetResolver};
use crate::model::{FileRef, Page, PropertyValue};
use serde_json::{json, Value};

/// Builds the record for `page`: `id` first, then every field in order.
///
/// File URLs that would expire are made permanent through `resolver`.
pub async fn page_to_record(spec: &DatasetSpec, page: &Page, resolver: &AssetResolver) -> Record {
    let mut record = Record::with_capacity(spec.fields.len() + 2);
    record.insert("id".to_string(), Value::String(page.id.as_str().to_string()));

    for field in spec.fields {
        let value = match page.property(field.property) {
            Some(property) => field_value(spec, page, field, property, resolver).await,
            None => empty_value(field.kind),
        };
        record.insert(field.key.to_string(), apply_fallback(field, value));
    }
    record
}

/// The record's title, trimmed; empty when the title property is blank.
pub fn record_title(spec: &DatasetSpec, record: &Record) -> String {
    spec.title_field()
        .and_then(|field| record.get(field.key))
        .and_then(Value::as_str)
        .map(|title| title.trim().to_string())
        .unwrap_or_default()
}

async fn field_value(
    spec: &DatasetSpec,
    page: &Page,
    field: &FieldSpec,
    property: &PropertyValue,
    resolver: &AssetResolver,
) -> Value {
    match (field.kind, property) {
        (FieldKind::MultiSelect, PropertyValue::MultiSelect(names)) => json!(names
            .iter()
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()),
        (FieldKind::Number, PropertyValue::Number(number)) => number.map_or(Value::Null, number_value),
        (FieldKind::Files, PropertyValue::Files(files)) => {
            let mut entries = Vec::with_capacity(files.len());
            for file in files.iter().filter(|f| !f.url.is_empty()) {
                let url = resolve_file(spec, page, file, resolver).await;
                entries.push(json!({ "name": file.name, "url": url }));
            }
            Value::Array(entries)
        }
        (FieldKind::FirstFileUrl, PropertyValue::Files(files)) => {
            match files.iter().find(|f| !f.url.is_empty()) {
                Some(file) => Value::String(resolve_file(spec, page, file, resolver).await),
                None => Value::Null,
            }
        }
        (FieldKind::Title | FieldKind::RichText | FieldKind::Select | FieldKind::Date | FieldKind::Url, _) => {
            Value::String(property.as_plain_text())
        }
        (kind, other) => {
            log::debug!(
                "Property '{}' is {}, not usable as {:?}",
                field.property,
                other.type_name(),
                kind
            );
            empty_value(kind)
        }
    }
}

async fn resolve_file(spec: &DatasetSpec, page: &Page, file: &FileRef, resolver: &AssetResolver) -> String {
    let image_id = property_image_id(spec.key, page.id.as_str(), &file.name);
    resolver.resolve(&file.url, Some(&image_id)).await
}

fn empty_value(kind: FieldKind) -> Value {
    match kind {
        FieldKind::MultiSelect | FieldKind::Files => Value::Array(Vec::new()),
        FieldKind::Number | FieldKind::FirstFileUrl => Value::Null,
        _ => Value::String(String::new()),
    }
}

fn apply_fallback(field: &FieldSpec, value: Value) -> Value {
    let is_empty = match &value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    };
    match (is_empty, field.fallback) {
        (true, Some(Fallback::Text(text))) => Value::String(text.to_string()),
        (true, Some(Fallback::Number(n))) => json!(n),
        _ => value,
    }
}

/// Whole numbers are written without a fractional part.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::find;
    use crate::types::{PageId, RichTextItem};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn page(properties: Vec<(&str, PropertyValue)>) -> Page {
        Page {
            id: PageId::parse("1234567890abcdef1234567890abcdef").unwrap(),
            url: String::new(),
            archived: false,
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn builds_note_record_in_field_order() {
        let spec = find("note").unwrap();
        let page = page(vec![
            (
                "Article Title",
                PropertyValue::Title(vec![RichTextItem::plain_text(" Future Cities ")]),
            ),
            ("Category", PropertyValue::Select(Some("technology".into()))),
            ("Read Time", PropertyValue::Number(Some(8.0))),
            (
                "Tags",
                PropertyValue::MultiSelect(vec!["分析".into(), String::new()]),
            ),
            ("Publish Date", PropertyValue::Date(Some("2024-11-01".into()))),
            ("CTA Link", PropertyValue::Url(None)),
            (
                "Cover Image",
                PropertyValue::Files(vec![FileRef {
                    name: "cover.png".into(),
                    url: "https://cdn.example.com/cover.png".into(),
                }]),
            ),
        ]);

        let record = page_to_record(spec, &page, &AssetResolver::passthrough()).await;

        insta::assert_json_snapshot!(record, @r###"
        {
          "id": "1234567890abcdef1234567890abcdef",
          "article_title": "Future Cities",
          "category": "technology",
          "summary": "",
          "publish_date": "2024-11-01",
          "read_time": 8,
          "tags": [
            "分析"
          ],
          "cta_label": "",
          "cta_link": "",
          "status": "",
          "cover_image": [
            {
              "name": "cover.png",
              "url": "https://cdn.example.com/cover.png"
            }
          ]
        }
        "###);
        assert_eq!(record_title(spec, &record), "Future Cities");
    }

    #[tokio::test]
    async fn affiling_defaults_fill_gaps() {
        let spec = find("affiling").unwrap();
        let page = page(vec![(
            "Title",
            PropertyValue::Title(vec![RichTextItem::plain_text("Laptops")]),
        )]);

        let record = page_to_record(spec, &page, &AssetResolver::passthrough()).await;

        assert_eq!(record["category"], json!("guide"));
        assert_eq!(record["date"], json!(""));
        assert_eq!(record["image"], Value::Null);
        assert_eq!(record["readTime"], json!(0));
        assert_eq!(record["productCount"], Value::Null);
        assert_eq!(record["tags"], json!([]));
    }

    #[tokio::test]
    async fn mismatched_property_types_degrade_to_empty() {
        let spec = find("note").unwrap();
        let page = page(vec![("Read Time", PropertyValue::RichText(vec![]))]);
        let record = page_to_record(spec, &page, &AssetResolver::passthrough()).await;
        assert_eq!(record["read_time"], Value::Null);
        assert_eq!(record_title(spec, &record), "");
    }

    #[test]
    fn fractional_numbers_are_kept() {
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(-3.0), json!(-3));
    }
}
