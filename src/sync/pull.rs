// src/sync/pull.rs
//! Export: Notion database rows to a JSON file.

use super::SyncService;
use crate::api::BlockTreeFetcher;
use crate::datasets::extract::{page_to_record, record_title};
use crate::datasets::{DatasetSpec, Record};
use crate::error::AppError;
use crate::formatting::{render_content, RenderContext};
use crate::model::Page;
use crate::output::write_records;
use crate::types::NotionId;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Outcome of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    pub dataset: String,
    pub database_created: bool,
    pub records: usize,
    /// Records whose body could not be fetched and fell back.
    pub failed_bodies: usize,
    pub path: PathBuf,
    pub bytes_written: usize,
}

struct Exported {
    record: Record,
    body_failed: bool,
}

impl SyncService {
    /// Exports the dataset to `output`, or to its default export path.
    pub async fn pull(&self, spec: &DatasetSpec, output: Option<&Path>) -> Result<PullReport, AppError> {
        let database = self.ensure_database(spec).await?;
        let filter = spec.query_filter();
        let pages = self
            .repository
            .query_database(&database.id, filter.as_ref())
            .await?;
        log::info!(
            "Exporting {} pages from '{}' with {} concurrent renders",
            pages.len(),
            spec.database_title,
            self.concurrency
        );

        let jobs: Vec<_> = pages
            .iter()
            .filter(|page| !page.archived)
            .map(|page| self.export_page(spec, page))
            .collect();
        let exported: Vec<Exported> = stream::iter(jobs)
            .buffered(self.concurrency)
            .collect::<Vec<Option<Exported>>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let failed_bodies = exported.iter().filter(|e| e.body_failed).count();
        let mut records: Vec<Record> = exported.into_iter().map(|e| e.record).collect();
        if spec.drop_archived {
            records.retain(|record| record.get("status").and_then(Value::as_str) != Some("Archived"));
        }
        sort_records(spec, &mut records);

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.export_path(spec));
        let bytes_written = write_records(&path, &records)?;

        Ok(PullReport {
            dataset: spec.key.to_string(),
            database_created: database.created,
            records: records.len(),
            failed_bodies,
            path,
            bytes_written,
        })
    }

    /// One page's record, or `None` for pages without a title.
    async fn export_page(&self, spec: &DatasetSpec, page: &Page) -> Option<Exported> {
        let mut record = page_to_record(spec, page, &self.resolver).await;
        let title = record_title(spec, &record);
        if title.is_empty() {
            log::debug!("Skipping untitled page {}", page.id);
            return None;
        }

        let fetcher = BlockTreeFetcher::new(self.repository.as_ref());
        let (body, body_failed) = match fetcher.fetch_tree(&NotionId::from(&page.id)).await {
            Ok(blocks) => {
                let context = RenderContext::for_dataset(spec.key);
                let html = render_content(&blocks, &context, &self.rules, &self.resolver).await;
                (html, false)
            }
            Err(e) => {
                log::warn!("Could not fetch body of '{}' ({}): {}", title, page.id, e);
                (String::new(), true)
            }
        };

        let content = if body.is_empty() {
            record
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            body
        };
        record.insert("content".to_string(), Value::String(content));

        Some(Exported { record, body_failed })
    }
}

/// Stable sort by the dataset's sort key, compared as text.
pub(crate) fn sort_records(spec: &DatasetSpec, records: &mut [Record]) {
    let key = spec.sort.key;
    records.sort_by(|a, b| {
        let ordering = sort_text(a.get(key)).cmp(&sort_text(b.get(key)));
        if spec.sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn sort_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
