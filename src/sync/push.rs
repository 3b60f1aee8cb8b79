// src/sync/push.rs
//! Import: local JSON records into a Notion database.

use super::SyncService;
use crate::datasets::extract::record_title;
use crate::datasets::payload::record_properties;
use crate::datasets::DatasetSpec;
use crate::error::AppError;
use crate::output::load_records;
use crate::types::{DatabaseId, PageId};
use std::collections::HashMap;
use std::path::Path;

/// Outcome of one push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub dataset: String,
    pub database_created: bool,
    pub archived: usize,
    pub created: usize,
    pub updated: usize,
    /// Records skipped because they had no title.
    pub skipped: usize,
}

impl SyncService {
    /// Upserts the records in `input` (or the default export path) by title.
    ///
    /// With `reset`, every existing page is archived first, so all records
    /// are created anew.
    pub async fn push(
        &self,
        spec: &DatasetSpec,
        input: Option<&Path>,
        reset: bool,
    ) -> Result<PushReport, AppError> {
        let path = input
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.export_path(spec));
        let records = load_records(&path);
        log::info!("Pushing {} records from {}", records.len(), path.display());

        let database = self.ensure_database(spec).await?;
        let mut report = PushReport {
            dataset: spec.key.to_string(),
            database_created: database.created,
            ..PushReport::default()
        };

        let mut existing = self.existing_pages(spec, &database.id).await?;
        if reset {
            for page in existing.values() {
                self.repository.archive_page(page).await?;
                report.archived += 1;
            }
            log::info!("Archived {} existing pages", report.archived);
            existing.clear();
        }

        for record in &records {
            let title = record_title(spec, record);
            if title.is_empty() {
                log::warn!("Skipping record without '{}'", spec.title_property);
                report.skipped += 1;
                continue;
            }

            let properties = record_properties(spec, record);
            match existing.get(&title) {
                Some(page) => {
                    self.repository.update_page(page, &properties).await?;
                    log::info!("Updated '{}'", title);
                    report.updated += 1;
                }
                None => {
                    let page = self.repository.create_page(&database.id, &properties).await?;
                    log::info!("Created '{}'", title);
                    existing.insert(title, page);
                    report.created += 1;
                }
            }
        }

        Ok(report)
    }

    /// Live pages of the database keyed by trimmed title; the first page
    /// wins when titles repeat.
    pub(crate) async fn existing_pages(
        &self,
        spec: &DatasetSpec,
        database: &DatabaseId,
    ) -> Result<HashMap<String, PageId>, AppError> {
        let pages = self.repository.query_database(database, None).await?;
        let mut by_title = HashMap::with_capacity(pages.len());
        for page in pages.into_iter().filter(|page| !page.archived) {
            let title = page.text_of(spec.title_property);
            if !title.is_empty() {
                by_title.entry(title).or_insert(page.id);
            }
        }
        Ok(by_title)
    }
}
