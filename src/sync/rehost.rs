// src/sync/rehost.rs
//! Repair of existing exports whose bodies still point at expiring images.

use super::SyncService;
use crate::datasets::DatasetSpec;
use crate::error::AppError;
use crate::formatting::sanitize;
use crate::output::{load_records, write_records};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Outcome of one re-hosting pass over a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RehostReport {
    pub dataset: String,
    pub path: PathBuf,
    pub records: usize,
    /// Records whose `content` changed.
    pub updated: usize,
}

impl SyncService {
    /// Runs each record's `content` through the sanitizer again, so its
    /// expiring `<img>` URLs are re-hosted. Notion is not contacted.
    ///
    /// The file is only rewritten when a record changed.
    pub async fn rehost(&self, spec: &DatasetSpec, input: Option<&Path>) -> Result<RehostReport, AppError> {
        let path = input
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.export_path(spec));
        let mut records = load_records(&path);
        log::info!("Checking {} records in {} for expiring images", records.len(), path.display());

        let mut updated = 0;
        for record in records.iter_mut() {
            let content = match record.get("content").and_then(Value::as_str) {
                Some(content) if !content.is_empty() => content.to_string(),
                _ => continue,
            };
            let cleaned = sanitize(&content, &self.rules, &self.resolver).await;
            if cleaned != content {
                record.insert("content".to_string(), Value::String(cleaned));
                updated += 1;
            }
        }

        if updated > 0 {
            write_records(&path, &records)?;
        } else {
            log::info!("No expiring images in {}", path.display());
        }

        Ok(RehostReport {
            dataset: spec.key.to_string(),
            path,
            records: records.len(),
            updated,
        })
    }
}
