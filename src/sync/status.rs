// src/sync/status.rs
//! Per-dataset overview for the CLI and the admin page.

use super::SyncService;
use crate::datasets::DatasetSpec;
use crate::error::AppError;
use crate::output::load_records;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStatus {
    pub key: String,
    pub label: String,
    pub description: String,
    pub notes: Vec<String>,
    pub database_id: String,
    pub notion_count: usize,
    pub local_count: usize,
    pub export_path: String,
}

impl SyncService {
    /// Counts titled pages in Notion and records in the local export.
    pub async fn status(&self, spec: &DatasetSpec) -> Result<DatasetStatus, AppError> {
        let database = self.ensure_database(spec).await?;
        let notion_count = self.existing_pages(spec, &database.id).await?.len();
        let path = self.export_path(spec);
        let local_count = load_records(&path).len();

        Ok(DatasetStatus {
            key: spec.key.to_string(),
            label: spec.label.to_string(),
            description: spec.description.to_string(),
            notes: spec.notes.iter().map(|note| note.to_string()).collect(),
            database_id: database.id.as_str().to_string(),
            notion_count,
            local_count,
            export_path: path.display().to_string(),
        })
    }
}
