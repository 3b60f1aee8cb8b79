// src/sync/database.rs
//! Finding or creating a dataset's database.

use super::SyncService;
use crate::datasets::{payload::database_schema, DatasetSpec};
use crate::error::AppError;
use crate::model::{DatabaseHandle, SearchObject};
use crate::types::{DatabaseId, PageId};

impl SyncService {
    /// The dataset's database, created under its root page if no database
    /// with exactly its title exists yet.
    pub async fn ensure_database(&self, spec: &DatasetSpec) -> Result<DatabaseHandle, AppError> {
        let databases = self
            .repository
            .search(spec.database_title, SearchObject::Database)
            .await?;
        if let Some(hit) = databases.iter().find(|hit| hit.title == spec.database_title) {
            let id = DatabaseId::parse(&hit.id)?;
            log::debug!("Using database '{}' ({})", spec.database_title, id);
            return Ok(DatabaseHandle { id, created: false });
        }

        let pages = self
            .repository
            .search(spec.root_page_title, SearchObject::Page)
            .await?;
        let root = pages
            .iter()
            .find(|hit| hit.title == spec.root_page_title)
            .ok_or_else(|| AppError::MissingRootPage {
                title: spec.root_page_title.to_string(),
                database: spec.database_title.to_string(),
            })?;
        let parent = PageId::parse(&root.id)?;

        let id = self
            .repository
            .create_database(&parent, spec.database_title, &database_schema(spec))
            .await?;
        log::info!(
            "Created database '{}' ({}) under '{}'",
            spec.database_title,
            id,
            spec.root_page_title
        );
        Ok(DatabaseHandle { id, created: true })
    }
}
