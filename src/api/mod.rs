// src/api/mod.rs
//! Notion API interaction: reading page bodies and database rows, and
//! writing rows back.
//!
//! I/O, parsing, and the conversion into the domain model live in separate
//! submodules; everything else depends only on [`NotionRepository`].

pub mod client;
pub mod fetch;
pub mod notion_client_adapter;
mod pagination;
pub mod parser;
pub mod responses;
mod types;

use crate::error::AppError;
use crate::model::{Block, Page, SearchHit, SearchObject};
use crate::types::{DatabaseId, NotionId, PageId};
use serde_json::Value;

/// Everything the sync needs from a Notion workspace.
///
/// Business logic depends on this trait, never on HTTP details. List
/// operations exhaust pagination before returning.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Direct children of a page or block, without their own children.
    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError>;

    async fn query_database(
        &self,
        database: &DatabaseId,
        filter: Option<&Value>,
    ) -> Result<Vec<Page>, AppError>;

    async fn search(&self, query: &str, object: SearchObject) -> Result<Vec<SearchHit>, AppError>;

    /// Creates a database under `parent` with `properties` as its schema.
    async fn create_database(
        &self,
        parent: &PageId,
        title: &str,
        properties: &Value,
    ) -> Result<DatabaseId, AppError>;

    async fn create_page(&self, database: &DatabaseId, properties: &Value)
        -> Result<PageId, AppError>;

    /// Overwrites the given properties and un-archives the page.
    async fn update_page(&self, page: &PageId, properties: &Value) -> Result<(), AppError>;

    async fn archive_page(&self, page: &PageId) -> Result<(), AppError>;
}

pub use client::{extract_response_text, ApiResponse, NotionHttpClient};
pub use fetch::{BlockTreeFetcher, FetchStats};
pub use responses::PaginatedResponse;
