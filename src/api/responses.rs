// src/api/responses.rs
//! API response types backed by notion-client's serde implementations.

use crate::model::blocks::UnsupportedBlock;
use crate::model::common::BlockCommon;
use crate::model::Block;
use crate::types::BlockId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use notion_client::objects::{
    block::Block as NotionBlock, error::Error as NotionError, page::Page as NotionPage,
};

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub object: String,
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Database query response using notion-client types
pub type QueryDatabaseResponse = PaginatedResponse<NotionPage>;

/// Block children are read one by one, so an unreadable block only loses itself.
pub type RetrieveBlockChildrenResponse = PaginatedResponse<Value>;

/// Search results mix pages and databases, so they are read loosely.
pub type SearchResponse = PaginatedResponse<Value>;

/// The part of a create/update response we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedObject {
    pub id: String,
}

/// Trait for converting notion-client types to domain types
pub trait ToDomain<T> {
    fn to_domain(self) -> Result<T, crate::error::AppError>;
}

impl ToDomain<crate::model::Page> for NotionPage {
    fn to_domain(self) -> Result<crate::model::Page, crate::error::AppError> {
        crate::api::notion_client_adapter::convert_page(self)
    }
}

impl ToDomain<crate::model::Block> for NotionBlock {
    fn to_domain(self) -> Result<crate::model::Block, crate::error::AppError> {
        crate::api::notion_client_adapter::convert_block(self)
    }
}

impl QueryDatabaseResponse {
    /// Convert all pages to domain model
    pub fn into_domain_pages(self) -> Result<Vec<crate::model::Page>, crate::error::AppError> {
        self.results.into_iter().map(ToDomain::to_domain).collect()
    }
}

impl RetrieveBlockChildrenResponse {
    /// Convert all blocks to domain model; unreadable ones become `Unsupported`.
    pub fn into_domain_blocks(self) -> Vec<Block> {
        self.results.into_iter().map(block_from_value).collect()
    }
}

fn block_from_value(value: Value) -> Block {
    let block_type = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| BlockId::parse(raw).ok());

    let converted = serde_json::from_value::<NotionBlock>(value)
        .map_err(crate::error::AppError::from)
        .and_then(ToDomain::to_domain);
    match converted {
        Ok(block) => block,
        Err(e) => {
            log::warn!(
                "Skipping unreadable '{}' block {}: {}",
                block_type,
                id.as_ref().map_or("without id", |id| id.as_str()),
                e
            );
            Block::Unsupported(UnsupportedBlock {
                common: id.map(BlockCommon::new).unwrap_or_default(),
                block_type,
            })
        }
    }
}
