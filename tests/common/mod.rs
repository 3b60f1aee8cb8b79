// tests/common/mod.rs
//! In-memory Notion workspace shared by the integration tests.

#![allow(dead_code)]

use notion_site_sync::{
    AppError, Block, DatabaseId, NotionId, NotionRepository, Page, PageId, PropertyValue,
    RichTextItem, SearchHit, SearchObject,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn page_id(n: u32) -> PageId {
    PageId::parse(&format!("{:032x}", n)).unwrap()
}

pub fn text(s: &str) -> Vec<RichTextItem> {
    vec![RichTextItem::plain_text(s)]
}

/// A row with the given properties.
pub fn row(n: u32, properties: Vec<(&str, PropertyValue)>) -> Page {
    let id = page_id(n);
    Page {
        url: format!("https://www.notion.so/{}", id),
        id,
        archived: false,
        properties: properties
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    }
}

pub fn title(s: &str) -> PropertyValue {
    PropertyValue::Title(text(s))
}

pub fn rich(s: &str) -> PropertyValue {
    PropertyValue::RichText(text(s))
}

pub fn select(s: &str) -> PropertyValue {
    PropertyValue::Select(Some(s.to_string()))
}

#[derive(Default)]
pub struct Workspace {
    /// Databases by title.
    pub databases: HashMap<String, DatabaseId>,
    /// Pages findable by search, by title.
    pub root_pages: HashMap<String, PageId>,
    /// Rows by database id.
    pub rows: HashMap<String, Vec<Page>>,
    /// Page bodies and nested children by parent id.
    pub children: HashMap<String, Vec<Block>>,
    pub created_databases: Vec<(String, Value)>,
    pub created_pages: Vec<Value>,
    pub updated_pages: Vec<(String, Value)>,
    pub archived_pages: Vec<String>,
    pub queries: Vec<Option<Value>>,
}

/// A fake Notion API backed by a [`Workspace`].
#[derive(Default)]
pub struct FakeNotion {
    pub workspace: Mutex<Workspace>,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a database with `rows` under `title`.
    pub fn with_database(self, title: &str, n: u32, rows: Vec<Page>) -> Self {
        let id = DatabaseId::parse(&format!("{:032x}", 0xd000 + n)).unwrap();
        {
            let mut ws = self.workspace.lock().unwrap();
            ws.rows.insert(id.as_str().to_string(), rows);
            ws.databases.insert(title.to_string(), id);
        }
        self
    }

    pub fn with_root_page(self, title: &str, n: u32) -> Self {
        self.workspace
            .lock()
            .unwrap()
            .root_pages
            .insert(title.to_string(), page_id(0xf000 + n));
        self
    }

    pub fn with_body(self, page: &PageId, blocks: Vec<Block>) -> Self {
        self.workspace
            .lock()
            .unwrap()
            .children
            .insert(page.as_str().to_string(), blocks);
        self
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeNotion {
    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        let ws = self.workspace.lock().unwrap();
        Ok(ws.children.get(parent.as_str()).cloned().unwrap_or_default())
    }

    async fn query_database(
        &self,
        database: &DatabaseId,
        filter: Option<&Value>,
    ) -> Result<Vec<Page>, AppError> {
        let mut ws = self.workspace.lock().unwrap();
        ws.queries.push(filter.cloned());
        Ok(ws.rows.get(database.as_str()).cloned().unwrap_or_default())
    }

    async fn search(&self, query: &str, object: SearchObject) -> Result<Vec<SearchHit>, AppError> {
        let ws = self.workspace.lock().unwrap();
        let source = match object {
            SearchObject::Database => ws
                .databases
                .iter()
                .map(|(title, id)| (title.clone(), id.as_str().to_string()))
                .collect::<Vec<_>>(),
            SearchObject::Page => ws
                .root_pages
                .iter()
                .map(|(title, id)| (title.clone(), id.as_str().to_string()))
                .collect(),
        };
        Ok(source
            .into_iter()
            .filter(|(title, _)| title.contains(query))
            .map(|(title, id)| SearchHit { id, title })
            .collect())
    }

    async fn create_database(
        &self,
        _parent: &PageId,
        title: &str,
        properties: &Value,
    ) -> Result<DatabaseId, AppError> {
        let mut ws = self.workspace.lock().unwrap();
        let id = DatabaseId::parse(&format!("{:032x}", 0xc000 + ws.databases.len())).unwrap();
        ws.databases.insert(title.to_string(), id.clone());
        ws.rows.insert(id.as_str().to_string(), Vec::new());
        ws.created_databases.push((title.to_string(), properties.clone()));
        Ok(id)
    }

    async fn create_page(&self, _database: &DatabaseId, properties: &Value) -> Result<PageId, AppError> {
        let mut ws = self.workspace.lock().unwrap();
        ws.created_pages.push(properties.clone());
        Ok(page_id(0xa000 + ws.created_pages.len() as u32))
    }

    async fn update_page(&self, page: &PageId, properties: &Value) -> Result<(), AppError> {
        let mut ws = self.workspace.lock().unwrap();
        ws.updated_pages.push((page.as_str().to_string(), properties.clone()));
        Ok(())
    }

    async fn archive_page(&self, page: &PageId) -> Result<(), AppError> {
        self.workspace
            .lock()
            .unwrap()
            .archived_pages
            .push(page.as_str().to_string());
        Ok(())
    }
}
