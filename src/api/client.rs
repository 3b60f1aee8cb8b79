// src/api/client.rs
//! Pure HTTP client wrapper for Notion API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the Notion API. It handles authentication and
//! basic request/response operations without parsing or business logic.

use super::pagination::fetch_all_pages;
use super::parser;
use crate::constants::{NOTION_API_BASE_URL, NOTION_API_VERSION, NOTION_MAX_RESULT_PAGES};
use crate::error::AppError;
use crate::model::{Block, Page, SearchHit, SearchObject};
use crate::types::{ApiKey, DatabaseId, NotionId, PageId};
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey, timeout: Duration) -> Result<Self, AppError> {
        Self::with_base_url(api_key, timeout, NOTION_API_BASE_URL)
    }

    /// Same as [`NotionHttpClient::new`] against another API root.
    pub fn with_base_url(
        api_key: &ApiKey,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Makes a GET request with query parameters.
    pub async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).query(query).send().await?)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Makes a PATCH request with JSON body to the specified endpoint.
    pub async fn patch<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("PATCH {}", url);
        Ok(self.client.patch(url).json(body).send().await?)
    }
}

/// Adds `page_size` and, when present, `start_cursor` to a JSON request body.
fn paged_body(mut body: Value, page_size: usize, cursor: Option<String>) -> Value {
    body["page_size"] = json!(page_size);
    if let Some(cursor) = cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_hyphenated());
        let result = fetch_all_pages(
            |page_size, cursor| {
                let endpoint = endpoint.clone();
                async move {
                    let mut query = vec![("page_size", page_size.to_string())];
                    if let Some(cursor) = cursor {
                        query.push(("start_cursor", cursor));
                    }
                    let response = self.get(&endpoint, &query).await?;
                    parser::parse_blocks_pagination(extract_response_text(response).await?)
                }
            },
            Some(NOTION_MAX_RESULT_PAGES),
        )
        .await?;
        Ok(result.items)
    }

    async fn query_database(
        &self,
        database: &DatabaseId,
        filter: Option<&Value>,
    ) -> Result<Vec<Page>, AppError> {
        let endpoint = format!("databases/{}/query", database.to_hyphenated());
        let base = match filter {
            Some(filter) => json!({ "filter": filter }),
            None => json!({}),
        };
        let result = fetch_all_pages(
            |page_size, cursor| {
                let endpoint = endpoint.clone();
                let body = paged_body(base.clone(), page_size, cursor);
                async move {
                    let response = self.post(&endpoint, &body).await?;
                    parser::parse_pages_pagination(extract_response_text(response).await?)
                }
            },
            Some(NOTION_MAX_RESULT_PAGES),
        )
        .await?;
        log::debug!(
            "Queried {} rows from database {} in {} requests",
            result.items.len(),
            database,
            result.pages_fetched
        );
        Ok(result.items)
    }

    async fn search(&self, query: &str, object: SearchObject) -> Result<Vec<SearchHit>, AppError> {
        let base = json!({
            "query": query,
            "filter": { "value": object.as_str(), "property": "object" },
        });
        let result = fetch_all_pages(
            |page_size, cursor| {
                let body = paged_body(base.clone(), page_size, cursor);
                async move {
                    let response = self.post("search", &body).await?;
                    parser::parse_search_pagination(extract_response_text(response).await?)
                }
            },
            Some(NOTION_MAX_RESULT_PAGES),
        )
        .await?;
        Ok(result.items)
    }

    async fn create_database(
        &self,
        parent: &PageId,
        title: &str,
        properties: &Value,
    ) -> Result<DatabaseId, AppError> {
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent.to_hyphenated() },
            "title": [{ "type": "text", "text": { "content": title } }],
            "properties": properties,
        });
        let response = self.post("databases", &body).await?;
        let id = parser::parse_created_id(extract_response_text(response).await?)?;
        Ok(DatabaseId::parse(&id)?)
    }

    async fn create_page(&self, database: &DatabaseId, properties: &Value) -> Result<PageId, AppError> {
        let body = json!({
            "parent": { "database_id": database.to_hyphenated() },
            "properties": properties,
        });
        let response = self.post("pages", &body).await?;
        let id = parser::parse_created_id(extract_response_text(response).await?)?;
        Ok(PageId::parse(&id)?)
    }

    async fn update_page(&self, page: &PageId, properties: &Value) -> Result<(), AppError> {
        let body = json!({ "properties": properties, "archived": false });
        let endpoint = format!("pages/{}", page.to_hyphenated());
        let response = self.patch(&endpoint, &body).await?;
        parser::parse_created_id(extract_response_text(response).await?)?;
        Ok(())
    }

    async fn archive_page(&self, page: &PageId) -> Result<(), AppError> {
        let endpoint = format!("pages/{}", page.to_hyphenated());
        let response = self.patch(&endpoint, &json!({ "archived": true })).await?;
        parser::parse_created_id(extract_response_text(response).await?)?;
        Ok(())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
