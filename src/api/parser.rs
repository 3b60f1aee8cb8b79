// src/api/parser.rs
//! Response parsing using notion-client's serde types.

use super::client::ApiResponse;
use super::responses::{
    CreatedObject, NotionError, PaginatedResponse, QueryDatabaseResponse,
    RetrieveBlockChildrenResponse, SearchResponse,
};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use crate::model::{Block, Page, SearchHit};
use reqwest::StatusCode;

/// Parse any Notion API response using notion-client types
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        parse_error(&result.data, result.status, &result.url)
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: preview(body),
        }
        .into()
    })
}

fn parse_error<T>(body: &str, status: StatusCode, url: &str) -> Result<T, AppError> {
    if let Ok(notion_error) = serde_json::from_str::<NotionError>(body) {
        return Err(NotionClientError::NotionApi {
            status: notion_error.status,
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            request_id: notion_error.request_id,
        }
        .into());
    }

    // Fallback to generic error with HTTP status code
    Err(AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}: {}", status, url, preview(body)),
        status,
    })
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

pub fn parse_pages_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Page>, AppError> {
    let response: QueryDatabaseResponse = parse_api_response(result)?;
    let object = response.object.clone();
    let next_cursor = response.next_cursor.clone();
    let has_more = response.has_more;

    Ok(PaginatedResponse {
        object,
        results: response.into_domain_pages()?,
        next_cursor,
        has_more,
    })
}

pub fn parse_blocks_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let response: RetrieveBlockChildrenResponse = parse_api_response(result)?;
    let object = response.object.clone();
    let next_cursor = response.next_cursor.clone();
    let has_more = response.has_more;

    Ok(PaginatedResponse {
        object,
        results: response.into_domain_blocks(),
        next_cursor,
        has_more,
    })
}

pub fn parse_search_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<SearchHit>, AppError> {
    let response: SearchResponse = parse_api_response(result)?;

    Ok(PaginatedResponse {
        object: response.object,
        results: response
            .results
            .into_iter()
            .filter_map(super::notion_client_adapter::convert_search_hit)
            .collect(),
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    })
}

/// Parse the id out of a create or update response.
pub fn parse_created_id(result: ApiResponse<String>) -> Result<String, AppError> {
    let created: CreatedObject = parse_api_response(result)?;
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, ImageSource};
    use pretty_assertions::assert_eq;

    fn ok(body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status: StatusCode::OK,
            url: "https://api.notion.com/v1/test".to_string(),
        }
    }

    #[test]
    fn notion_error_bodies_become_api_errors() {
        let result = ApiResponse {
            data: r#"{
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find page with ID: abc123",
                "request_id": "req_123"
            }"#
            .to_string(),
            status: StatusCode::NOT_FOUND,
            url: "https://api.notion.com/v1/pages/abc".to_string(),
        };

        match parse_created_id(result) {
            Err(AppError::NotionClient(NotionClientError::NotionApi { code, status, .. })) => {
                assert_eq!(code, NotionErrorCode::ObjectNotFound);
                assert_eq!(status, 404);
            }
            other => panic!("expected NotionApi error, got {:?}", other),
        }
    }

    #[test]
    fn unparseable_error_bodies_fall_back_to_status() {
        let result = ApiResponse {
            data: "<html>bad gateway</html>".to_string(),
            status: StatusCode::BAD_GATEWAY,
            url: "https://api.notion.com/v1/search".to_string(),
        };
        match parse_created_id(result) {
            Err(AppError::NotionService { code, .. }) => {
                assert_eq!(code, NotionErrorCode::HttpStatus(502))
            }
            other => panic!("expected NotionService error, got {:?}", other),
        }
    }

    #[test]
    fn unreadable_blocks_do_not_sink_their_siblings() {
        let body = r#"{
            "object": "list",
            "results": [
                {
                    "object": "block",
                    "id": "c02fc1d3-db8b-45c5-a222-27595b15aea7",
                    "parent": {"type": "page_id", "page_id": "b2c3d4e5-f678-9012-abcd-ef1234567890"},
                    "created_time": "2022-03-01T19:05:00.000Z",
                    "last_edited_time": "2022-03-01T19:05:00.000Z",
                    "created_by": {"object": "user", "id": "user-id"},
                    "last_edited_by": {"object": "user", "id": "user-id"},
                    "has_children": false,
                    "archived": false,
                    "type": "paragraph",
                    "paragraph": {
                        "rich_text": [{
                            "type": "text",
                            "text": {"content": "still here", "link": null},
                            "annotations": {
                                "bold": false, "italic": false, "strikethrough": false,
                                "underline": false, "code": false, "color": "default"
                            },
                            "plain_text": "still here",
                            "href": null
                        }],
                        "color": "default"
                    }
                },
                {
                    "object": "block",
                    "id": "a1b2c3d4-db8b-45c5-a222-27595b15aea7",
                    "type": "image",
                    "image": {}
                }
            ],
            "next_cursor": null,
            "has_more": false
        }"#;

        let page = parse_blocks_pagination(ok(body)).unwrap();
        assert_eq!(page.results.len(), 2);
        assert!(matches!(&page.results[0], Block::Paragraph(_)));
        match &page.results[1] {
            Block::Unsupported(unsupported) => {
                assert_eq!(unsupported.block_type, "image");
                assert_eq!(
                    unsupported.common.id.as_str(),
                    "a1b2c3d4db8b45c5a22227595b15aea7"
                );
            }
            other => panic!("expected unsupported block, got {:?}", other),
        }
    }

    #[test]
    fn parses_block_children_page() {
        let body = r#"{
            "object": "list",
            "results": [
                {
                    "object": "block",
                    "id": "c02fc1d3-db8b-45c5-a222-27595b15aea7",
                    "parent": {"type": "page_id", "page_id": "b2c3d4e5-f678-9012-abcd-ef1234567890"},
                    "created_time": "2022-03-01T19:05:00.000Z",
                    "last_edited_time": "2022-03-01T19:05:00.000Z",
                    "created_by": {"object": "user", "id": "user-id"},
                    "last_edited_by": {"object": "user", "id": "user-id"},
                    "has_children": false,
                    "archived": false,
                    "type": "paragraph",
                    "paragraph": {
                        "rich_text": [{
                            "type": "text",
                            "text": {"content": "Hello <b>", "link": null},
                            "annotations": {
                                "bold": false, "italic": false, "strikethrough": false,
                                "underline": false, "code": false, "color": "default"
                            },
                            "plain_text": "Hello <b>",
                            "href": null
                        }],
                        "color": "default"
                    }
                },
                {
                    "object": "block",
                    "id": "a1b2c3d4-db8b-45c5-a222-27595b15aea7",
                    "parent": {"type": "page_id", "page_id": "b2c3d4e5-f678-9012-abcd-ef1234567890"},
                    "created_time": "2022-03-01T19:05:00.000Z",
                    "last_edited_time": "2022-03-01T19:05:00.000Z",
                    "created_by": {"object": "user", "id": "user-id"},
                    "last_edited_by": {"object": "user", "id": "user-id"},
                    "has_children": false,
                    "archived": false,
                    "type": "image",
                    "image": {
                        "type": "external",
                        "external": {"url": "https://cdn.example.com/a.png"}
                    }
                }
            ],
            "next_cursor": "cursor-2",
            "has_more": true
        }"#;

        let page = parse_blocks_pagination(ok(body)).unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
        assert!(page.has_more);
        assert_eq!(page.results.len(), 2);

        match &page.results[0] {
            Block::Paragraph(p) => {
                assert_eq!(crate::types::plain_text_of(&p.content.rich_text), "Hello <b>")
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
        match &page.results[1] {
            Block::Image(image) => assert_eq!(
                image.source,
                ImageSource::External {
                    url: "https://cdn.example.com/a.png".to_string()
                }
            ),
            other => panic!("expected image, got {:?}", other),
        }
    }
}
