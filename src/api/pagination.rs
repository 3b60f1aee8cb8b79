// src/api/pagination.rs
//! Cursor pagination over async closures.

use super::responses::PaginatedResponse;
use super::types::PaginationResult;
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;

/// Fetches every page of a cursor-paginated listing.
///
/// `fetch_fn` receives the page size and the cursor from the previous
/// response (`None` on the first call). Stops when Notion reports no more
/// results, when it omits the cursor, or after `max_pages`.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_fn: F,
    max_pages: Option<usize>,
) -> Result<PaginationResult<T>, AppError>
where
    F: FnMut(usize, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0usize;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::warn!("Stopped paginating after {} pages", max);
                break;
            }
        }

        let response = fetch_fn(NOTION_API_PAGE_SIZE, cursor).await?;

        let has_more = response.has_more;
        cursor = response.next_cursor;
        all_items.extend(response.results);
        pages_fetched += 1;

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationResult {
        items: all_items,
        pages_fetched,
    })
}
