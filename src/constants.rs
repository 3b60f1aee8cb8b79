// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

pub const NOTION_API_VERSION: &str = "2022-06-28";

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips during recursive fetching.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// Upper bound on result pages followed for a single listing.
pub const NOTION_MAX_RESULT_PAGES: usize = 1000;

/// Maximum nesting depth when fetching a page body's block tree.
///
/// Blocks nested deeper than this are kept but their children are not
/// requested.
pub const NOTION_MAX_FETCH_DEPTH: usize = 50;

/// Notion rejects rich text objects whose content exceeds this many chars.
pub const NOTION_RICH_TEXT_LIMIT: usize = 2000;

/// Default timeout for Notion API calls, overridable via configuration.
pub const NOTION_HTTP_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Rendering boundaries
// ---------------------------------------------------------------------------

/// Maximum nesting depth when rendering blocks to HTML.
///
/// Children below this depth are dropped from the output.
pub const BLOCK_MAX_RENDER_DEPTH: usize = 100;

/// Estimated characters per block, used to pre-allocate output strings.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

/// Images no larger than this on both sides are treated as tracking pixels.
pub const TRACKING_PIXEL_MAX_DIMENSION: u32 = 1;

// ---------------------------------------------------------------------------
// Image hosting
// ---------------------------------------------------------------------------

pub const CLOUDFLARE_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Host of Cloudflare Images delivery URLs.
pub const CLOUDFLARE_DELIVERY_HOST: &str = "imagedelivery.net";

pub const IMAGE_UPLOAD_TIMEOUT_SECS: u64 = 60;

pub const IMAGE_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Some image hosts refuse requests without a browser-like agent.
pub const IMAGE_DOWNLOAD_USER_AGENT: &str = "Mozilla/5.0";

// ---------------------------------------------------------------------------
// Admin server
// ---------------------------------------------------------------------------

pub const ADMIN_DEFAULT_HOST: &str = "127.0.0.1";

pub const ADMIN_DEFAULT_PORT: u16 = 8765;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
