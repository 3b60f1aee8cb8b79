// src/lib.rs
//! notion-site-sync library: keeps a static site's JSON data files in step
//! with Notion databases.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `SyncConfig`, `CommandLineInput`, `Action`
//! - **Datasets**: `DatasetSpec`, `DATASETS`, `Record`
//! - **Domain model**: `Block`, `Page`, `PropertyValue`, rich text types
//! - **API client**: `NotionRepository`, `NotionHttpClient`, `BlockTreeFetcher`
//! - **Formatting**: `render_blocks`, `render_content`, `sanitize`
//! - **Images**: `AssetResolver`, `CloudflareImages`, `ImageHost`
//! - **Sync**: `SyncService` and its reports (pull, push, rehost, status)
//! - **Admin**: the dashboard router and server

pub mod admin;
pub mod api;
pub mod config;
pub mod constants;
pub mod datasets;
pub mod error;
pub mod formatting;
pub mod images;
pub mod model;
pub mod output;
pub mod sync;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionClientError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{Action, Command, CommandLineInput, SyncConfig};

// --- Datasets ---
pub use crate::datasets::{
    find as find_dataset, select_datasets, DatasetSpec, FieldKind, FieldSpec, Record, DATASETS,
};

// --- Domain Model ---
pub use crate::model::{
    Block, DatabaseHandle, FileRef, ImageSource, Page, PropertyValue, SearchHit, SearchObject,
};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, CloudflareCredentials, DatabaseId, Link, MentionKind, NotionId,
    PageId, RichTextItem, RichTextType,
};

// --- API Client ---
pub use crate::api::{BlockTreeFetcher, FetchStats, NotionHttpClient, NotionRepository};

// --- Formatting ---
pub use crate::formatting::{
    render_blocks, render_content, sanitize, sanitize_markup, RenderContext, RenderedHtml,
    TrackingPixelRules,
};

// --- Images ---
pub use crate::images::{is_permanent_url, AssetResolver, CloudflareImages, ImageHost};

// --- Output ---
pub use crate::output::{load_records, write_records};

// --- Sync ---
pub use crate::sync::{DatasetStatus, PullReport, PushReport, RehostReport, SyncService};
