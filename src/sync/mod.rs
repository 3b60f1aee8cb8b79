// src/sync/mod.rs
//! Moving records between Notion databases and local JSON files.
//!
//! [`SyncService`] holds the collaborators shared by every operation; each
//! operation lives in its own submodule.

mod database;
mod pull;
mod push;
mod rehost;
mod status;

pub use pull::PullReport;
pub use push::PushReport;
pub use rehost::RehostReport;
pub use status::DatasetStatus;

use crate::api::NotionRepository;
use crate::datasets::DatasetSpec;
use crate::formatting::TrackingPixelRules;
use crate::images::AssetResolver;
use std::path::PathBuf;
use std::sync::Arc;

/// Default number of page bodies rendered at once.
///
/// Notion rate-limits integrations to a few requests per second, so this
/// stays well below what the machine could handle.
pub fn default_concurrency() -> usize {
    num_cpus::get().clamp(2, 8)
}

/// Runs pull, push and status for any dataset.
#[derive(Clone)]
pub struct SyncService {
    repository: Arc<dyn NotionRepository>,
    resolver: AssetResolver,
    rules: TrackingPixelRules,
    concurrency: usize,
    /// Directory export paths are relative to; the working directory when unset.
    data_root: Option<PathBuf>,
}

impl SyncService {
    pub fn new(repository: Arc<dyn NotionRepository>, resolver: AssetResolver) -> Self {
        Self {
            repository,
            resolver,
            rules: TrackingPixelRules::default(),
            concurrency: default_concurrency(),
            data_root: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_tracking_rules(mut self, rules: TrackingPixelRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    /// Where `spec`'s JSON file lives for this service.
    pub fn export_path(&self, spec: &DatasetSpec) -> PathBuf {
        match &self.data_root {
            Some(root) => root.join(spec.export_path),
            None => spec.export_path(),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }
}
