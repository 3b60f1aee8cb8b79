// src/api/types.rs
//! Type definitions for the Notion API module.

use crate::types::NotionId;

// --- Fetch Context Types ---

/// Immutable context for one branch of a block-tree fetch.
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// Set of already visited IDs to prevent cycles (persistent for cheap cloning)
    visited: im::HashSet<NotionId>,
    /// Remaining recursion depth
    pub depth_remaining: usize,
}

impl FetchContext {
    /// Creates a new fetch context with the given depth limit.
    pub fn new(max_depth: usize) -> Self {
        // Clamp depth to prevent runaway fetches
        let safe_depth = max_depth.min(crate::constants::NOTION_MAX_FETCH_DEPTH);
        if max_depth > safe_depth {
            log::warn!(
                "Requested fetch depth {} exceeds maximum safe depth {}. Clamping to safe value.",
                max_depth,
                safe_depth
            );
        }

        Self {
            visited: im::HashSet::new(),
            depth_remaining: safe_depth,
        }
    }

    /// Returns a new context with the given ID marked as visited.
    pub fn with_visited(self, id: NotionId) -> Self {
        let mut visited = self.visited;
        visited.insert(id);
        Self { visited, ..self }
    }

    /// Returns a new context with decremented depth.
    pub fn with_decremented_depth(self) -> Self {
        Self {
            depth_remaining: self.depth_remaining.saturating_sub(1),
            ..self
        }
    }

    /// Checks if we should continue fetching.
    pub fn should_fetch(&self, id: &NotionId) -> bool {
        !self.visited.contains(id) && self.depth_remaining > 0
    }
}

// --- Pagination Types ---

/// Result of a pagination operation.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: usize,
}
