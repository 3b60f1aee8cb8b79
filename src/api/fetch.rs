// src/api/fetch.rs
//! Block-tree fetching as an explicit worklist.
//!
//! A page body is a tree of blocks, but Notion only hands out one level at
//! a time. Instead of recursing through the API, the fetcher keeps a stack
//! of parents still to expand. Each entry carries its own [`FetchContext`]
//! (remaining depth plus the ids on the path from the root), so cycles and
//! runaway nesting are cut off per branch. Children are stored flat by
//! parent id and stitched into owned [`Block`] values at the end.

use super::types::FetchContext;
use super::NotionRepository;
use crate::error::AppError;
use crate::model::Block;
use crate::types::NotionId;
use std::collections::HashMap;

/// Fetches the complete block tree under a page or block.
pub struct BlockTreeFetcher<'a> {
    repository: &'a dyn NotionRepository,
    max_depth: usize,
}

/// Counters from one fetch, logged by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub requests: usize,
    pub blocks: usize,
    pub failed_parents: usize,
    pub depth_limited: usize,
}

impl<'a> BlockTreeFetcher<'a> {
    pub fn new(repository: &'a dyn NotionRepository) -> Self {
        Self::with_max_depth(repository, crate::constants::NOTION_MAX_FETCH_DEPTH)
    }

    pub fn with_max_depth(repository: &'a dyn NotionRepository, max_depth: usize) -> Self {
        Self {
            repository,
            max_depth,
        }
    }

    /// Fetches the children of `root` and, transitively, of every block that
    /// reports `has_children`.
    ///
    /// Failing to list the root's own children is an error. Failures deeper
    /// in the tree are logged and leave that block childless.
    pub async fn fetch_tree(&self, root: &NotionId) -> Result<Vec<Block>, AppError> {
        self.fetch_tree_with_stats(root).await.map(|(blocks, _)| blocks)
    }

    pub async fn fetch_tree_with_stats(
        &self,
        root: &NotionId,
    ) -> Result<(Vec<Block>, FetchStats), AppError> {
        let mut stats = FetchStats::default();
        let root_context = FetchContext::new(self.max_depth).with_visited(root.clone());

        let top_level = self.repository.retrieve_children(root).await?;
        stats.requests += 1;
        stats.blocks += top_level.len();

        let mut children_by_parent: HashMap<NotionId, Vec<Block>> = HashMap::new();
        let mut worklist: Vec<(NotionId, FetchContext)> = Vec::new();
        self.plan(&top_level, &root_context, &mut worklist, &mut stats);

        while let Some((parent, context)) = worklist.pop() {
            match self.repository.retrieve_children(&parent).await {
                Ok(children) => {
                    stats.requests += 1;
                    stats.blocks += children.len();
                    self.plan(&children, &context, &mut worklist, &mut stats);
                    children_by_parent.insert(parent, children);
                }
                Err(e) => {
                    stats.requests += 1;
                    stats.failed_parents += 1;
                    log::warn!("Failed to fetch children of block {}: {}", parent, e);
                }
            }
        }

        log::debug!(
            "Fetched {} blocks under {} in {} requests",
            stats.blocks,
            root,
            stats.requests
        );

        Ok((assemble(top_level, &mut children_by_parent), stats))
    }

    /// Queues every block in `blocks` that has children worth fetching.
    fn plan(
        &self,
        blocks: &[Block],
        context: &FetchContext,
        worklist: &mut Vec<(NotionId, FetchContext)>,
        stats: &mut FetchStats,
    ) {
        let next = context.clone().with_decremented_depth();
        // reversed so the stack pops siblings in document order
        for block in blocks.iter().rev().filter(|b| b.has_children()) {
            let id = NotionId::from(block.id());
            if next.depth_remaining == 0 {
                stats.depth_limited += 1;
                log::warn!(
                    "Block {} is nested deeper than {} levels; its children are skipped",
                    id,
                    self.max_depth
                );
            } else if !next.should_fetch(&id) {
                log::warn!("Block {} was already visited; skipping", id);
            } else {
                worklist.push((id.clone(), next.clone().with_visited(id)));
            }
        }
    }
}

/// Moves fetched children under their parents, depth first.
fn assemble(blocks: Vec<Block>, children_by_parent: &mut HashMap<NotionId, Vec<Block>>) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|mut block| {
            let id = NotionId::from(block.id());
            if let Some(children) = children_by_parent.remove(&id) {
                block.set_children(assemble(children, children_by_parent));
            }
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, SearchHit, SearchObject};
    use crate::types::{BlockId, DatabaseId, PageId, RichTextItem};
    use serde_json::Value;
    use std::sync::Mutex;

    /// Serves children from a fixed map and records requests.
    struct TreeSource {
        children: HashMap<NotionId, Vec<Block>>,
        failing: Option<NotionId>,
        requests: Mutex<Vec<NotionId>>,
    }

    #[async_trait::async_trait]
    impl NotionRepository for TreeSource {
        async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
            self.requests.lock().unwrap().push(parent.clone());
            if self.failing.as_ref() == Some(parent) {
                return Err(AppError::MalformedResponse("boom".into()));
            }
            Ok(self.children.get(parent).cloned().unwrap_or_default())
        }
        async fn query_database(&self, _: &DatabaseId, _: Option<&Value>) -> Result<Vec<Page>, AppError> {
            unreachable!()
        }
        async fn search(&self, _: &str, _: SearchObject) -> Result<Vec<SearchHit>, AppError> {
            unreachable!()
        }
        async fn create_database(&self, _: &PageId, _: &str, _: &Value) -> Result<DatabaseId, AppError> {
            unreachable!()
        }
        async fn create_page(&self, _: &DatabaseId, _: &Value) -> Result<PageId, AppError> {
            unreachable!()
        }
        async fn update_page(&self, _: &PageId, _: &Value) -> Result<(), AppError> {
            unreachable!()
        }
        async fn archive_page(&self, _: &PageId) -> Result<(), AppError> {
            unreachable!()
        }
    }

    fn id(n: u8) -> NotionId {
        NotionId::parse(&format!("{:032x}", n)).unwrap()
    }

    fn block(n: u8, text: &str, has_children: bool) -> Block {
        let mut block = Block::paragraph(vec![RichTextItem::plain_text(text)]);
        let common = block.common_mut();
        common.id = BlockId::parse(id(n).as_str()).unwrap();
        common.has_children = has_children;
        block
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .map(|b| match b {
                Block::Paragraph(p) => crate::types::plain_text_of(&p.content.rich_text),
                other => other.block_type().to_string(),
            })
            .collect()
    }

    fn source(entries: Vec<(NotionId, Vec<Block>)>) -> TreeSource {
        TreeSource {
            children: entries.into_iter().collect(),
            failing: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn assembles_nested_children_in_order() {
        let source = source(vec![
            (id(1), vec![block(2, "a", true), block(3, "b", false), block(4, "c", true)]),
            (id(2), vec![block(5, "a.1", true)]),
            (id(5), vec![block(6, "a.1.1", false)]),
            (id(4), vec![block(7, "c.1", false)]),
        ]);

        let tree = BlockTreeFetcher::new(&source).fetch_tree(&id(1)).await.unwrap();

        assert_eq!(texts(&tree), vec!["a", "b", "c"]);
        assert_eq!(texts(tree[0].children()), vec!["a.1"]);
        assert_eq!(texts(tree[0].children()[0].children()), vec!["a.1.1"]);
        assert_eq!(texts(tree[2].children()), vec!["c.1"]);
        assert!(tree[1].children().is_empty());
        // depth first, siblings in document order
        assert_eq!(
            *source.requests.lock().unwrap(),
            vec![id(1), id(2), id(5), id(4)]
        );
    }

    #[tokio::test]
    async fn stops_at_max_depth() {
        let source = source(vec![
            (id(1), vec![block(2, "a", true)]),
            (id(2), vec![block(3, "a.1", true)]),
            (id(3), vec![block(4, "a.1.1", false)]),
        ]);

        let (tree, stats) = BlockTreeFetcher::with_max_depth(&source, 2)
            .fetch_tree_with_stats(&id(1))
            .await
            .unwrap();

        assert_eq!(texts(tree[0].children()), vec!["a.1"]);
        assert!(tree[0].children()[0].children().is_empty());
        assert_eq!(stats.depth_limited, 1);
    }

    #[tokio::test]
    async fn cycles_are_cut() {
        // block 2 claims block 1 (the root) as its own child
        let source = source(vec![
            (id(1), vec![block(2, "a", true)]),
            (id(2), vec![block(1, "loop", true)]),
        ]);

        let (tree, stats) = BlockTreeFetcher::new(&source)
            .fetch_tree_with_stats(&id(1))
            .await
            .unwrap();

        assert_eq!(texts(tree[0].children()), vec!["loop"]);
        assert!(tree[0].children()[0].children().is_empty());
        assert_eq!(stats.requests, 2);
    }

    #[tokio::test]
    async fn child_failures_leave_block_childless() {
        let mut source = source(vec![(id(1), vec![block(2, "a", true), block(3, "b", false)])]);
        source.failing = Some(id(2));

        let (tree, stats) = BlockTreeFetcher::new(&source)
            .fetch_tree_with_stats(&id(1))
            .await
            .unwrap();

        assert_eq!(texts(&tree), vec!["a", "b"]);
        assert!(tree[0].children().is_empty());
        assert_eq!(stats.failed_parents, 1);
    }

    #[tokio::test]
    async fn root_failure_is_an_error() {
        let mut source = source(vec![]);
        source.failing = Some(id(1));
        assert!(BlockTreeFetcher::new(&source).fetch_tree(&id(1)).await.is_err());
    }
}
