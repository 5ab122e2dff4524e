//! In-memory storage backend.
//!
//! This is the reference implementation of `StorageBackend`. Registries and
//! the node directory each sit behind a `parking_lot::RwLock`.
//!
//! ## Limitations
//!
//! - **Single writer**: locks are taken per operation, so a sequence of
//!   upserts and appends is not atomic. Concurrent readers are fine.
//! - **Lock order**: arrows, then contexts, then nodes. Every method that
//!   holds more than one lock acquires them in that order.
//! - **No persistence**: `shutdown()` is a no-op.
//!
//! Use this backend for:
//! - Testing the solver and coarse-grainer
//! - Embedding the engine in applications that rebuild the graph on start

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{cone, StorageBackend, Upserted};
use crate::directory::NodeDirectory;
use crate::index::{validate_link, LinkOutcome};
use crate::model::*;
use crate::registry::{ArrowRegistry, ContextRegistry};
use crate::{Error, Result};

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory spacetime graph storage.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    arrows: RwLock<ArrowRegistry>,
    contexts: RwLock<ContextRegistry>,
    nodes: RwLock<NodeDirectory>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// StorageBackend impl
// ============================================================================

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn shutdown(&self) -> Result<()> { Ok(()) }

    // ========================================================================
    // Arrow registry
    // ========================================================================

    async fn register_arrow(&self, sttype: SpacetimeType, short: &str, long: &str) -> Result<ArrowId> {
        self.inner.arrows.write().register(sttype, short, long)
    }

    async fn register_inverse(&self, forward: ArrowId, backward: ArrowId) -> Result<bool> {
        Ok(self.inner.arrows.write().register_inverse(forward, backward))
    }

    async fn resolve_arrow(&self, name: &str) -> Result<Option<ArrowId>> {
        Ok(self.inner.arrows.read().resolve(name))
    }

    async fn resolve_inverse(&self, arrow: ArrowId) -> Result<Option<ArrowId>> {
        Ok(self.inner.arrows.read().inverse(arrow))
    }

    async fn arrow(&self, arrow: ArrowId) -> Result<Option<ArrowType>> {
        Ok(self.inner.arrows.read().get(arrow).cloned())
    }

    async fn arrows(&self) -> Result<Vec<ArrowType>> {
        Ok(self.inner.arrows.read().iter().cloned().collect())
    }

    async fn validate_arrows(&self) -> Result<()> {
        self.inner.arrows.read().validate()
    }

    // ========================================================================
    // Context registry
    // ========================================================================

    async fn resolve_context(&self, labels: &[String]) -> Result<ContextRef> {
        Ok(self.inner.contexts.write().resolve(labels))
    }

    async fn expand_context(&self, context: ContextRef) -> Result<Vec<String>> {
        Ok(self.inner.contexts.read().labels(context).to_vec())
    }

    async fn merge_contexts(&self, a: ContextRef, b: ContextRef) -> Result<ContextRef> {
        Ok(self.inner.contexts.write().merge(a, b))
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    async fn upsert_node(&self, text: &str, chapter: &str, seq: bool) -> Result<Upserted> {
        let mut diagnostics = Vec::new();
        let nref = self
            .inner
            .nodes
            .write()
            .insert(text, chapter, seq, &mut |d| diagnostics.push(d));
        Ok(Upserted { nref, diagnostics })
    }

    async fn get_node(&self, nref: NodeRef) -> Result<Option<Node>> {
        Ok(self.inner.nodes.read().get(nref).cloned())
    }

    async fn node_text(&self, nref: NodeRef) -> Result<Option<String>> {
        Ok(self.inner.nodes.read().get(nref).map(|n| n.text.clone()))
    }

    async fn find_nodes(&self, name: &str, chapter: &str, limit: usize) -> Result<Vec<NodeRef>> {
        Ok(self.inner.nodes.read().search(name, chapter, limit))
    }

    async fn chapters(&self) -> Result<Vec<String>> {
        Ok(self.inner.nodes.read().chapters())
    }

    async fn delete_chapter(&self, chapter: &str) -> Result<Vec<NodeRef>> {
        Ok(self.inner.nodes.write().remove_chapter(chapter))
    }

    // ========================================================================
    // Links
    // ========================================================================

    async fn append_link(
        &self,
        from: NodeRef,
        arrow: ArrowId,
        to: NodeRef,
        weight: f32,
        context: ContextRef,
    ) -> Result<LinkOutcome> {
        validate_link(from, to, weight)?;

        let sttype = self
            .inner
            .arrows
            .read()
            .sttype(arrow)
            .ok_or_else(|| Error::UnknownArrow(arrow.to_string()))?;

        let mut contexts = self.inner.contexts.write();
        let mut nodes = self.inner.nodes.write();
        if nodes.get(to).is_none() {
            return Err(Error::NotFound(format!("node {to}")));
        }
        let origin = nodes
            .get_mut(from)
            .ok_or_else(|| Error::NotFound(format!("node {from}")))?;

        let link = Link { arrow, weight, context, dst: to };
        Ok(origin.links.append(sttype, link, &mut contexts))
    }

    // ========================================================================
    // Cone / path retrieval
    // ========================================================================

    async fn neighbors(
        &self,
        node: NodeRef,
        sttype: SpacetimeType,
        exclude: &[NodeRef],
        limit: usize,
    ) -> Result<Vec<Link>> {
        Ok(cone::neighbors(&self.inner.nodes.read(), node, sttype, exclude, limit))
    }

    async fn cone_paths(
        &self,
        start: &[NodeRef],
        max_depth: usize,
        filter: &SearchFilter,
        max_branch: usize,
    ) -> Result<Vec<Path>> {
        let contexts = self.inner.contexts.read();
        let nodes = self.inner.nodes.read();
        Ok(cone::constrained_paths(&nodes, &contexts, start, max_depth, filter, max_branch))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    async fn node_count(&self) -> Result<u64> {
        Ok(self.inner.nodes.read().len() as u64)
    }

    async fn link_count(&self) -> Result<u64> {
        Ok(self.inner.nodes.read().link_count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn then_from(db: &MemoryBackend) -> (ArrowId, ArrowId) {
        let then = db.register_arrow(SpacetimeType::LeadsTo, "then", "leads to next").await.unwrap();
        let from = db.register_arrow(SpacetimeType::ComesFrom, "from", "comes after").await.unwrap();
        assert!(db.register_inverse(then, from).await.unwrap());
        (then, from)
    }

    #[tokio::test]
    async fn test_upsert_and_get_node() {
        let db = MemoryBackend::new();
        let up = db.upsert_node("Ada Lovelace", "people", false).await.unwrap();
        assert!(up.diagnostics.is_empty());

        let node = db.get_node(up.nref).await.unwrap().unwrap();
        assert_eq!(node.text, "Ada Lovelace");
        assert_eq!(node.nref.class, SizeClass::TwoGram);
        assert_eq!(db.node_text(up.nref).await.unwrap().as_deref(), Some("Ada Lovelace"));
        assert_eq!(db.node_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_reports_capitalization() {
        let db = MemoryBackend::new();
        db.upsert_node("Tea", "drinks", false).await.unwrap();
        let up = db.upsert_node("tea", "drinks", false).await.unwrap();
        assert_eq!(up.diagnostics.len(), 1);
        assert_eq!(db.node_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_append_link_uses_arrow_bucket() {
        let db = MemoryBackend::new();
        let (then, _) = then_from(&db).await;
        let a = db.upsert_node("a", "t", false).await.unwrap().nref;
        let b = db.upsert_node("b", "t", false).await.unwrap().nref;

        let outcome = db.append_link(a, then, b, 1.0, ContextRef::ANY).await.unwrap();
        assert_eq!(outcome, LinkOutcome::Appended);

        let links = db.neighbors(a, SpacetimeType::LeadsTo, &[], 10).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].dst, b);
        assert!(db.neighbors(a, SpacetimeType::Near, &[], 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_link_rejections() {
        let db = MemoryBackend::new();
        let (then, _) = then_from(&db).await;
        let a = db.upsert_node("a", "t", false).await.unwrap().nref;
        let b = db.upsert_node("b", "t", false).await.unwrap().nref;

        assert!(matches!(db.append_link(a, then, a, 1.0, ContextRef::ANY).await, Err(Error::SelfLoop(_))));
        assert!(matches!(db.append_link(a, then, b, 0.0, ContextRef::ANY).await, Err(Error::ZeroWeight { .. })));
        assert!(matches!(db.append_link(a, ArrowId(77), b, 1.0, ContextRef::ANY).await, Err(Error::UnknownArrow(_))));
        let ghost = NodeRef::new(SizeClass::OneGram, 99);
        assert!(matches!(db.append_link(a, then, ghost, 1.0, ContextRef::ANY).await, Err(Error::NotFound(_))));
        assert_eq!(db.link_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_forward_paths_default() {
        let db = MemoryBackend::new();
        let (then, _) = then_from(&db).await;
        let a = db.upsert_node("a", "t", false).await.unwrap().nref;
        let b = db.upsert_node("b", "t", false).await.unwrap().nref;
        let c = db.upsert_node("c", "t", false).await.unwrap().nref;
        db.append_link(a, then, b, 1.0, ContextRef::ANY).await.unwrap();
        db.append_link(b, then, c, 1.0, ContextRef::ANY).await.unwrap();

        let paths = db.forward_paths(a, SpacetimeType::LeadsTo, 5, 10).await.unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes().collect::<Vec<_>>(), vec![a, b, c]);
        assert!(paths[0][0].is_origin());
    }

    #[tokio::test]
    async fn test_context_roundtrip() {
        let db = MemoryBackend::new();
        let ctx = db.resolve_context(&["b, a".to_string()]).await.unwrap();
        assert_eq!(db.expand_context(ctx).await.unwrap(), vec!["a", "b"]);
        let other = db.resolve_context(&["c".to_string()]).await.unwrap();
        let merged = db.merge_contexts(ctx, other).await.unwrap();
        assert_eq!(db.expand_context(merged).await.unwrap(), vec!["a", "b", "c"]);
    }
}
