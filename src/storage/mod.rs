//! # Storage Backend Trait
//!
//! This is THE contract between the spacetime engine and whatever holds the
//! graph. Registries, the node directory, link buckets and cone retrieval
//! are all reached through it, so the solver never touches storage directly.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryBackend` | `memory` | In-memory for testing/embedding |
//!
//! Backends that keep a `NodeDirectory` in memory can reuse the cone
//! expansion in [`cone`].

pub mod cone;
pub mod memory;

use async_trait::async_trait;

use crate::directory::Diagnostic;
use crate::index::LinkOutcome;
use crate::model::*;
use crate::Result;

pub use memory::MemoryBackend;

// ============================================================================
// Upsert result
// ============================================================================

/// Result of `upsert_node`: the node plus anything worth warning about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub nref: NodeRef,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// StorageBackend Trait
// ============================================================================

/// The universal storage contract.
///
/// Link appends are one-sided: the engine issues the mirrored append with
/// the inverse arrow. Cone retrieval must be bounded, cycle-avoiding and
/// deterministic for a fixed graph.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut down the backend, flushing any pending writes.
    async fn shutdown(&self) -> Result<()>;

    // ========================================================================
    // Arrow registry
    // ========================================================================

    /// Register a relation by spacetime type, short and long name.
    async fn register_arrow(&self, sttype: SpacetimeType, short: &str, long: &str) -> Result<ArrowId>;

    /// Bind two relations as inverses. Invalid ids are ignored (`false`).
    async fn register_inverse(&self, forward: ArrowId, backward: ArrowId) -> Result<bool>;

    /// Look a relation up by short or long name.
    async fn resolve_arrow(&self, name: &str) -> Result<Option<ArrowId>>;

    async fn resolve_inverse(&self, arrow: ArrowId) -> Result<Option<ArrowId>>;

    async fn arrow(&self, arrow: ArrowId) -> Result<Option<ArrowType>>;

    /// All user relations in registration order.
    async fn arrows(&self) -> Result<Vec<ArrowType>>;

    /// Check every relation has a correctly typed inverse.
    async fn validate_arrows(&self) -> Result<()>;

    // ========================================================================
    // Context registry
    // ========================================================================

    async fn resolve_context(&self, labels: &[String]) -> Result<ContextRef>;

    async fn expand_context(&self, context: ContextRef) -> Result<Vec<String>>;

    async fn merge_contexts(&self, a: ContextRef, b: ContextRef) -> Result<ContextRef>;

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Insert or merge a node. The size class is derived from the text.
    async fn upsert_node(&self, text: &str, chapter: &str, seq: bool) -> Result<Upserted>;

    async fn get_node(&self, nref: NodeRef) -> Result<Option<Node>>;

    /// Node text only.
    ///
    /// Default: fetches the whole node. Override when text is cheaper.
    async fn node_text(&self, nref: NodeRef) -> Result<Option<String>> {
        Ok(self.get_node(nref).await?.map(|n| n.text))
    }

    /// Nodes whose text contains `name`, optionally restricted to a chapter.
    async fn find_nodes(&self, name: &str, chapter: &str, limit: usize) -> Result<Vec<NodeRef>>;

    async fn chapters(&self) -> Result<Vec<String>>;

    /// Remove a chapter; returns the nodes that no longer exist.
    async fn delete_chapter(&self, chapter: &str) -> Result<Vec<NodeRef>>;

    // ========================================================================
    // Links
    // ========================================================================

    /// Append one side of a link on `from`, in the bucket of the arrow's
    /// registered type. Rejects self-loops and zero weights.
    async fn append_link(
        &self,
        from: NodeRef,
        arrow: ArrowId,
        to: NodeRef,
        weight: f32,
        context: ContextRef,
    ) -> Result<LinkOutcome>;

    // ========================================================================
    // Cone / path retrieval
    // ========================================================================

    /// Up to `limit` links of one type, skipping the origin arrow and `exclude`.
    async fn neighbors(
        &self,
        node: NodeRef,
        sttype: SpacetimeType,
        exclude: &[NodeRef],
        limit: usize,
    ) -> Result<Vec<Link>>;

    /// Constrained cone of acyclic chains of at most `max_depth` hops
    /// from every node in `start`.
    async fn cone_paths(
        &self,
        start: &[NodeRef],
        max_depth: usize,
        filter: &SearchFilter,
        max_branch: usize,
    ) -> Result<Vec<Path>>;

    /// Chains following a single spacetime type.
    ///
    /// Default: a one-node cone restricted to `sttype`.
    async fn forward_paths(
        &self,
        node: NodeRef,
        sttype: SpacetimeType,
        max_depth: usize,
        max_branch: usize,
    ) -> Result<Vec<Path>> {
        let filter = SearchFilter::new().with_sttypes([sttype]);
        self.cone_paths(&[node], max_depth, &filter, max_branch).await
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    async fn node_count(&self) -> Result<u64>;

    /// Stored link halves; each accepted link counts twice.
    async fn link_count(&self) -> Result<u64>;
}
