//! # sst-rs: Semantic Spacetime knowledge graph
//!
//! Short text fragments become nodes, connected by named relations that each
//! belong to one of seven signed spacetime types. Every link is stored on
//! both of its endpoints, so either end can be walked in either direction.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `StorageBackend` is the contract between the engine and storage
//! 2. **Clean DTOs**: `NodeRef`, `Link`, `Path` cross all boundaries
//! 3. **Mirrored links**: `connect` always writes the inverse link on the far node
//! 4. **Bounded search**: depth and branch limits are explicit, never global
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sst_rs::{Graph, SearchFilter};
//! use sst_rs::config::{ArrowName, ArrowPairDecl};
//! use sst_rs::model::RelationClass;
//!
//! # async fn example() -> sst_rs::Result<()> {
//! let graph = Graph::open_memory().await?;
//! graph.declare_arrows(&ArrowPairDecl::new(
//!     RelationClass::LeadsTo,
//!     ArrowName::new("then", "leads to next"),
//!     ArrowName::new("from", "comes after"),
//! )).await?;
//!
//! let a = graph.insert("wake up", "morning").await?;
//! let b = graph.insert("make coffee", "morning").await?;
//! graph.connect(a, "then", b, &["kitchen"], 1.0).await?;
//!
//! let solutions = graph.solve_paths(&[a], &[b], &SearchFilter::new(), 1, 4).await?;
//! for path in &solutions.paths {
//!     println!("{} hops", path.hops());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | (default) | In-memory graph for testing/embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod registry;
pub mod directory;
pub mod index;
pub mod storage;
pub mod solver;
pub mod orbit;
pub mod config;

use std::sync::Arc;

use hashbrown::HashMap;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    ArrowId, ArrowType, ContextRef, Link, Node, NodeRef, Path, SearchFilter,
    SizeClass, SpacetimeType,
};

// ============================================================================
// Re-exports: Storage, solver, config
// ============================================================================

pub use storage::{StorageBackend, Upserted};
pub use directory::Diagnostic;
pub use index::LinkOutcome;
pub use solver::{CentralityRank, PathSolutions, SolutionKind};
pub use orbit::{Orbit, Satellite};
pub use config::EngineConfig;

/// Context label list for links and filters that carry no context.
pub const NO_CONTEXT: &[&str] = &[];

use config::ArrowPairDecl;
use directory::NodeCache;
use index::validate_link;
use solver::WavefrontSolver;

// ============================================================================
// Top-level Graph handle
// ============================================================================

/// The primary entry point. A `Graph` owns a storage backend, the engine
/// configuration and the node text cache.
pub struct Graph<B: StorageBackend> {
    backend: B,
    config: EngineConfig,
    cache: NodeCache,
}

impl<B: StorageBackend> Graph<B> {
    /// Create a Graph with the given backend and default configuration.
    pub fn with_backend(backend: B) -> Self {
        Self { backend, config: EngineConfig::default(), cache: NodeCache::new() }
    }

    /// Create a Graph and register the configured arrow vocabulary.
    /// Any registry inconsistency is fatal.
    pub async fn with_config(backend: B, config: EngineConfig) -> Result<Self> {
        let graph = Self { backend, config, cache: NodeCache::new() };
        for decl in &graph.config.arrows {
            graph.declare_arrows(decl).await?;
        }
        graph.backend.validate_arrows().await?;
        Ok(graph)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Access the underlying backend (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ========================================================================
    // Vocabulary
    // ========================================================================

    /// Register a relation and its inverse, binding them to each other.
    pub async fn declare_arrows(&self, decl: &ArrowPairDecl) -> Result<(ArrowId, ArrowId)> {
        let (fwd_type, bwd_type) = decl.sttypes()?;
        let fwd = self
            .backend
            .register_arrow(fwd_type, &decl.forward.short, &decl.forward.long)
            .await?;
        let bwd = self
            .backend
            .register_arrow(bwd_type, &decl.backward.short, &decl.backward.long)
            .await?;
        self.backend.register_inverse(fwd, bwd).await?;
        Ok((fwd, bwd))
    }

    /// Resolve arrow names for use in a `SearchFilter`.
    pub async fn arrow_ids(&self, names: &[&str]) -> Result<Vec<ArrowId>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = self
                .backend
                .resolve_arrow(name)
                .await?
                .ok_or_else(|| Error::UnknownArrow(name.to_string()))?;
            ids.push(id);
        }
        Ok(ids)
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Insert text into a chapter. Warnings are only logged.
    pub async fn insert(&self, text: &str, chapter: &str) -> Result<NodeRef> {
        self.insert_with(text, chapter, false, |_| {}).await
    }

    /// Insert text, delivering any diagnostics to `on_warning`.
    pub async fn insert_with(
        &self,
        text: &str,
        chapter: &str,
        seq: bool,
        mut on_warning: impl FnMut(&Diagnostic),
    ) -> Result<NodeRef> {
        let upserted = self.backend.upsert_node(text, chapter, seq).await?;
        for diagnostic in &upserted.diagnostics {
            on_warning(diagnostic);
        }
        self.cache.get_or_insert(upserted.nref, text);
        Ok(upserted.nref)
    }

    /// Link `from` to `to` with a named relation, and `to` back to `from`
    /// with its inverse. Repeating a link merges its context.
    ///
    /// Self-loops and zero weights are rejected without touching the graph.
    pub async fn connect<S: AsRef<str>>(
        &self,
        from: NodeRef,
        arrow: &str,
        to: NodeRef,
        context: &[S],
        weight: f32,
    ) -> Result<LinkOutcome> {
        let forward = self
            .backend
            .resolve_arrow(arrow)
            .await?
            .ok_or_else(|| Error::UnknownArrow(arrow.to_string()))?;
        let backward = self
            .backend
            .resolve_inverse(forward)
            .await?
            .ok_or_else(|| Error::MissingInverse(arrow.to_string()))?;

        if let Err(e) = validate_link(from, to, weight) {
            tracing::warn!(error = %e, %from, %to, arrow, "link rejected");
            return Err(e);
        }

        let labels: Vec<String> = context.iter().map(|s| s.as_ref().to_string()).collect();
        let ctx = self.backend.resolve_context(&labels).await?;
        let outcome = self.backend.append_link(from, forward, to, weight, ctx).await?;
        self.backend.append_link(to, backward, from, weight, ctx).await?;
        Ok(outcome)
    }

    /// Gather `members` under one container node, each linked to it by
    /// `arrow`. An empty name is derived from the arrow and member refs; an
    /// empty chapter is inherited when every member shares exactly one.
    pub async fn hub_join<S: AsRef<str>>(
        &self,
        name: &str,
        chapter: &str,
        members: &[NodeRef],
        arrow: &str,
        context: &[S],
        weights: Option<&[f32]>,
    ) -> Result<NodeRef> {
        if members.is_empty() {
            return Err(Error::InvalidArgument("hub join needs at least one member".into()));
        }
        if let Some(w) = weights {
            if w.len() != members.len() {
                return Err(Error::InvalidArgument(format!(
                    "{} weights for {} members",
                    w.len(),
                    members.len()
                )));
            }
        }

        let name = match name.trim() {
            "" => {
                let mut derived = format!("hub_{arrow}_");
                derived.extend(members.iter().map(ToString::to_string));
                derived
            }
            given => given.to_string(),
        };

        let chapter = match chapter.trim() {
            "" => self.shared_chapter(members).await?.unwrap_or_default(),
            given => given.to_string(),
        };

        let hub = self.insert(&name, &chapter).await?;
        for (i, &member) in members.iter().enumerate() {
            let weight = weights.map_or(1.0, |w| w[i]);
            self.connect(member, arrow, hub, context, weight).await?;
        }
        Ok(hub)
    }

    async fn shared_chapter(&self, members: &[NodeRef]) -> Result<Option<String>> {
        let mut common: Option<Vec<String>> = None;
        for &m in members {
            let node = self
                .backend
                .get_node(m)
                .await?
                .ok_or_else(|| Error::NotFound(format!("node {m}")))?;
            common = Some(match common {
                None => node.chapters,
                Some(prev) => prev.into_iter().filter(|c| node.has_chapter(c)).collect(),
            });
        }
        Ok(match common {
            Some(mut chapters) if chapters.len() == 1 => chapters.pop(),
            _ => None,
        })
    }

    /// Remove a chapter. Returns how many nodes disappeared with it.
    pub async fn delete_chapter(&self, chapter: &str) -> Result<usize> {
        let removed = self.backend.delete_chapter(chapter).await?;
        self.cache.evict(&removed);
        Ok(removed.len())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Node text through the engine's cache.
    pub async fn node_text(&self, nref: NodeRef) -> Result<Arc<str>> {
        if let Some(text) = self.cache.get(nref) {
            return Ok(text);
        }
        let text = self
            .backend
            .node_text(nref)
            .await?
            .ok_or_else(|| Error::NotFound(format!("node {nref}")))?;
        Ok(self.cache.get_or_insert(nref, &text))
    }

    /// Nodes whose text contains `name`, optionally within a chapter.
    pub async fn find(&self, name: &str, chapter: &str, limit: usize) -> Result<Vec<NodeRef>> {
        self.backend.find_nodes(name, chapter, limit).await
    }

    async fn texts_of(&self, solutions: &[Path]) -> Result<HashMap<NodeRef, String>> {
        let mut texts = HashMap::new();
        for link in solutions.iter().flat_map(|p| p.iter()) {
            if !texts.contains_key(&link.dst) {
                let text = self.node_text(link.dst).await?;
                texts.insert(link.dst, text.to_string());
            }
        }
        Ok(texts)
    }

    // ========================================================================
    // Path solving
    // ========================================================================

    /// Connect some node of `start` to some node of `end`.
    /// See [`solver::wavefront`] for the search and its bounds.
    pub async fn solve_paths(
        &self,
        start: &[NodeRef],
        end: &[NodeRef],
        filter: &SearchFilter,
        min_depth: usize,
        max_depth: usize,
    ) -> Result<PathSolutions> {
        WavefrontSolver::new(&self.backend, &self.config.limits)
            .solve(start, end, filter, min_depth, max_depth)
            .await
    }

    /// Group interchangeable nodes across accepted solutions.
    pub fn coarsen(&self, solutions: &[Path], max_depth: usize) -> Vec<Vec<NodeRef>> {
        solver::coarsen(solutions, max_depth)
    }

    /// Supernodes rendered as comma-separated text.
    pub async fn supernodes(&self, solutions: &[Path], max_depth: usize) -> Result<Vec<String>> {
        let texts = self.texts_of(solutions).await?;
        Ok(self
            .coarsen(solutions, max_depth)
            .into_iter()
            .map(|class| {
                class
                    .iter()
                    .filter_map(|r| texts.get(r).map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect())
    }

    /// Occurrence-frequency ranking of node texts across solutions.
    pub async fn centrality(&self, solutions: &[Path]) -> Result<Vec<CentralityRank>> {
        let texts = self.texts_of(solutions).await?;
        Ok(solver::centrality(solutions, |r| {
            texts.get(&r).cloned().unwrap_or_default()
        }))
    }

    // ========================================================================
    // Orbits
    // ========================================================================

    /// Satellites of `node` within the configured orbit radius, by bucket.
    pub async fn orbit(&self, node: NodeRef, exclude_arrow: &str) -> Result<Orbit> {
        let radius = self.config.orbit_radius.max(2);
        let sweep = self
            .backend
            .cone_paths(&[node], radius - 1, &SearchFilter::new(), self.config.limits.max_branch)
            .await?;

        let mut tables = orbit::OrbitTables::default();
        for arrow in self.backend.arrows().await? {
            tables.arrows.insert(arrow.id, arrow);
        }
        for link in sweep.iter().flat_map(|p| p.iter()) {
            if !tables.texts.contains_key(&link.dst) {
                let text = self.node_text(link.dst).await?;
                tables.texts.insert(link.dst, text.to_string());
            }
            if !tables.contexts.contains_key(&link.context) {
                let labels = self.backend.expand_context(link.context).await?;
                tables.contexts.insert(link.context, labels);
            }
        }
        Ok(orbit::assemble(node, &sweep, &tables, exclude_arrow, radius))
    }
}

/// In-memory graph for testing and embedding.
impl Graph<storage::MemoryBackend> {
    pub async fn open_memory() -> Result<Self> {
        let backend = storage::MemoryBackend::new();
        Ok(Self::with_backend(backend))
    }

    pub async fn open_memory_with(config: EngineConfig) -> Result<Self> {
        Self::with_config(storage::MemoryBackend::new(), config).await
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Arrow conflict: {short:?} / {long:?} already name a different relation")]
    ArrowConflict { short: String, long: String },

    #[error("Unknown arrow: {0}")]
    UnknownArrow(String),

    #[error("Spacetime type {0} outside -3..=3")]
    SpacetimeOutOfRange(i8),

    #[error("Invalid sign {sign:?} for {class:?} relation")]
    InvalidSign { class: model::RelationClass, sign: model::Sign },

    #[error("Arrow {0:?} has no inverse")]
    MissingInverse(String),

    #[error("Inverse of {forward:?} is {backward:?}, which does not have the negated spacetime type")]
    InverseMismatch { forward: String, backward: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Self-loop on node {0}")]
    SelfLoop(NodeRef),

    #[error("Zero-weight link {from} -> {to}")]
    ZeroWeight { from: NodeRef, to: NodeRef },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Registry and configuration errors leave the engine unusable; the
    /// rest reject a single call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ArrowConflict { .. }
                | Error::UnknownArrow(_)
                | Error::SpacetimeOutOfRange(_)
                | Error::InvalidSign { .. }
                | Error::MissingInverse(_)
                | Error::InverseMismatch { .. }
                | Error::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
