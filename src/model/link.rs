//! Links and context references.

use serde::{Deserialize, Serialize};

use super::{ArrowId, NodeRef};

/// Reference into the context registry. `ContextRef::ANY` carries no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ContextRef(pub u32);

impl ContextRef {
    pub const ANY: ContextRef = ContextRef(0);

    pub fn is_any(self) -> bool {
        self == Self::ANY
    }
}

/// One directed, weighted, context-qualified hop stored on its origin node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub arrow: ArrowId,
    pub weight: f32,
    pub context: ContextRef,
    pub dst: NodeRef,
}

impl Link {
    pub fn new(arrow: ArrowId, dst: NodeRef) -> Self {
        Self { arrow, weight: 1.0, context: ContextRef::ANY, dst }
    }

    /// The synthetic link that heads a chain rooted at `node`.
    pub fn origin(node: NodeRef) -> Self {
        Self::new(ArrowId::ORIGIN, node)
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_context(mut self, context: ContextRef) -> Self {
        self.context = context;
        self
    }

    pub fn is_origin(&self) -> bool {
        self.arrow.is_origin()
    }
}
