//! Name registries: relation (arrow) types and context label sets.

pub mod arrows;
pub mod context;

pub use arrows::ArrowRegistry;
pub use context::{ContextRegistry, SEQUENCE_MARKER};
