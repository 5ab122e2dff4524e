//! # Semantic Spacetime Model
//!
//! Clean DTOs for the spacetime graph: node references, nodes with their
//! seven signed link buckets, relation (arrow) types, context references,
//! link chains and search filters.
//!
//! Design rule: this module is pure data. No locks, no registries, no async.
//! Anything that needs to look a name up lives in `registry` or `directory`.

pub mod node;
pub mod arrow;
pub mod link;
pub mod path;
pub mod filter;
pub mod text;

pub use node::{Node, NodeRef, SizeClass};
pub use arrow::{ArrowId, ArrowType, RelationClass, Sign, SpacetimeType};
pub use link::{ContextRef, Link};
pub use path::Path;
pub use filter::SearchFilter;
