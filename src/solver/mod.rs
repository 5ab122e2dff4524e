//! # Path solving
//!
//! - [`wavefront`]: bidirectional cone expansion from a start set and an
//!   end set, spliced where the two frontiers meet.
//! - [`symmetry`]: coarse-graining of accepted solutions into supernodes,
//!   and occurrence-frequency centrality.

pub mod symmetry;
pub mod wavefront;

use hashbrown::HashMap;

use crate::model::ArrowId;
use crate::storage::StorageBackend;
use crate::Result;

pub use symmetry::{centrality, coarsen, CentralityRank, Together};
pub use wavefront::{wavefront_overlap, PathSolutions, SolutionKind, WavefrontSolver};

/// Snapshot of the inverse map, taken once per solve so path algebra can
/// run synchronously.
#[derive(Debug, Clone, Default)]
pub struct InverseTable {
    map: HashMap<ArrowId, ArrowId>,
}

impl InverseTable {
    pub async fn load<B: StorageBackend>(backend: &B) -> Result<Self> {
        let mut map = HashMap::new();
        map.insert(ArrowId::ORIGIN, ArrowId::ORIGIN);
        for arrow in backend.arrows().await? {
            if let Some(inv) = backend.resolve_inverse(arrow.id).await? {
                map.insert(arrow.id, inv);
            }
        }
        Ok(Self { map })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (ArrowId, ArrowId)>) -> Self {
        let mut map = HashMap::new();
        map.insert(ArrowId::ORIGIN, ArrowId::ORIGIN);
        for (a, b) in pairs {
            map.insert(a, b);
            map.insert(b, a);
        }
        Self { map }
    }

    /// Registered inverse; an unbound arrow maps to itself.
    pub fn inverse(&self, arrow: ArrowId) -> ArrowId {
        self.map.get(&arrow).copied().unwrap_or(arrow)
    }
}
