//! Node orbits: the neighbourhood of one node, sorted by spacetime type.
//!
//! An orbit is assembled from a sweep of the any-direction cone around the
//! node. Each sweep chain whose first hop has type `t` contributes that
//! first satellite to bucket `t`, then keeps walking outward along the chain
//! up to the probe radius. A hop that reverses the previous hop's type is
//! skipped. A hop along the excluded arrow ends the walk.

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{ArrowId, ArrowType, ContextRef, NodeRef, Path, SpacetimeType};

/// One node seen from the orbit centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    /// Hops from the centre along the sweep chain.
    pub radius: usize,
    /// Long name of the arrow that reached this satellite.
    pub arrow: String,
    pub sttype: SpacetimeType,
    pub dst: NodeRef,
    pub text: String,
    pub context: Vec<String>,
}

/// Satellites of a node, one list per spacetime bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub center: Option<NodeRef>,
    buckets: [Vec<Satellite>; 7],
}

impl Orbit {
    /// Satellites first reached by a hop of type `sttype`.
    pub fn bucket(&self, sttype: SpacetimeType) -> &[Satellite] {
        &self.buckets[sttype.bucket()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpacetimeType, &Satellite)> + '_ {
        SpacetimeType::ALL
            .into_iter()
            .flat_map(move |st| self.bucket(st).iter().map(move |s| (st, s)))
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lookup tables prefetched from the backend so assembly runs without I/O.
#[derive(Debug, Clone, Default)]
pub struct OrbitTables {
    pub texts: HashMap<NodeRef, String>,
    pub arrows: HashMap<ArrowId, ArrowType>,
    pub contexts: HashMap<ContextRef, Vec<String>>,
}

impl OrbitTables {
    fn text(&self, nref: NodeRef) -> String {
        self.texts.get(&nref).cloned().unwrap_or_default()
    }

    fn context(&self, ctx: ContextRef) -> Vec<String> {
        self.contexts.get(&ctx).cloned().unwrap_or_default()
    }
}

/// Build the orbit of `center` from its sweep. Buckets are assembled in
/// parallel; `exclude_arrow` matches either arrow name, empty excludes none.
pub fn assemble(
    center: NodeRef,
    sweep: &[Path],
    tables: &OrbitTables,
    exclude_arrow: &str,
    probe_radius: usize,
) -> Orbit {
    let assembled: Vec<Vec<Satellite>> = SpacetimeType::ALL
        .par_iter()
        .map(|&st| assemble_bucket(st, sweep, tables, exclude_arrow, probe_radius))
        .collect();

    let mut orbit = Orbit { center: Some(center), ..Orbit::default() };
    for (slot, satellites) in orbit.buckets.iter_mut().zip(assembled) {
        *slot = satellites;
    }
    orbit
}

fn assemble_bucket(
    sttype: SpacetimeType,
    sweep: &[Path],
    tables: &OrbitTables,
    exclude_arrow: &str,
    probe_radius: usize,
) -> Vec<Satellite> {
    let excluded = |a: &ArrowType| !exclude_arrow.is_empty() && a.named(exclude_arrow);
    let mut seen: HashSet<(NodeRef, ArrowId)> = HashSet::new();
    let mut out = Vec::new();

    for path in sweep.iter().filter(|p| p.len() > 1) {
        let first = path[1];
        let Some(arrow) = tables.arrows.get(&first.arrow) else {
            continue;
        };
        if arrow.sttype != sttype || excluded(arrow) {
            continue;
        }
        if seen.insert((first.dst, first.arrow)) {
            out.push(Satellite {
                radius: 1,
                arrow: arrow.long.clone(),
                sttype: arrow.sttype,
                dst: first.dst,
                text: tables.text(first.dst),
                context: tables.context(first.context),
            });
        }

        let mut prev = arrow.sttype;
        for depth in 2..probe_radius.min(path.len()) {
            let hop = path[depth];
            let Some(next) = tables.arrows.get(&hop.arrow) else {
                break;
            };
            if excluded(next) {
                break;
            }
            if next.sttype == prev.negate() {
                continue;
            }
            prev = next.sttype;
            if seen.insert((hop.dst, hop.arrow)) {
                out.push(Satellite {
                    radius: depth,
                    arrow: next.long.clone(),
                    sttype: next.sttype,
                    dst: hop.dst,
                    text: tables.text(hop.dst),
                    context: tables.context(hop.context),
                });
            }
        }
    }
    out
}
