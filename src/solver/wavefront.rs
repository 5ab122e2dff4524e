//! Wavefront bidirectional path solver.
//!
//! Each turn expands a cone of radius `ld` from the start set and a cone of
//! radius `rd` from the end set, the latter under the adjoint filter so it
//! walks the same edges backwards. Chains whose terminal nodes coincide are
//! spliced: left chain, then the adjoint of the right chain. A cone of
//! radius `r` holds chains of at most `r - 1` hops, so the first turn only
//! compares the sets themselves.
//!
//! Acyclic splices end the search. Otherwise looped splices end it. Otherwise
//! one radius grows and the turn repeats, until both radii exceed
//! `max_depth` or a cone outgrows the frontier ceiling.

use hashbrown::{HashMap, HashSet};

use super::InverseTable;
use crate::config::{GrowthPolicy, SearchLimits};
use crate::model::{NodeRef, Path, SearchFilter};
use crate::storage::StorageBackend;
use crate::Result;

/// Classification of returned solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionKind {
    /// No node is visited twice.
    Dag,
    /// Every solution revisits some node.
    Loop,
}

/// Outcome of one `solve` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSolutions {
    /// Spliced chains, shortest first, ties in discovery order.
    pub paths: Vec<Path>,
    /// `None` when nothing connected the two sets.
    pub kind: Option<SolutionKind>,
    pub left_radius: usize,
    pub right_radius: usize,
    /// Turns taken, including the successful one.
    pub turns: usize,
}

impl PathSolutions {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_dag(&self) -> bool {
        self.kind == Some(SolutionKind::Dag)
    }
}

/// All `(left, right)` index pairs whose chains end on the same node,
/// ordered by left index then right index.
pub fn wavefront_overlap(left: &[Path], right: &[Path]) -> Vec<(usize, usize)> {
    let mut fronts: HashMap<NodeRef, Vec<usize>> = HashMap::new();
    for (j, path) in right.iter().enumerate() {
        if let Some(end) = path.end() {
            fronts.entry(end).or_default().push(j);
        }
    }
    left.iter()
        .enumerate()
        .filter_map(|(i, path)| Some((i, fronts.get(&path.end()?)?)))
        .flat_map(|(i, js)| js.iter().map(move |&j| (i, j)))
        .collect()
}

/// Bidirectional solver over a storage backend.
pub struct WavefrontSolver<'a, B: StorageBackend> {
    backend: &'a B,
    limits: &'a SearchLimits,
}

impl<'a, B: StorageBackend> WavefrontSolver<'a, B> {
    pub fn new(backend: &'a B, limits: &'a SearchLimits) -> Self {
        Self { backend, limits }
    }

    /// Connect some node of `start` to some node of `end`.
    ///
    /// Splices shorter than `min_depth` hops are discarded; with
    /// `min_depth == 0` nodes shared by both sets come back as zero-hop
    /// solutions. Exhaustion is not an error: it yields an empty result.
    pub async fn solve(
        &self,
        start: &[NodeRef],
        end: &[NodeRef],
        filter: &SearchFilter,
        min_depth: usize,
        max_depth: usize,
    ) -> Result<PathSolutions> {
        if start.is_empty() || end.is_empty() {
            return Ok(PathSolutions::default());
        }

        let inverses = InverseTable::load(self.backend).await?;
        let adjoint_filter = filter.adjoint(|a| inverses.inverse(a));
        let max_branch = self.limits.max_branch;

        let (mut ld, mut rd) = (1usize, 1usize);
        let mut turn = 0usize;

        while ld <= max_depth || rd <= max_depth {
            let (left, right) = tokio::join!(
                self.backend.cone_paths(start, ld - 1, filter, max_branch),
                self.backend.cone_paths(end, rd - 1, &adjoint_filter, max_branch),
            );
            let (left, right) = (left?, right?);
            turn += 1;

            tracing::debug!(
                turn,
                left_radius = ld,
                right_radius = rd,
                left = left.len(),
                right = right.len(),
                "wavefront turn"
            );

            let (dag, loops) = splice_overlaps(&left, &right, &inverses, min_depth);
            let found = if !dag.is_empty() {
                Some((SolutionKind::Dag, dag))
            } else if !loops.is_empty() {
                Some((SolutionKind::Loop, loops))
            } else {
                None
            };
            if let Some((kind, paths)) = found {
                return Ok(PathSolutions {
                    paths,
                    kind: Some(kind),
                    left_radius: ld,
                    right_radius: rd,
                    turns: turn,
                });
            }

            if left.len() > self.limits.max_frontier || right.len() > self.limits.max_frontier {
                tracing::warn!(
                    left = left.len(),
                    right = right.len(),
                    ceiling = self.limits.max_frontier,
                    "wavefront ceiling reached"
                );
                break;
            }

            let grow_left = match self.limits.growth {
                GrowthPolicy::Alternate => (turn - 1) % 2 == 0,
                GrowthPolicy::SmallerFrontier => frontier_size(&left) <= frontier_size(&right),
            };
            if (grow_left && ld <= max_depth) || rd > max_depth {
                ld += 1;
            } else {
                rd += 1;
            }
        }

        Ok(PathSolutions {
            left_radius: ld,
            right_radius: rd,
            turns: turn,
            ..PathSolutions::default()
        })
    }
}

fn frontier_size(paths: &[Path]) -> usize {
    paths.iter().filter_map(Path::end).collect::<HashSet<_>>().len()
}

/// Splice every overlapping pair and split the results into acyclic and
/// looped chains. Each distinct chain is kept once.
fn splice_overlaps(
    left: &[Path],
    right: &[Path],
    inverses: &InverseTable,
    min_depth: usize,
) -> (Vec<Path>, Vec<Path>) {
    let mut seen = HashSet::new();
    let mut dag = Vec::new();
    let mut loops = Vec::new();

    for (i, j) in wavefront_overlap(left, right) {
        let joined = left[i].splice(&right[j].adjoint(|a| inverses.inverse(a)));
        if joined.hops() < min_depth || !seen.insert(joined.key()) {
            continue;
        }
        if joined.is_dag() {
            dag.push(joined);
        } else {
            loops.push(joined);
        }
    }

    dag.sort_by_key(Path::hops);
    loops.sort_by_key(Path::hops);
    (dag, loops)
}
