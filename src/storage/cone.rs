//! Constrained cone expansion over an in-memory directory.
//!
//! Chains grow depth-first from each start node. Every destination taken
//! at a level is added to the exclusion list that the remaining siblings
//! and all descendants see, so a chain never revisits a node and two
//! branches at one level never both claim the same node. The exclusion
//! list starts as the whole start set.
//!
//! A node offering more candidates than `max_branch` expands only its first
//! `max_branch` links, and those are not expanded any further.

use crate::directory::NodeDirectory;
use crate::model::{Link, NodeRef, Path, SearchFilter, SpacetimeType};
use crate::registry::ContextRegistry;

struct Cone<'a> {
    nodes: &'a NodeDirectory,
    contexts: &'a ContextRegistry,
    filter: &'a SearchFilter,
    sttypes: Vec<SpacetimeType>,
    max_branch: usize,
    out: Vec<Path>,
}

/// Chains of at most `max_depth` hops from every node in `start`.
/// Unknown start nodes contribute nothing.
pub fn constrained_paths(
    nodes: &NodeDirectory,
    contexts: &ContextRegistry,
    start: &[NodeRef],
    max_depth: usize,
    filter: &SearchFilter,
    max_branch: usize,
) -> Vec<Path> {
    let mut cone = Cone {
        nodes,
        contexts,
        filter,
        sttypes: filter.spacetime_types(),
        max_branch: max_branch.max(1),
        out: Vec::new(),
    };
    for &root in start {
        if nodes.get(root).is_none() {
            continue;
        }
        let mut path = Path::rooted(root);
        cone.descend(&mut path, max_depth, start.to_vec());
    }
    cone.out
}

/// Links leaving `node` in one bucket, origin arrow and `exclude` skipped.
pub fn neighbors(
    nodes: &NodeDirectory,
    node: NodeRef,
    sttype: SpacetimeType,
    exclude: &[NodeRef],
    limit: usize,
) -> Vec<Link> {
    nodes
        .get(node)
        .map(|n| {
            n.links
                .bucket(sttype)
                .iter()
                .filter(|l| !l.is_origin() && !exclude.contains(&l.dst))
                .take(limit)
                .copied()
                .collect()
        })
        .unwrap_or_default()
}

impl Cone<'_> {
    fn descend(&mut self, path: &mut Path, remaining: usize, mut exclude: Vec<NodeRef>) {
        let candidates = match (remaining, path.end()) {
            (0, _) | (_, None) => Vec::new(),
            (_, Some(tip)) => self.successors(tip, &exclude),
        };
        if candidates.is_empty() {
            self.out.push(path.clone());
            return;
        }

        let saturated = candidates.len() > self.max_branch;
        for link in candidates.into_iter().take(self.max_branch) {
            if exclude.contains(&link.dst) {
                continue;
            }
            exclude.push(link.dst);
            path.push(link);
            let next = if saturated { 0 } else { remaining - 1 };
            self.descend(path, next, exclude.clone());
            path.pop();
        }
    }

    fn successors(&self, tip: NodeRef, exclude: &[NodeRef]) -> Vec<Link> {
        let Some(node) = self.nodes.get(tip) else {
            return Vec::new();
        };
        if !node.in_chapter(&self.filter.chapter) {
            return Vec::new();
        }
        self.sttypes
            .iter()
            .flat_map(|&st| node.links.bucket(st).iter())
            .filter(|l| {
                !l.is_origin()
                    && !exclude.contains(&l.dst)
                    && self.filter.admits_arrow(l.arrow)
                    && self.contexts.matches(l.context, &self.filter.context)
            })
            .copied()
            .collect()
    }
}
