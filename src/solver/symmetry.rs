//! Symmetry coarse-graining of accepted solutions.
//!
//! Two chains that pass through the same predecessor and the same successor
//! around some depth make their nodes at that depth interchangeable. Such
//! nodes are grouped into supernodes. Every node on every chain lands in
//! some class, alone if it has no partner.

use hashbrown::HashMap;

use crate::model::{NodeRef, Path};

// ============================================================================
// Together
// ============================================================================

/// Rank-compressed union-find over node refs that reports classes in the
/// order their first member was added.
#[derive(Debug, Clone, Default)]
pub struct Together {
    index: HashMap<NodeRef, usize>,
    members: Vec<NodeRef>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl Together {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `node` in a class of its own unless it already has one.
    pub fn add(&mut self, node: NodeRef) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.members.len();
        self.index.insert(node, i);
        self.members.push(node);
        self.parent.push(i);
        self.rank.push(0);
        i
    }

    /// Merge the classes of `a` and `b`, adding either if unseen.
    pub fn join(&mut self, a: NodeRef, b: NodeRef) {
        let (ia, ib) = (self.add(a), self.add(b));
        let (ra, rb) = (self.find(ia), self.find(ib));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    pub fn same_class(&mut self, a: NodeRef, b: NodeRef) -> bool {
        match (self.index.get(&a).copied(), self.index.get(&b).copied()) {
            (Some(ia), Some(ib)) => self.find(ia) == self.find(ib),
            _ => false,
        }
    }

    /// Classes ordered by first appearance; members in insertion order.
    pub fn classes(&mut self) -> Vec<Vec<NodeRef>> {
        let mut slot: HashMap<usize, usize> = HashMap::new();
        let mut out: Vec<Vec<NodeRef>> = Vec::new();
        for i in 0..self.members.len() {
            let root = self.find(i);
            let k = *slot.entry(root).or_insert_with(|| {
                out.push(Vec::new());
                out.len() - 1
            });
            out[k].push(self.members[i]);
        }
        out
    }
}

// ============================================================================
// Coarsening
// ============================================================================

/// Group interchangeable nodes across `solutions`.
///
/// Depths are scanned up to `2 * max_depth + 1` links, the longest chain a
/// splice of two radius-`max_depth` cones can produce.
pub fn coarsen(solutions: &[Path], max_depth: usize) -> Vec<Vec<NodeRef>> {
    let mut together = Together::new();
    let horizon = solutions
        .iter()
        .map(|p| p.len())
        .max()
        .unwrap_or(0)
        .min(2 * max_depth + 1);

    for depth in 0..horizon {
        for (i, pi) in solutions.iter().enumerate() {
            if depth >= pi.len() {
                continue;
            }
            together.add(pi[depth].dst);

            if depth == 0 || depth + 1 >= pi.len() {
                continue;
            }
            for pj in &solutions[i + 1..] {
                if depth + 1 >= pj.len() {
                    continue;
                }
                if pi[depth - 1].dst == pj[depth - 1].dst && pi[depth + 1].dst == pj[depth + 1].dst {
                    together.join(pi[depth].dst, pj[depth].dst);
                }
            }
        }
    }
    together.classes()
}

// ============================================================================
// Centrality
// ============================================================================

/// Texts sharing one occurrence score.
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityRank {
    /// Occurrences divided by the number of chains.
    pub score: f32,
    /// Sorted alphabetically.
    pub labels: Vec<String>,
}

impl std::fmt::Display for CentralityRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} : {}", self.score, self.labels.join(", "))
    }
}

/// Rank node texts by how often they occur across all chains, highest first.
pub fn centrality(solutions: &[Path], text_of: impl Fn(NodeRef) -> String) -> Vec<CentralityRank> {
    if solutions.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for link in solutions.iter().flat_map(|p| p.iter()) {
        *counts.entry(text_of(link.dst)).or_default() += 1;
    }

    let mut by_count: HashMap<usize, Vec<String>> = HashMap::new();
    for (text, count) in counts {
        by_count.entry(count).or_default().push(text);
    }

    let mut ranked: Vec<(usize, Vec<String>)> = by_count.into_iter().collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let total = solutions.len() as f32;
    ranked
        .into_iter()
        .map(|(count, mut labels)| {
            labels.sort();
            CentralityRank { score: count as f32 / total, labels }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArrowId, Link, SizeClass};
    use pretty_assertions::assert_eq;

    fn n(i: u32) -> NodeRef {
        NodeRef::new(SizeClass::OneGram, i)
    }

    fn chain(nodes: &[u32]) -> Path {
        let mut p = Path::rooted(n(nodes[0]));
        for &i in &nodes[1..] {
            p.push(Link::new(ArrowId(1), n(i)));
        }
        p
    }

    #[test]
    fn test_together_merges_and_orders() {
        let mut t = Together::new();
        t.add(n(0));
        t.join(n(1), n(2));
        t.join(n(3), n(2));
        t.add(n(4));
        assert!(t.same_class(n(1), n(3)));
        assert!(!t.same_class(n(0), n(1)));
        assert_eq!(t.classes(), vec![vec![n(0)], vec![n(1), n(2), n(3)], vec![n(4)]]);
    }

    #[test]
    fn test_single_chain_is_all_singletons() {
        let classes = coarsen(&[chain(&[0, 1, 2])], 4);
        assert_eq!(classes, vec![vec![n(0)], vec![n(1)], vec![n(2)]]);
    }

    #[test]
    fn test_diamond_merges_middle() {
        let classes = coarsen(&[chain(&[0, 1, 3]), chain(&[0, 2, 3])], 4);
        assert_eq!(classes, vec![vec![n(0)], vec![n(1), n(2)], vec![n(3)]]);
    }

    #[test]
    fn test_different_successors_stay_apart() {
        let classes = coarsen(&[chain(&[0, 1, 3]), chain(&[0, 2, 4])], 4);
        assert_eq!(classes.len(), 5);
    }

    #[test]
    fn test_centrality_ranking() {
        let sols = [chain(&[0, 1, 3]), chain(&[0, 2, 3])];
        let ranks = centrality(&sols, |r| format!("n{}", r.index));
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[0].labels, vec!["n0", "n3"]);
        assert_eq!(ranks[0].score, 1.0);
        assert_eq!(ranks[1].labels, vec!["n1", "n2"]);
        assert_eq!(ranks[1].to_string(), "0.50 : n1, n2");
    }

    #[test]
    fn test_centrality_empty() {
        assert!(centrality(&[], |_| String::new()).is_empty());
    }
}
