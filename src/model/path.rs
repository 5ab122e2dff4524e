//! Path: a chain of links headed by a synthetic origin link.
//!
//! `[origin(A), (then, B), (then, C)]` reads A -then-> B -then-> C. The
//! origin link carries arrow 0, so a chain that never left its start node
//! is still a one-element path.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{ArrowId, Link, NodeRef};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    links: Vec<Link>,
}

impl Path {
    /// A zero-hop path sitting at `node`.
    pub fn rooted(node: NodeRef) -> Self {
        Self { links: vec![Link::origin(node)] }
    }

    pub fn from_links(links: Vec<Link>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn into_links(self) -> Vec<Link> {
        self.links
    }

    /// Number of real hops, excluding the origin link.
    pub fn hops(&self) -> usize {
        self.links.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<NodeRef> {
        self.links.first().map(|l| l.dst)
    }

    /// The wavefront position of this chain.
    pub fn end(&self) -> Option<NodeRef> {
        self.links.last().map(|l| l.dst)
    }

    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn pop(&mut self) -> Option<Link> {
        self.links.pop()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.links.iter().map(|l| l.dst)
    }

    /// True when no node is visited twice.
    pub fn is_dag(&self) -> bool {
        let mut seen = hashbrown::HashSet::with_capacity(self.links.len());
        self.links.iter().all(|l| seen.insert(l.dst))
    }

    /// Reverse the chain, rewriting each arrow to the inverse of the arrow
    /// that originally led into the node it now leaves from.
    ///
    /// `inverse` must map `ArrowId::ORIGIN` to itself; under that condition
    /// `p.adjoint(f).adjoint(f) == p` for any chain headed by an origin link.
    pub fn adjoint(&self, inverse: impl Fn(ArrowId) -> ArrowId) -> Path {
        let mut prev = inverse(ArrowId::ORIGIN);
        let links = self
            .links
            .iter()
            .rev()
            .map(|link| {
                let hop = Link { arrow: inverse(prev), ..*link };
                prev = link.arrow;
                hop
            })
            .collect();
        Path { links }
    }

    /// Join a left chain to the adjoint of a right chain that meets it.
    /// The adjoint's first link duplicates the meeting node and is dropped.
    pub fn splice(&self, right_adjoint: &Path) -> Path {
        let mut links = self.links.clone();
        links.extend(right_adjoint.links.iter().skip(1).copied());
        Path { links }
    }

    /// Identity used to report each distinct chain once.
    pub fn key(&self) -> Vec<(ArrowId, NodeRef)> {
        self.links.iter().map(|l| (l.arrow, l.dst)).collect()
    }
}

impl Deref for Path {
    type Target = [Link];

    fn deref(&self) -> &[Link] {
        &self.links
    }
}

impl From<Vec<Link>> for Path {
    fn from(links: Vec<Link>) -> Self {
        Self::from_links(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SizeClass;

    fn n(i: u32) -> NodeRef {
        NodeRef::new(SizeClass::OneGram, i)
    }

    /// then(1) <-> from(2)
    fn inverse(a: ArrowId) -> ArrowId {
        match a.0 {
            1 => ArrowId(2),
            2 => ArrowId(1),
            other => ArrowId(other),
        }
    }

    #[test]
    fn test_rooted_path() {
        let p = Path::rooted(n(4));
        assert_eq!(p.hops(), 0);
        assert_eq!(p.start(), Some(n(4)));
        assert_eq!(p.end(), Some(n(4)));
        assert!(p.is_dag());
    }

    #[test]
    fn test_adjoint_reverses_and_inverts() {
        let p = Path::from_links(vec![
            Link::origin(n(0)),
            Link::new(ArrowId(1), n(1)),
            Link::new(ArrowId(1), n(2)),
        ]);
        let adj = p.adjoint(inverse);
        assert_eq!(
            adj.key(),
            vec![(ArrowId(0), n(2)), (ArrowId(2), n(1)), (ArrowId(2), n(0))]
        );
        assert_eq!(adj.adjoint(inverse), p);
    }

    #[test]
    fn test_splice_drops_meeting_duplicate() {
        let left = Path::from_links(vec![Link::origin(n(0)), Link::new(ArrowId(1), n(1))]);
        let right = Path::from_links(vec![Link::origin(n(2)), Link::new(ArrowId(2), n(1))]);
        let joined = left.splice(&right.adjoint(inverse));
        assert_eq!(
            joined.key(),
            vec![(ArrowId(0), n(0)), (ArrowId(1), n(1)), (ArrowId(1), n(2))]
        );
        assert_eq!(joined.hops(), 2);
    }

    #[test]
    fn test_is_dag_detects_revisit() {
        let p = Path::from_links(vec![
            Link::origin(n(0)),
            Link::new(ArrowId(1), n(1)),
            Link::new(ArrowId(1), n(0)),
        ]);
        assert!(!p.is_dag());
    }
}
