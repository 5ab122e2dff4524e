//! Node directory: text → `NodeRef`, one lane per size class.
//!
//! N-gram lanes keep a hash index from text to slot. Longer text is kept in
//! ordered lanes and found by a linear scan that compares lengths before
//! bytes. Slots are never reused: a removed node leaves a hole, so refs
//! handed out earlier never point at a different node.

pub mod cache;

use hashbrown::HashMap;

use crate::model::text::{contains_folded, fold};
use crate::model::{Node, NodeRef, SizeClass};

pub use cache::NodeCache;

// ============================================================================
// Diagnostics
// ============================================================================

/// Non-fatal observations made while inserting nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The same text already exists with different capitalization.
    AlternateCapitalization { text: String, existing: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::AlternateCapitalization { text, existing } => {
                write!(f, "another capitalization exists: {text:?} vs {existing:?}")
            }
        }
    }
}

// ============================================================================
// NodeDirectory
// ============================================================================

#[derive(Debug, Default)]
pub struct NodeDirectory {
    lanes: [Vec<Option<Node>>; 6],
    /// Exact-text index for the three n-gram lanes.
    hashed: [HashMap<String, u32>; 3],
}

impl NodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert text, or return the existing node with the chapter unioned in
    /// and the sequence flag or-ed in.
    pub fn insert(
        &mut self,
        text: &str,
        chapter: &str,
        seq: bool,
        diag: &mut dyn FnMut(Diagnostic),
    ) -> NodeRef {
        let class = SizeClass::of(text);

        if let Some(nref) = self.find_exact(text) {
            if let Some(node) = self.get_mut(nref) {
                node.add_chapter(chapter);
                node.seq |= seq;
            }
            return nref;
        }

        if let Some(existing) = self.find_caseless(class, text) {
            tracing::warn!(text, existing = %existing, "another capitalization exists");
            diag(Diagnostic::AlternateCapitalization {
                text: text.to_string(),
                existing,
            });
        }

        let lane = &mut self.lanes[class.lane()];
        let nref = NodeRef::new(class, lane.len() as u32);
        lane.push(Some(Node::new(nref, text).with_chapter(chapter).with_seq(seq)));
        if class.is_hashed() {
            self.hashed[class.lane()].insert(text.to_string(), nref.index);
        }
        nref
    }

    pub fn find_exact(&self, text: &str) -> Option<NodeRef> {
        let class = SizeClass::of(text);
        if class.is_hashed() {
            return self.hashed[class.lane()]
                .get(text)
                .map(|&i| NodeRef::new(class, i));
        }
        self.lanes[class.lane()]
            .iter()
            .flatten()
            .find(|n| n.len == text.len() && n.text == text)
            .map(|n| n.nref)
    }

    fn find_caseless(&self, class: SizeClass, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        self.lanes[class.lane()]
            .iter()
            .flatten()
            .find(|n| n.text.to_lowercase() == lower)
            .map(|n| n.text.clone())
    }

    pub fn get(&self, nref: NodeRef) -> Option<&Node> {
        self.lanes[nref.class.lane()]
            .get(nref.index as usize)
            .and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, nref: NodeRef) -> Option<&mut Node> {
        self.lanes[nref.class.lane()]
            .get_mut(nref.index as usize)
            .and_then(Option::as_mut)
    }

    /// Live nodes, lane by lane in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.lanes.iter().flat_map(|lane| lane.iter().flatten())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> + '_ {
        self.lanes.iter_mut().flat_map(|lane| lane.iter_mut().flatten())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn link_count(&self) -> usize {
        self.iter().map(|n| n.links.len()).sum()
    }

    /// Nodes whose text contains `fragment`, optionally within a chapter.
    /// An exact (folded) match sorts first.
    pub fn search(&self, fragment: &str, chapter: &str, limit: usize) -> Vec<NodeRef> {
        let wanted = fold(fragment);
        let mut hits: Vec<(bool, NodeRef)> = self
            .iter()
            .filter(|n| n.in_chapter(chapter) && contains_folded(&n.text, fragment))
            .map(|n| (fold(&n.text) != wanted, n.nref))
            .collect();
        hits.sort();
        hits.into_iter().take(limit).map(|(_, nref)| nref).collect()
    }

    /// Every chapter named by at least one node, sorted.
    pub fn chapters(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .iter()
            .flat_map(|n| n.chapters.iter().cloned())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Strip a chapter from every node. Nodes left without any chapter are
    /// removed and links pointing at them are severed everywhere.
    /// Returns the refs of removed nodes.
    pub fn remove_chapter(&mut self, chapter: &str) -> Vec<NodeRef> {
        let mut removed = Vec::new();
        for lane in &mut self.lanes {
            for slot in lane.iter_mut() {
                let orphaned = match slot {
                    Some(node) => node.remove_chapter(chapter) && node.chapters.is_empty(),
                    None => false,
                };
                if orphaned {
                    if let Some(node) = slot.take() {
                        removed.push(node.nref);
                        if node.nref.class.is_hashed() {
                            self.hashed[node.nref.class.lane()].remove(&node.text);
                        }
                    }
                }
            }
        }

        if !removed.is_empty() {
            let gone: hashbrown::HashSet<NodeRef> = removed.iter().copied().collect();
            let severed: usize = self
                .iter_mut()
                .map(|n| n.links.sever(|dst| gone.contains(&dst)))
                .sum();
            tracing::info!(chapter, nodes = removed.len(), links = severed, "chapter removed");
        }
        removed
    }
}
