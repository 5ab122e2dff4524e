//! Node in the spacetime graph.

use serde::{Deserialize, Serialize};

use super::text::contains_folded;
use crate::index::LinkBuckets;

// ============================================================================
// Size classes
// ============================================================================

/// Storage lane for node text.
///
/// Short phrases (up to three words) are hashed, longer text is kept in
/// ordered lanes bucketed by byte length and scanned linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum SizeClass {
    OneGram = 1,
    TwoGram = 2,
    ThreeGram = 3,
    /// Under 128 bytes.
    Short = 4,
    /// Under 1024 bytes.
    Medium = 5,
    /// 1024 bytes or more.
    Long = 6,
}

impl SizeClass {
    pub const ALL: [SizeClass; 6] = [
        SizeClass::OneGram,
        SizeClass::TwoGram,
        SizeClass::ThreeGram,
        SizeClass::Short,
        SizeClass::Medium,
        SizeClass::Long,
    ];

    /// Classify text by space count first, then by length.
    pub fn of(text: &str) -> Self {
        match text.matches(' ').count() {
            0 => SizeClass::OneGram,
            1 => SizeClass::TwoGram,
            2 => SizeClass::ThreeGram,
            _ => match text.len() {
                0..128 => SizeClass::Short,
                128..1024 => SizeClass::Medium,
                _ => SizeClass::Long,
            },
        }
    }

    /// N-gram lanes are looked up by hash rather than scanned.
    pub fn is_hashed(self) -> bool {
        matches!(self, SizeClass::OneGram | SizeClass::TwoGram | SizeClass::ThreeGram)
    }

    /// Zero-based lane position.
    pub fn lane(self) -> usize {
        self as usize - 1
    }
}

// ============================================================================
// NodeRef
// ============================================================================

/// Stable node reference: size class plus index within that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub class: SizeClass,
    pub index: u32,
}

impl NodeRef {
    pub fn new(class: SizeClass, index: u32) -> Self {
        Self { class, index }
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.class as u8, self.index)
    }
}

// ============================================================================
// Node
// ============================================================================

/// A text node with its chapter memberships and outgoing link buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub nref: NodeRef,
    pub text: String,
    /// Byte length of `text`.
    pub len: usize,
    /// Chapters this node was declared in, in first-seen order.
    pub chapters: Vec<String>,
    /// Starts a sequence of items in its chapter.
    pub seq: bool,
    pub links: LinkBuckets,
}

impl Node {
    pub fn new(nref: NodeRef, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            nref,
            len: text.len(),
            text,
            chapters: Vec::new(),
            seq: false,
            links: LinkBuckets::default(),
        }
    }

    pub fn with_chapter(mut self, chapter: &str) -> Self {
        self.add_chapter(chapter);
        self
    }

    pub fn with_seq(mut self, seq: bool) -> Self {
        self.seq = seq;
        self
    }

    /// Union a chapter into the membership set. Returns false if already present.
    pub fn add_chapter(&mut self, chapter: &str) -> bool {
        let chapter = chapter.trim();
        if chapter.is_empty() || self.chapters.iter().any(|c| c == chapter) {
            return false;
        }
        self.chapters.push(chapter.to_string());
        true
    }

    /// Remove an exact chapter. Returns true if it was present.
    pub fn remove_chapter(&mut self, chapter: &str) -> bool {
        let before = self.chapters.len();
        self.chapters.retain(|c| c != chapter);
        self.chapters.len() != before
    }

    pub fn has_chapter(&self, chapter: &str) -> bool {
        self.chapters.iter().any(|c| c == chapter)
    }

    /// Loose chapter filter: case/accent-insensitive substring of any chapter.
    /// An empty filter admits everything.
    pub fn in_chapter(&self, filter: &str) -> bool {
        filter.is_empty() || self.chapters.iter().any(|c| contains_folded(c, filter))
    }

    /// Chapters joined with commas, as they were declared.
    pub fn chapter_list(&self) -> String {
        self.chapters.join(",")
    }
}
