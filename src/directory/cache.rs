//! Process-wide node text cache, owned by the engine object.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::model::NodeRef;

/// `NodeRef` → text, filled on first lookup.
///
/// Lookups and fills each take the lock briefly; a fill that loses a race
/// keeps the entry that got there first.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: Mutex<HashMap<NodeRef, Arc<str>>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, nref: NodeRef) -> Option<Arc<str>> {
        self.entries.lock().get(&nref).cloned()
    }

    /// Check-then-insert under one lock acquisition.
    pub fn get_or_insert(&self, nref: NodeRef, text: &str) -> Arc<str> {
        self.entries
            .lock()
            .entry(nref)
            .or_insert_with(|| Arc::from(text))
            .clone()
    }

    pub fn evict(&self, refs: &[NodeRef]) {
        let mut entries = self.entries.lock();
        for nref in refs {
            entries.remove(nref);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
