//! Link index: the seven signed buckets carried by every node.
//!
//! A bucket holds at most one link per `(arrow, dst)` pair. Re-adding the
//! same pair merges contexts instead of duplicating the link.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::{ContextRef, Link, NodeRef, SpacetimeType};
use crate::registry::ContextRegistry;
use crate::{Error, Result};

/// Most nodes carry only a handful of links per type.
pub type Bucket = SmallVec<[Link; 4]>;

/// What `LinkBuckets::append` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Appended,
    /// The pair already existed; its context is now `context`.
    Merged { context: ContextRef },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkBuckets {
    buckets: [Bucket; 7],
}

impl LinkBuckets {
    pub fn bucket(&self, st: SpacetimeType) -> &[Link] {
        &self.buckets[st.bucket()]
    }

    /// Insert or merge a link into the bucket for `st`.
    pub fn append(
        &mut self,
        st: SpacetimeType,
        link: Link,
        contexts: &mut ContextRegistry,
    ) -> LinkOutcome {
        let bucket = &mut self.buckets[st.bucket()];
        match bucket
            .iter_mut()
            .find(|l| l.arrow == link.arrow && l.dst == link.dst)
        {
            Some(existing) => {
                existing.context = contexts.merge(existing.context, link.context);
                LinkOutcome::Merged { context: existing.context }
            }
            None => {
                bucket.push(link);
                LinkOutcome::Appended
            }
        }
    }

    /// All links with their bucket type, in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (SpacetimeType, &Link)> + '_ {
        SpacetimeType::ALL
            .into_iter()
            .flat_map(move |st| self.buckets[st.bucket()].iter().map(move |l| (st, l)))
    }

    /// Drop every link pointing at a node for which `gone` is true.
    /// Returns the number of links removed.
    pub fn sever(&mut self, gone: impl Fn(NodeRef) -> bool) -> usize {
        let mut removed = 0;
        for bucket in &mut self.buckets {
            let before = bucket.len();
            bucket.retain(|l| !gone(l.dst));
            removed += before - bucket.len();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.is_empty())
    }
}

/// Reject links that would loop on their origin or carry no weight.
pub fn validate_link(from: NodeRef, to: NodeRef, weight: f32) -> Result<()> {
    if from == to {
        return Err(Error::SelfLoop(from));
    }
    if weight == 0.0 {
        return Err(Error::ZeroWeight { from, to });
    }
    Ok(())
}
