//! Search constraints for cone expansion and path solving.

use serde::{Deserialize, Serialize};

use super::{ArrowId, SpacetimeType};

/// Which links a cone expansion may follow.
///
/// Empty collections mean "no constraint": every arrow, every spacetime
/// type in both signs, every chapter, every context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub arrows: Vec<ArrowId>,
    pub sttypes: Vec<SpacetimeType>,
    /// Loose chapter match on the node being expanded.
    pub chapter: String,
    /// Wanted context labels.
    pub context: Vec<String>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arrows(mut self, arrows: impl IntoIterator<Item = ArrowId>) -> Self {
        self.arrows = arrows.into_iter().collect();
        self
    }

    pub fn with_sttypes(mut self, sttypes: impl IntoIterator<Item = SpacetimeType>) -> Self {
        self.sttypes = sttypes.into_iter().collect();
        self
    }

    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = chapter.into();
        self
    }

    pub fn with_context<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.context = labels.into_iter().map(Into::into).collect();
        self
    }

    /// The buckets to scan, in bucket order.
    pub fn spacetime_types(&self) -> Vec<SpacetimeType> {
        if self.sttypes.is_empty() {
            SpacetimeType::ALL.to_vec()
        } else {
            SpacetimeType::ALL
                .into_iter()
                .filter(|st| self.sttypes.contains(st))
                .collect()
        }
    }

    pub fn admits_arrow(&self, arrow: ArrowId) -> bool {
        self.arrows.is_empty() || self.arrows.contains(&arrow)
    }

    /// The same constraint seen from the far end: arrows swapped for their
    /// inverses and spacetime types negated.
    pub fn adjoint(&self, inverse: impl Fn(ArrowId) -> ArrowId) -> SearchFilter {
        let mut arrows: Vec<ArrowId> = Vec::with_capacity(self.arrows.len());
        for inv in self.arrows.iter().map(|&a| inverse(a)) {
            if !arrows.contains(&inv) {
                arrows.push(inv);
            }
        }
        let mut sttypes: Vec<SpacetimeType> = Vec::with_capacity(self.sttypes.len());
        for neg in self.sttypes.iter().map(|st| st.negate()) {
            if !sttypes.contains(&neg) {
                sttypes.push(neg);
            }
        }
        SearchFilter {
            arrows,
            sttypes,
            chapter: self.chapter.clone(),
            context: self.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_scans_all_buckets() {
        let f = SearchFilter::new();
        assert_eq!(f.spacetime_types().len(), 7);
        assert!(f.admits_arrow(ArrowId(42)));
    }

    #[test]
    fn test_adjoint_filter() {
        let f = SearchFilter::new()
            .with_arrows([ArrowId(1)])
            .with_sttypes([SpacetimeType::LeadsTo, SpacetimeType::Near])
            .with_chapter("ch1");
        let adj = f.adjoint(|a| if a == ArrowId(1) { ArrowId(2) } else { a });
        assert_eq!(adj.arrows, vec![ArrowId(2)]);
        assert_eq!(adj.sttypes, vec![SpacetimeType::ComesFrom, SpacetimeType::Near]);
        assert_eq!(adj.chapter, "ch1");
        assert_eq!(
            adj.spacetime_types(),
            vec![SpacetimeType::ComesFrom, SpacetimeType::Near]
        );
    }
}
