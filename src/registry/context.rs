//! Context registry.
//!
//! A context is a sorted, deduplicated label set. Equal sets share one
//! `ContextRef`; `ContextRef::ANY` is the empty set and constrains nothing.

use hashbrown::HashMap;

use crate::model::ContextRef;
use crate::model::text::fold;

/// Ingestion marker for sequence mode. Never stored as a label.
pub const SEQUENCE_MARKER: &str = "_sequence_";

#[derive(Debug, Clone)]
pub struct ContextRegistry {
    sets: Vec<Vec<String>>,
    index: HashMap<String, ContextRef>,
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextRegistry {
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), ContextRef::ANY);
        Self { sets: vec![Vec::new()], index }
    }

    /// Split on commas, trim, drop empties and the sequence marker, dedupe, sort.
    pub fn normalize<I, S>(labels: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = labels
            .into_iter()
            .flat_map(|s| {
                s.as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && *l != SEQUENCE_MARKER)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Look up or create the context for a label set.
    pub fn resolve<I, S>(&mut self, labels: I) -> ContextRef
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = Self::normalize(labels);
        let key = set.join(",");
        if let Some(&ctx) = self.index.get(&key) {
            return ctx;
        }
        let ctx = ContextRef(self.sets.len() as u32);
        self.sets.push(set);
        self.index.insert(key, ctx);
        ctx
    }

    /// Context of the union of two label sets.
    pub fn merge(&mut self, a: ContextRef, b: ContextRef) -> ContextRef {
        if a == b {
            return a;
        }
        let union: Vec<String> = self
            .labels(a)
            .iter()
            .chain(self.labels(b))
            .cloned()
            .collect();
        self.resolve(union)
    }

    /// Expand a reference back to its labels. Unknown refs expand to nothing.
    pub fn labels(&self, ctx: ContextRef) -> &[String] {
        self.sets.get(ctx.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn describe(&self, ctx: ContextRef) -> String {
        self.labels(ctx).join(",")
    }

    /// Number of distinct contexts, including the empty one.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.len() <= 1
    }

    /// Does the stored context satisfy a wanted label list?
    ///
    /// An empty wish list, a wish for `any`, and the empty context all match.
    /// A stored label containing dots (`a.b`) matches only when every part
    /// equals some wanted label. Other stored labels match when a wanted
    /// label occurs inside them. Case and accents are ignored.
    pub fn matches<S: AsRef<str>>(&self, ctx: ContextRef, wanted: &[S]) -> bool {
        let wanted: Vec<String> = wanted
            .iter()
            .map(|w| fold(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();
        if wanted.is_empty() || ctx.is_any() || wanted.iter().any(|w| w == "any") {
            return true;
        }

        for label in self.labels(ctx).iter().map(|l| fold(l)) {
            if label.contains('.') {
                if label.split('.').all(|part| wanted.iter().any(|w| w == part)) {
                    return true;
                }
            } else if wanted.iter().any(|w| label.contains(w.as_str())) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            ContextRegistry::normalize(["night, kitchen", " morning ,kitchen", SEQUENCE_MARKER]),
            vec!["kitchen", "morning", "night"]
        );
        assert!(ContextRegistry::normalize(["", " , "]).is_empty());
    }

    #[test]
    fn test_equal_sets_share_ref() {
        let mut reg = ContextRegistry::new();
        let a = reg.resolve(["b,a"]);
        let b = reg.resolve(["a", "b", "a"]);
        assert_eq!(a, b);
        assert_ne!(a, ContextRef::ANY);
        assert_eq!(reg.resolve(["_sequence_"]), ContextRef::ANY);
        assert_eq!(reg.resolve(Vec::<String>::new()), ContextRef::ANY);
    }

    #[test]
    fn test_merge_is_union() {
        let mut reg = ContextRegistry::new();
        let a = reg.resolve(["x"]);
        let b = reg.resolve(["y, x"]);
        let m = reg.merge(a, b);
        assert_eq!(m, b);
        assert_eq!(reg.merge(ContextRef::ANY, a), a);
        assert_eq!(reg.describe(m), "x,y");
    }

    #[test]
    fn test_matching_rules() {
        let mut reg = ContextRegistry::new();
        let kitchen = reg.resolve(["Kitchen Table"]);
        let compound = reg.resolve(["morning.coffee"]);

        assert!(reg.matches::<&str>(kitchen, &[]));
        assert!(reg.matches(ContextRef::ANY, &["anything"]));
        assert!(reg.matches(kitchen, &["kitchen"]));
        assert!(reg.matches(kitchen, &["any"]));
        assert!(!reg.matches(kitchen, &["garden"]));

        assert!(reg.matches(compound, &["morning", "coffee"]));
        assert!(!reg.matches(compound, &["morning"]));
    }

    #[test]
    fn test_matching_ignores_accents() {
        let mut reg = ContextRegistry::new();
        let cafe = reg.resolve(["café"]);
        assert!(reg.matches(cafe, &["CAFE"]));
    }
}
