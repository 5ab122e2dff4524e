//! Arrow registry.
//!
//! Every relation is registered once under a short and a long name and
//! bound to exactly one inverse. Arrow 0 is pre-registered as the origin
//! arrow and is its own inverse.

use hashbrown::HashMap;

use crate::model::{ArrowId, ArrowType, RelationClass, Sign, SpacetimeType};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct ArrowRegistry {
    arrows: Vec<ArrowType>,
    by_name: HashMap<String, ArrowId>,
    inverses: HashMap<ArrowId, ArrowId>,
}

impl Default for ArrowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrowRegistry {
    pub fn new() -> Self {
        let origin = ArrowType {
            id: ArrowId::ORIGIN,
            short: String::new(),
            long: String::new(),
            sttype: SpacetimeType::Near,
        };
        let mut inverses = HashMap::new();
        inverses.insert(ArrowId::ORIGIN, ArrowId::ORIGIN);
        Self { arrows: vec![origin], by_name: HashMap::new(), inverses }
    }

    /// Register a relation, or return its id if both names already name it.
    ///
    /// Fails with `Error::ArrowConflict` when either name is taken by a
    /// different relation.
    pub fn register(&mut self, sttype: SpacetimeType, short: &str, long: &str) -> Result<ArrowId> {
        let (short, long) = (short.trim(), long.trim());
        if short.is_empty() || long.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "arrow names must be non-empty (short {short:?}, long {long:?})"
            )));
        }

        match (self.by_name.get(short), self.by_name.get(long)) {
            (Some(&a), Some(&b)) if a == b && self.arrows[a.0 as usize].sttype == sttype => {
                return Ok(a);
            }
            (None, None) => {}
            _ => {
                return Err(Error::ArrowConflict {
                    short: short.to_string(),
                    long: long.to_string(),
                });
            }
        }

        let id = ArrowId(self.arrows.len() as i32);
        self.arrows.push(ArrowType {
            id,
            short: short.to_string(),
            long: long.to_string(),
            sttype,
        });
        self.by_name.insert(short.to_string(), id);
        self.by_name.insert(long.to_string(), id);
        tracing::debug!(%id, short, long, sttype = sttype.value(), "arrow registered");
        Ok(id)
    }

    /// Register from the declared class and sign.
    pub fn register_class(
        &mut self,
        class: RelationClass,
        sign: Sign,
        short: &str,
        long: &str,
    ) -> Result<ArrowId> {
        let sttype = SpacetimeType::from_class(class, sign)?;
        self.register(sttype, short, long)
    }

    /// Bind `forward` and `backward` as each other's inverse.
    /// Unknown or invalid ids are ignored and reported as `false`.
    pub fn register_inverse(&mut self, forward: ArrowId, backward: ArrowId) -> bool {
        if self.get(forward).is_none() || self.get(backward).is_none() {
            return false;
        }
        self.inverses.insert(forward, backward);
        self.inverses.insert(backward, forward);
        true
    }

    pub fn get(&self, id: ArrowId) -> Option<&ArrowType> {
        if !id.is_valid() {
            return None;
        }
        self.arrows.get(id.0 as usize)
    }

    /// Look a relation up by short or long name.
    pub fn resolve(&self, name: &str) -> Option<ArrowId> {
        self.by_name.get(name.trim()).copied()
    }

    pub fn inverse(&self, id: ArrowId) -> Option<ArrowId> {
        self.inverses.get(&id).copied()
    }

    /// Inverse lookup for path algebra, where an unbound arrow maps to itself.
    pub fn inverse_or_self(&self, id: ArrowId) -> ArrowId {
        self.inverse(id).unwrap_or(id)
    }

    pub fn sttype(&self, id: ArrowId) -> Option<SpacetimeType> {
        self.get(id).map(|a| a.sttype)
    }

    pub fn by_type(&self, sttype: SpacetimeType) -> impl Iterator<Item = &ArrowType> + '_ {
        self.iter().filter(move |a| a.sttype == sttype)
    }

    /// User-registered relations, excluding the origin arrow.
    pub fn iter(&self) -> impl Iterator<Item = &ArrowType> + '_ {
        self.arrows.iter().skip(1)
    }

    pub fn len(&self) -> usize {
        self.arrows.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every relation must have an inverse of the negated spacetime type.
    pub fn validate(&self) -> Result<()> {
        for arrow in self.iter() {
            let inv = self
                .inverse(arrow.id)
                .and_then(|i| self.get(i))
                .ok_or_else(|| Error::MissingInverse(arrow.long.clone()))?;
            if inv.sttype != arrow.sttype.negate() {
                return Err(Error::InverseMismatch {
                    forward: arrow.long.clone(),
                    backward: inv.long.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut reg = ArrowRegistry::new();
        let a = reg.register(SpacetimeType::LeadsTo, "likes", "liked-by").unwrap();
        let b = reg.register(SpacetimeType::LeadsTo, "likes", "liked-by").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, ArrowId(1));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_conflict() {
        let mut reg = ArrowRegistry::new();
        reg.register(SpacetimeType::LeadsTo, "likes", "liked-by").unwrap();
        assert!(matches!(
            reg.register(SpacetimeType::LeadsTo, "likes", "adores"),
            Err(Error::ArrowConflict { .. })
        ));
        assert!(matches!(
            reg.register(SpacetimeType::LeadsTo, "fond", "liked-by"),
            Err(Error::ArrowConflict { .. })
        ));
        assert!(reg.register(SpacetimeType::Near, "likes", "liked-by").is_err());
    }

    #[test]
    fn test_inverse_binding() {
        let mut reg = ArrowRegistry::new();
        let fwd = reg.register(SpacetimeType::LeadsTo, "then", "leads to next").unwrap();
        let bwd = reg.register(SpacetimeType::ComesFrom, "from", "comes after").unwrap();
        assert!(reg.register_inverse(fwd, bwd));
        assert_eq!(reg.inverse(fwd), Some(bwd));
        assert_eq!(reg.inverse(bwd), Some(fwd));
        assert_eq!(reg.inverse(ArrowId::ORIGIN), Some(ArrowId::ORIGIN));
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn test_inverse_ignores_invalid_ids() {
        let mut reg = ArrowRegistry::new();
        let fwd = reg.register(SpacetimeType::LeadsTo, "then", "leads to next").unwrap();
        assert!(!reg.register_inverse(fwd, ArrowId::INVALID));
        assert!(!reg.register_inverse(ArrowId(99), fwd));
        assert_eq!(reg.inverse(fwd), None);
        assert!(matches!(reg.validate(), Err(Error::MissingInverse(_))));
    }

    #[test]
    fn test_inverse_type_mismatch() {
        let mut reg = ArrowRegistry::new();
        let fwd = reg.register(SpacetimeType::LeadsTo, "then", "leads to next").unwrap();
        let bad = reg.register(SpacetimeType::PartOf, "in", "is part of").unwrap();
        reg.register_inverse(fwd, bad);
        assert!(matches!(reg.validate(), Err(Error::InverseMismatch { .. })));
    }

    #[test]
    fn test_resolve_by_either_name() {
        let mut reg = ArrowRegistry::new();
        let id = reg
            .register_class(RelationClass::Contains, Sign::Plus, "has", "contains")
            .unwrap();
        assert_eq!(reg.resolve("has"), Some(id));
        assert_eq!(reg.resolve("contains"), Some(id));
        assert_eq!(reg.resolve("nope"), None);
        assert_eq!(reg.sttype(id), Some(SpacetimeType::Contains));
        let contains: Vec<ArrowId> = reg.by_type(SpacetimeType::Contains).map(|a| a.id).collect();
        assert_eq!(contains, vec![id]);
        assert_eq!(reg.by_type(SpacetimeType::PartOf).count(), 0);
    }
}
