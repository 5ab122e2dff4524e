//! Relation (arrow) types and the signed spacetime classification.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// SpacetimeType
// ============================================================================

/// Signed spacetime class of a relation. Positive values point forward
/// along a relation, negative values are their mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
#[repr(i8)]
pub enum SpacetimeType {
    ExpressedBy = -3,
    PartOf = -2,
    ComesFrom = -1,
    Near = 0,
    LeadsTo = 1,
    Contains = 2,
    Expresses = 3,
}

impl SpacetimeType {
    /// All seven types in bucket order.
    pub const ALL: [SpacetimeType; 7] = [
        SpacetimeType::ExpressedBy,
        SpacetimeType::PartOf,
        SpacetimeType::ComesFrom,
        SpacetimeType::Near,
        SpacetimeType::LeadsTo,
        SpacetimeType::Contains,
        SpacetimeType::Expresses,
    ];

    pub fn value(self) -> i8 {
        self as i8
    }

    /// Position in a node's bucket array (`value + 3`).
    pub fn bucket(self) -> usize {
        (self as i8 + 3) as usize
    }

    pub fn from_bucket(bucket: usize) -> Option<Self> {
        Self::ALL.get(bucket).copied()
    }

    pub fn negate(self) -> Self {
        match self {
            SpacetimeType::ExpressedBy => SpacetimeType::Expresses,
            SpacetimeType::PartOf => SpacetimeType::Contains,
            SpacetimeType::ComesFrom => SpacetimeType::LeadsTo,
            SpacetimeType::Near => SpacetimeType::Near,
            SpacetimeType::LeadsTo => SpacetimeType::ComesFrom,
            SpacetimeType::Contains => SpacetimeType::PartOf,
            SpacetimeType::Expresses => SpacetimeType::ExpressedBy,
        }
    }

    pub fn class(self) -> RelationClass {
        match self {
            SpacetimeType::Near => RelationClass::Similarity,
            SpacetimeType::LeadsTo | SpacetimeType::ComesFrom => RelationClass::LeadsTo,
            SpacetimeType::Contains | SpacetimeType::PartOf => RelationClass::Contains,
            SpacetimeType::Expresses | SpacetimeType::ExpressedBy => RelationClass::Expresses,
        }
    }

    /// Human readable bucket title.
    pub fn name(self) -> &'static str {
        match self {
            SpacetimeType::ExpressedBy => "-is property of",
            SpacetimeType::PartOf => "-contained by",
            SpacetimeType::ComesFrom => "-comes from",
            SpacetimeType::Near => "=similarity",
            SpacetimeType::LeadsTo => "+leads to",
            SpacetimeType::Contains => "+contains",
            SpacetimeType::Expresses => "+property",
        }
    }
}

impl TryFrom<i8> for SpacetimeType {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            -3..=3 => Ok(Self::ALL[(value + 3) as usize]),
            _ => Err(Error::SpacetimeOutOfRange(value)),
        }
    }
}

impl From<SpacetimeType> for i8 {
    fn from(st: SpacetimeType) -> i8 {
        st as i8
    }
}

impl std::fmt::Display for SpacetimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Relation class + sign (declaration form)
// ============================================================================

/// Unsigned relation family as it is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationClass {
    Similarity,
    LeadsTo,
    Contains,
    Expresses,
}

/// Direction marker on a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    #[default]
    Unsigned,
    Plus,
    Minus,
}

impl SpacetimeType {
    /// Combine a declared class and sign. Similarity is unsigned, every
    /// other class needs an explicit direction.
    pub fn from_class(class: RelationClass, sign: Sign) -> Result<Self> {
        let st = match (class, sign) {
            (RelationClass::Similarity, Sign::Unsigned) => SpacetimeType::Near,
            (RelationClass::LeadsTo, Sign::Plus) => SpacetimeType::LeadsTo,
            (RelationClass::LeadsTo, Sign::Minus) => SpacetimeType::ComesFrom,
            (RelationClass::Contains, Sign::Plus) => SpacetimeType::Contains,
            (RelationClass::Contains, Sign::Minus) => SpacetimeType::PartOf,
            (RelationClass::Expresses, Sign::Plus) => SpacetimeType::Expresses,
            (RelationClass::Expresses, Sign::Minus) => SpacetimeType::ExpressedBy,
            (class, sign) => return Err(Error::InvalidSign { class, sign }),
        };
        Ok(st)
    }
}

// ============================================================================
// ArrowId / ArrowType
// ============================================================================

/// Relation identifier. Id 0 is reserved for the synthetic origin link
/// that heads every chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrowId(pub i32);

impl ArrowId {
    pub const ORIGIN: ArrowId = ArrowId(0);
    pub const INVALID: ArrowId = ArrowId(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }
}

impl std::fmt::Display for ArrowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowType {
    pub id: ArrowId,
    pub short: String,
    pub long: String,
    pub sttype: SpacetimeType,
}

impl ArrowType {
    pub fn named(&self, name: &str) -> bool {
        self.short == name || self.long == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_roundtrip() {
        for st in SpacetimeType::ALL {
            assert_eq!(SpacetimeType::from_bucket(st.bucket()), Some(st));
            assert_eq!(SpacetimeType::try_from(st.value()).unwrap(), st);
        }
        assert_eq!(SpacetimeType::Near.bucket(), 3);
        assert_eq!(SpacetimeType::from_bucket(7), None);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(SpacetimeType::try_from(4), Err(Error::SpacetimeOutOfRange(4))));
        assert!(SpacetimeType::try_from(-4).is_err());
    }

    #[test]
    fn test_negate_is_involution() {
        for st in SpacetimeType::ALL {
            assert_eq!(st.negate().value(), -st.value());
            assert_eq!(st.negate().negate(), st);
        }
    }

    #[test]
    fn test_similarity_must_be_unsigned() {
        assert_eq!(
            SpacetimeType::from_class(RelationClass::Similarity, Sign::Unsigned).unwrap(),
            SpacetimeType::Near
        );
        assert!(SpacetimeType::from_class(RelationClass::Similarity, Sign::Plus).is_err());
        assert!(SpacetimeType::from_class(RelationClass::Contains, Sign::Unsigned).is_err());
        assert_eq!(
            SpacetimeType::from_class(RelationClass::Expresses, Sign::Minus).unwrap(),
            SpacetimeType::ExpressedBy
        );
    }
}
