//! Engine configuration.
//!
//! Everything here is plain serde data so a deployment can keep its arrow
//! vocabulary and search limits in one JSON file:
//!
//! ```json
//! {
//!   "limits": { "max_branch": 100, "growth": "alternate" },
//!   "arrows": [
//!     { "class": "leadsto",
//!       "forward":  { "short": "then", "long": "leads to next" },
//!       "backward": { "short": "from", "long": "comes after" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{RelationClass, Sign, SpacetimeType};
use crate::{Error, Result};

/// Which wavefront radius grows after an unsuccessful turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Left on even turns, right on odd turns.
    #[default]
    Alternate,
    /// The side whose frontier holds fewer distinct nodes; left on ties.
    SmallerFrontier,
}

/// Bounds on cone expansion and wavefront search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Successors expanded per node per step.
    pub max_branch: usize,
    /// Safety ceiling on chains held by either wavefront.
    pub max_frontier: usize,
    pub growth: GrowthPolicy,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_branch: 100,
            max_frontier: 50_000,
            growth: GrowthPolicy::Alternate,
        }
    }
}

/// Short and long spelling of one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowName {
    pub short: String,
    pub long: String,
}

impl ArrowName {
    pub fn new(short: impl Into<String>, long: impl Into<String>) -> Self {
        Self { short: short.into(), long: long.into() }
    }
}

/// A relation declared together with its inverse.
///
/// Signed classes give `forward` the `+` sign and `backward` the `-` sign.
/// Similarity relations are unsigned in both directions and may name the
/// same spelling twice to declare a self-inverse relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowPairDecl {
    pub class: RelationClass,
    pub forward: ArrowName,
    pub backward: ArrowName,
}

impl ArrowPairDecl {
    pub fn new(class: RelationClass, forward: ArrowName, backward: ArrowName) -> Self {
        Self { class, forward, backward }
    }

    /// Spacetime types of the forward and backward relation.
    pub fn sttypes(&self) -> Result<(SpacetimeType, SpacetimeType)> {
        let (fwd, bwd) = match self.class {
            RelationClass::Similarity => (Sign::Unsigned, Sign::Unsigned),
            _ => (Sign::Plus, Sign::Minus),
        };
        Ok((
            SpacetimeType::from_class(self.class, fwd)?,
            SpacetimeType::from_class(self.class, bwd)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: SearchLimits,
    /// Radius of the cone swept when assembling a node orbit.
    pub orbit_radius: usize,
    /// Relations registered when the engine opens.
    pub arrows: Vec<ArrowPairDecl>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: SearchLimits::default(),
            orbit_radius: 3,
            arrows: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
