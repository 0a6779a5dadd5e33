//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation tick counter (smallest unit of simulated time)
pub type Tick = u32;

/// Unique identifier for countries
///
/// Ids are dense indices handed out by the country registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryId(pub u16);

impl CountryId {
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier for a kind of opinion modifier ("Declared War", "Same Culture", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModifierTypeId(pub u16);

/// Unordered pair of distinct countries, stored with `a < b`
///
/// Every per-pair record is keyed by this, so (x, y) and (y, x) always
/// resolve to the same relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryPair {
    a: CountryId,
    b: CountryId,
}

impl CountryPair {
    /// Canonicalize a pair. Returns None for a self-pair.
    pub fn new(x: CountryId, y: CountryId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Lower id of the pair
    pub fn a(&self) -> CountryId {
        self.a
    }

    /// Higher id of the pair
    pub fn b(&self) -> CountryId {
        self.b
    }

    pub fn contains(&self, country: CountryId) -> bool {
        self.a == country || self.b == country
    }

    /// The other member of the pair, if `country` is a member
    pub fn other(&self, country: CountryId) -> Option<CountryId> {
        if country == self.a {
            Some(self.b)
        } else if country == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for CountryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}
