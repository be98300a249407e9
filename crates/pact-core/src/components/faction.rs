//! Faction Components
//!
//! Identifiers for the kingdoms clans belong to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a faction (kingdom)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub String);

impl FactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FactionId {
    fn from(s: &str) -> Self {
        FactionId(s.to_string())
    }
}

impl From<String> for FactionId {
    fn from(s: String) -> Self {
        FactionId(s)
    }
}

/// Unordered pair of factions, used as the key of war declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionPair(FactionId, FactionId);

impl FactionPair {
    pub fn new(a: FactionId, b: FactionId) -> Self {
        if a <= b {
            FactionPair(a, b)
        } else {
            FactionPair(b, a)
        }
    }

    pub fn contains(&self, faction: &FactionId) -> bool {
        &self.0 == faction || &self.1 == faction
    }

    /// The side opposite `faction`, if `faction` is part of the pair.
    pub fn other(&self, faction: &FactionId) -> Option<&FactionId> {
        if &self.0 == faction {
            Some(&self.1)
        } else if &self.1 == faction {
            Some(&self.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        let a = FactionPair::new("sturgia".into(), "battania".into());
        let b = FactionPair::new("battania".into(), "sturgia".into());
        assert_eq!(a, b);
        assert_eq!(a.other(&"sturgia".into()), Some(&FactionId::from("battania")));
        assert_eq!(a.other(&"aserai".into()), None);
    }
}
