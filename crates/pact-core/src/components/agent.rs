//! Agent Components
//!
//! Read-only snapshots of the host's clans: identity, wealth, strength,
//! disposition traits and holdings. The engine never owns agents; it reads
//! these snapshots and asks the host to mutate the real entities.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::faction::FactionId;

/// Lowest disposition trait level
pub const TRAIT_MIN: i8 = -2;
/// Highest disposition trait level
pub const TRAIT_MAX: i8 = 2;

/// Unique identifier for an agent (clan)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        AgentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId(s)
    }
}

/// Disposition traits of a clan leader.
/// All values are integers in [TRAIT_MIN, TRAIT_MAX]; 0 is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Traits {
    /// Keeps word; raises the bar for defection and betrayal
    pub honor: i8,
    /// Weighs advantage coldly; lowers the bar for defection and betrayal
    pub calculating: i8,
    /// Willingness to fight for others
    pub valor: i8,
    /// Willingness to part with gold
    pub generosity: i8,
}

impl Traits {
    pub fn new(honor: i8, calculating: i8) -> Self {
        Self {
            honor: honor.clamp(TRAIT_MIN, TRAIT_MAX),
            calculating: calculating.clamp(TRAIT_MIN, TRAIT_MAX),
            valor: 0,
            generosity: 0,
        }
    }

    pub fn with_valor(mut self, valor: i8) -> Self {
        self.valor = valor.clamp(TRAIT_MIN, TRAIT_MAX);
        self
    }

    pub fn with_generosity(mut self, generosity: i8) -> Self {
        self.generosity = generosity.clamp(TRAIT_MIN, TRAIT_MAX);
        self
    }

    /// Below-neutral honor; gates opportunistic actions
    pub fn is_dishonorable(&self) -> bool {
        self.honor < 0
    }
}

/// Kind of settlement a clan holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    /// Urban trade center
    Town,
    /// Fortified holding
    Castle,
    Village,
}

/// Map position of a clan's home settlement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Snapshot of a clan as seen by the decision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: String,
    pub faction: Option<FactionId>,
    pub culture: String,
    /// Name of the clan leader; leaderless clans take no decisions
    pub leader: Option<String>,
    /// Gold
    pub wealth: i64,
    /// Aggregate military strength of the clan's parties
    pub strength: f32,
    pub traits: Traits,
    pub position: Position,
    pub holdings: Vec<SettlementKind>,
    pub eliminated: bool,
    /// The player's clan; the engine never decides for it
    pub is_player: bool,
}

impl AgentProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: AgentId(id.into()),
            leader: Some(format!("Head of {}", name)),
            name,
            faction: None,
            culture: String::new(),
            wealth: 0,
            strength: 0.0,
            traits: Traits::default(),
            position: Position::default(),
            holdings: Vec::new(),
            eliminated: false,
            is_player: false,
        }
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = Some(FactionId(faction.into()));
        self
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    pub fn with_leader(mut self, leader: Option<String>) -> Self {
        self.leader = leader;
        self
    }

    pub fn with_wealth(mut self, wealth: i64) -> Self {
        self.wealth = wealth;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_holdings(mut self, holdings: Vec<SettlementKind>) -> Self {
        self.holdings = holdings;
        self
    }

    pub fn eliminated(mut self) -> Self {
        self.eliminated = true;
        self
    }

    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn has_leader(&self) -> bool {
        self.leader.is_some()
    }

    pub fn holds(&self, kind: SettlementKind) -> bool {
        self.holdings.contains(&kind)
    }

    pub fn same_faction(&self, other: &AgentProfile) -> bool {
        matches!((&self.faction, &other.faction), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_clamped() {
        let traits = Traits::new(5, -9).with_valor(3).with_generosity(-3);
        assert_eq!(traits.honor, TRAIT_MAX);
        assert_eq!(traits.calculating, TRAIT_MIN);
        assert_eq!(traits.valor, TRAIT_MAX);
        assert_eq!(traits.generosity, TRAIT_MIN);
    }

    #[test]
    fn test_same_faction_requires_both() {
        let a = AgentProfile::new("a", "A").with_faction("vlandia");
        let b = AgentProfile::new("b", "B").with_faction("vlandia");
        let c = AgentProfile::new("c", "C");
        assert!(a.same_faction(&b));
        assert!(!a.same_faction(&c));
        assert!(!c.same_faction(&c.clone()));
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
    }
}
