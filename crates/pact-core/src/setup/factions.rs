//! Faction Setup
//!
//! The kingdoms sandbox clans belong to and the wars between them.

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::debug;

use crate::components::FactionId;
use crate::sandbox::SandboxWorld;

/// A kingdom template
#[derive(Debug, Clone, Copy)]
pub struct FactionTemplate {
    pub id: &'static str,
    pub culture: &'static str,
    /// Clan name suffix, e.g. "of Thornwood"
    pub suffix: &'static str,
    /// Center of the kingdom's lands
    pub seat: (f32, f32),
}

pub const FACTIONS: &[FactionTemplate] = &[
    FactionTemplate {
        id: "thornwood",
        culture: "woodland",
        suffix: "of Thornwood",
        seat: (100.0, 100.0),
    },
    FactionTemplate {
        id: "ironmere",
        culture: "highland",
        suffix: "of Ironmere",
        seat: (400.0, 120.0),
    },
    FactionTemplate {
        id: "saltcliff",
        culture: "coastal",
        suffix: "of Saltcliff",
        seat: (120.0, 400.0),
    },
    FactionTemplate {
        id: "northern_hold",
        culture: "northern",
        suffix: "of the Hold",
        seat: (420.0, 420.0),
    },
    FactionTemplate {
        id: "red_march",
        culture: "steppe",
        suffix: "of the March",
        seat: (260.0, 260.0),
    },
    FactionTemplate {
        id: "amberfall",
        culture: "southern",
        suffix: "of Amberfall",
        seat: (260.0, 520.0),
    },
];

/// The first `count` faction templates, capped at the number available.
pub fn active_factions(count: usize) -> &'static [FactionTemplate] {
    &FACTIONS[..count.min(FACTIONS.len())]
}

/// Declares war between each pair of factions with probability `chance`.
/// Returns the number of wars declared.
pub fn declare_wars(
    world: &mut SandboxWorld,
    factions: &[FactionTemplate],
    chance: f64,
    rng: &mut SmallRng,
) -> usize {
    let mut wars = 0;
    for (i, a) in factions.iter().enumerate() {
        for b in &factions[i + 1..] {
            if rng.gen::<f64>() < chance {
                world.declare_war(&FactionId::from(a.id), &FactionId::from(b.id));
                debug!(a = a.id, b = b.id, "war declared");
                wars += 1;
            }
        }
    }
    wars
}
