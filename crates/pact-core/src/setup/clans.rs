//! Clan Spawning
//!
//! Fills a sandbox world with clans that have randomized wealth, strength,
//! traits, holdings and starting relations.

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::info;

use crate::components::{AgentId, AgentProfile, SettlementKind, Traits, TRAIT_MAX, TRAIT_MIN};
use crate::host::WorldView;
use crate::sandbox::SandboxWorld;
use crate::setup::factions::{active_factions, declare_wars, FactionTemplate};

const CLAN_NAMES: &[&str] = &[
    "Aldric", "Brannoc", "Cedric", "Dagny", "Erland", "Fenwick", "Garrow", "Harald", "Isolde",
    "Jorund", "Kestrel", "Linden", "Morwen", "Njord", "Osric", "Penrose", "Quillon", "Ragna",
    "Sigrun", "Thorne", "Ulfric", "Valdis", "Wystan", "Yrsa",
];

/// Parameters of a generated population
#[derive(Debug, Clone)]
pub struct PopulationConfig {
    pub clans: usize,
    pub factions: usize,
    /// Chance that any two factions start at war
    pub war_chance: f64,
    /// Spread of clan seats around their kingdom's center
    pub spread: f32,
    /// Share of clans without a kingdom
    pub independent_share: f64,
    /// Marks the first clan as the player's
    pub with_player: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            clans: 24,
            factions: 4,
            war_chance: 0.35,
            spread: 120.0,
            independent_share: 0.1,
            with_player: true,
        }
    }
}

/// Summary of a spawned population
#[derive(Debug, Clone, Default)]
pub struct SpawnSummary {
    pub clans: usize,
    pub independent: usize,
    pub wars: usize,
}

fn generate_agent_id(index: usize) -> AgentId {
    AgentId(format!("clan_{:04}", index + 1))
}

fn generate_name(faction: Option<&FactionTemplate>, index: usize) -> String {
    let base = CLAN_NAMES[index % CLAN_NAMES.len()];
    let generation = index / CLAN_NAMES.len();
    let name = if generation == 0 {
        base.to_string()
    } else {
        format!("{} {}", base, generation + 1)
    };
    match faction {
        Some(f) => format!("{} {}", name, f.suffix),
        None => name,
    }
}

/// Trait level biased toward neutral: rounded mean of two uniform draws.
fn trait_level(rng: &mut SmallRng) -> i8 {
    let a = rng.gen_range(TRAIT_MIN..=TRAIT_MAX) as f32;
    let b = rng.gen_range(TRAIT_MIN..=TRAIT_MAX) as f32;
    ((a + b) / 2.0).round() as i8
}

fn generate_traits(rng: &mut SmallRng) -> Traits {
    Traits::new(trait_level(rng), trait_level(rng))
        .with_valor(trait_level(rng))
        .with_generosity(trait_level(rng))
}

fn generate_holdings(rng: &mut SmallRng) -> Vec<SettlementKind> {
    let mut holdings = vec![SettlementKind::Village];
    if rng.gen_bool(0.4) {
        holdings.push(SettlementKind::Castle);
    }
    if rng.gen_bool(0.25) {
        holdings.push(SettlementKind::Town);
    }
    holdings
}

fn generate_clan(
    index: usize,
    faction: Option<&FactionTemplate>,
    spread: f32,
    rng: &mut SmallRng,
) -> AgentProfile {
    let id = generate_agent_id(index);
    let mut profile = AgentProfile::new(id.0, generate_name(faction, index))
        .with_wealth(rng.gen_range(500..=30_000))
        .with_strength(rng.gen_range(20.0..1_500.0))
        .with_traits(generate_traits(rng))
        .with_holdings(generate_holdings(rng));

    let (cx, cy) = faction.map(|f| f.seat).unwrap_or((260.0, 260.0));
    profile = profile.at(
        cx + rng.gen_range(-spread..=spread),
        cy + rng.gen_range(-spread..=spread),
    );
    if let Some(f) = faction {
        profile = profile.with_faction(f.id).with_culture(f.culture);
    }
    profile
}

/// Starting relation for a pair, shaped by kingdom ties.
fn starting_relation(
    world: &SandboxWorld,
    a: &AgentProfile,
    b: &AgentProfile,
    rng: &mut SmallRng,
) -> i32 {
    let at_war = match (&a.faction, &b.faction) {
        (Some(fa), Some(fb)) => world.factions_at_war(fa, fb),
        _ => false,
    };
    if a.same_faction(b) {
        rng.gen_range(10..=70)
    } else if at_war {
        rng.gen_range(-70..=-10)
    } else {
        rng.gen_range(-30..=40)
    }
}

/// Generates a complete population into a fresh sandbox world.
pub fn spawn_population(
    config: &PopulationConfig,
    rng: &mut SmallRng,
) -> (SandboxWorld, SpawnSummary) {
    let mut world = SandboxWorld::new();
    let factions = active_factions(config.factions);
    let wars = declare_wars(&mut world, factions, config.war_chance, rng);

    let mut summary = SpawnSummary {
        wars,
        ..SpawnSummary::default()
    };
    let mut profiles = Vec::with_capacity(config.clans);
    for index in 0..config.clans {
        let independent = rng.gen_bool(config.independent_share.clamp(0.0, 1.0));
        let faction = if factions.is_empty() || independent {
            summary.independent += 1;
            None
        } else {
            Some(&factions[index % factions.len()])
        };
        let mut profile = generate_clan(index, faction, config.spread, rng);
        if index == 0 && config.with_player {
            profile = profile.player();
        }
        profiles.push(profile);
    }

    for (i, a) in profiles.iter().enumerate() {
        for b in &profiles[i + 1..] {
            let relation = starting_relation(&world, a, b, rng);
            world.set_relation(&a.id, &b.id, relation);
        }
    }
    summary.clans = profiles.len();
    for profile in profiles {
        world.add_agent(profile);
    }

    info!(
        clans = summary.clans,
        independent = summary.independent,
        wars = summary.wars,
        "population spawned"
    );
    (world, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig::default();
        let (world, summary) = spawn_population(&config, &mut rng);

        assert_eq!(summary.clans, 24);
        assert_eq!(world.agent_ids().len(), 24);
        let first = world.profile(&AgentId::from("clan_0001")).unwrap();
        assert!(first.is_player);
        for id in world.agent_ids() {
            let profile = world.profile(&id).unwrap();
            assert!(profile.wealth >= 500);
            assert!(profile.traits.honor >= TRAIT_MIN && profile.traits.honor <= TRAIT_MAX);
        }
    }

    #[test]
    fn test_same_seed_same_population() {
        let config = PopulationConfig::default();
        let (a, _) = spawn_population(&config, &mut SmallRng::seed_from_u64(9));
        let (b, _) = spawn_population(&config, &mut SmallRng::seed_from_u64(9));

        let x = AgentId::from("clan_0003");
        let y = AgentId::from("clan_0011");
        assert_eq!(a.relation(&x, &y), b.relation(&x, &y));
        assert_eq!(a.profile(&x).unwrap().wealth, b.profile(&x).unwrap().wealth);
    }

    #[test]
    fn test_names_stay_unique() {
        let mut names: Vec<String> = (0..60).map(|i| generate_name(None, i)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 60);
    }
}
