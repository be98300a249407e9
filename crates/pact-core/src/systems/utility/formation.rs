//! Formation, join and dissatisfaction utilities.

use crate::components::{AgentProfile, SettlementKind};
use crate::config::ScoringConfig;
use crate::host::{CoalitionStore, WorldView};

use super::bounds;

/// Sub-utility constants
pub mod weights {
    /// Weight of the min/max strength ratio in military utility
    pub const MILITARY_RATIO: f32 = 0.6;
    /// Weight of proximity in military utility
    pub const MILITARY_PROXIMITY: f32 = 0.3;
    /// Bonus per hostile faction the pair shares
    pub const SHARED_ENEMY: f32 = 0.1;
    pub const SHARED_ENEMY_CAP: f32 = 0.3;
    /// Weight of wealth parity in economic utility
    pub const ECONOMIC_PARITY: f32 = 0.5;
    pub const ECONOMIC_PROXIMITY: f32 = 0.3;
    /// Bonus when one holds a Town and the other a Castle
    pub const TRADE_PAIR: f32 = 0.2;
    pub const RELATION: f32 = 0.5;
    pub const SAME_FACTION: f32 = 0.3;
    pub const FACTIONS_AT_WAR: f32 = 0.5;
    pub const SAME_CULTURE: f32 = 0.1;
    /// Bonus when honor levels differ by at most one
    pub const HONOR_COMPATIBLE: f32 = 0.1;
    pub const BOTH_CALCULATING: f32 = 0.05;
    pub const THREAT_STRENGTH: f32 = 0.4;
    pub const THREAT_PER_HOSTILE: f32 = 0.15;
    pub const THREAT_HOSTILE_CAP: f32 = 0.4;
    pub const THREAT_WEALTH: f32 = 0.2;
    /// Security bonus per coalition already held by either agent
    pub const NETWORK_STEP: f32 = 0.05;
    pub const NETWORK_CAP: f32 = 0.2;
    pub const JOIN_FORMATION: f32 = 0.8;
    pub const JOIN_TRUST: f32 = 20.0;
    pub const DISSATISFACTION_TRUST: f32 = 40.0;
    pub const DISSATISFACTION_SECRECY: f32 = 30.0;
    pub const DISSATISFACTION_NEGATIVE: f32 = 10.0;
}

/// Host facts about a pair of agents, gathered once per comparison.
#[derive(Debug, Clone)]
pub struct PairContext<'a> {
    pub a: &'a AgentProfile,
    pub b: &'a AgentProfile,
    /// Relation between the two leaders
    pub relation: i32,
    pub factions_at_war: bool,
    /// Factions hostile to both agents' factions
    pub shared_hostiles: usize,
    pub hostiles_a: usize,
    pub hostiles_b: usize,
    /// Coalitions currently held by either agent
    pub coalitions_held: usize,
}

impl<'a> PairContext<'a> {
    /// A context with no relation, wars or coalitions. Used in tests and by
    /// hosts that compute the facts themselves.
    pub fn new(a: &'a AgentProfile, b: &'a AgentProfile) -> Self {
        Self {
            a,
            b,
            relation: 0,
            factions_at_war: false,
            shared_hostiles: 0,
            hostiles_a: 0,
            hostiles_b: 0,
            coalitions_held: 0,
        }
    }

    pub fn gather<H>(host: &H, a: &'a AgentProfile, b: &'a AgentProfile) -> Self
    where
        H: WorldView + CoalitionStore + ?Sized,
    {
        let hostile_a = a
            .faction
            .as_ref()
            .map(|f| host.hostile_factions(f))
            .unwrap_or_default();
        let hostile_b = b
            .faction
            .as_ref()
            .map(|f| host.hostile_factions(f))
            .unwrap_or_default();
        let shared_hostiles = hostile_a.iter().filter(|f| hostile_b.contains(f)).count();

        let factions_at_war = match (&a.faction, &b.faction) {
            (Some(fa), Some(fb)) if fa != fb => host.factions_at_war(fa, fb),
            _ => false,
        };

        Self {
            a,
            b,
            relation: host.relation(&a.id, &b.id),
            factions_at_war,
            shared_hostiles,
            hostiles_a: hostile_a.len(),
            hostiles_b: hostile_b.len(),
            coalitions_held: host.alliances_for(&a.id).len() + host.alliances_for(&b.id).len(),
        }
    }

    pub fn distance(&self) -> f32 {
        self.a.position.distance_to(&self.b.position)
    }
}

/// Weighted breakdown of a formation score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormationUtility {
    pub military: f32,
    pub economic: f32,
    pub political: f32,
    pub security: f32,
}

impl FormationUtility {
    /// Scores every sub-utility for the pair, clamped to its bounds.
    pub fn evaluate(ctx: &PairContext<'_>, config: &ScoringConfig) -> Self {
        Self {
            military: military(ctx, config),
            economic: economic(ctx, config),
            political: political(ctx),
            security: security(ctx, config),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            military: self.military.clamp(bounds::COMPONENT_MIN, bounds::COMPONENT_MAX),
            economic: self.economic.clamp(bounds::COMPONENT_MIN, bounds::COMPONENT_MAX),
            political: self.political.clamp(bounds::COMPONENT_MIN, bounds::COMPONENT_MAX),
            security: self.security.clamp(bounds::SECURITY_MIN, bounds::COMPONENT_MAX),
        }
    }

    /// Composite utility on the 0-100 scale
    pub fn composite(&self, config: &ScoringConfig) -> f32 {
        bounds::SCALE
            * (self.military * config.military_weight
                + self.economic * config.economic_weight
                + self.political * config.political_weight
                + self.security * config.security_weight)
    }
}

/// Inverse-linear falloff: 1 at distance zero, 0 at `radius` and beyond.
pub fn proximity(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).clamp(0.0, 1.0)
}

fn military(ctx: &PairContext<'_>, config: &ScoringConfig) -> f32 {
    let (sa, sb) = (ctx.a.strength.max(0.0), ctx.b.strength.max(0.0));
    let stronger = sa.max(sb);
    let ratio = if stronger > 0.0 { sa.min(sb) / stronger } else { 0.0 };
    let shared = (weights::SHARED_ENEMY * ctx.shared_hostiles as f32).min(weights::SHARED_ENEMY_CAP);

    weights::MILITARY_RATIO * ratio
        + weights::MILITARY_PROXIMITY * proximity(ctx.distance(), config.proximity_radius)
        + shared
}

fn economic(ctx: &PairContext<'_>, config: &ScoringConfig) -> f32 {
    let (wa, wb) = (ctx.a.wealth.max(0) as f32, ctx.b.wealth.max(0) as f32);
    let richer = wa.max(wb);
    let parity = if richer > 0.0 {
        1.0 - (wa - wb).abs() / richer
    } else {
        0.0
    };

    let trade_pair = (ctx.a.holds(SettlementKind::Town) && ctx.b.holds(SettlementKind::Castle))
        || (ctx.a.holds(SettlementKind::Castle) && ctx.b.holds(SettlementKind::Town));

    weights::ECONOMIC_PARITY * parity
        + weights::ECONOMIC_PROXIMITY * proximity(ctx.distance(), config.proximity_radius)
        + if trade_pair { weights::TRADE_PAIR } else { 0.0 }
}

fn political(ctx: &PairContext<'_>) -> f32 {
    let (ta, tb) = (&ctx.a.traits, &ctx.b.traits);
    let mut score = weights::RELATION * (ctx.relation.clamp(-100, 100) as f32 / 100.0);

    if ctx.a.same_faction(ctx.b) {
        score += weights::SAME_FACTION;
    }
    if ctx.factions_at_war {
        score -= weights::FACTIONS_AT_WAR;
    }
    if !ctx.a.culture.is_empty() && ctx.a.culture == ctx.b.culture {
        score += weights::SAME_CULTURE;
    }
    if (ta.honor - tb.honor).abs() <= 1 {
        score += weights::HONOR_COMPATIBLE;
    }
    if ta.calculating > 0 && tb.calculating > 0 {
        score += weights::BOTH_CALCULATING;
    }
    score
}

fn security(ctx: &PairContext<'_>, config: &ScoringConfig) -> f32 {
    let shared_threat =
        0.5 * (threat(ctx.a, ctx.hostiles_a, config) + threat(ctx.b, ctx.hostiles_b, config));
    let network = (weights::NETWORK_STEP * ctx.coalitions_held as f32).min(weights::NETWORK_CAP);
    (shared_threat + network).clamp(0.0, 1.0)
}

/// How exposed an agent is, in [0, 1].
pub fn threat(agent: &AgentProfile, hostile_factions: usize, config: &ScoringConfig) -> f32 {
    let strength_ratio = if config.reference_strength > 0.0 {
        (agent.strength.max(0.0) / config.reference_strength).min(1.0)
    } else {
        1.0
    };
    let wealth_ratio = if config.reference_wealth > 0.0 {
        (agent.wealth.max(0) as f32 / config.reference_wealth).min(1.0)
    } else {
        1.0
    };

    weights::THREAT_STRENGTH * (1.0 - strength_ratio)
        + (weights::THREAT_PER_HOSTILE * hostile_factions as f32).min(weights::THREAT_HOSTILE_CAP)
        + weights::THREAT_WEALTH * (1.0 - wealth_ratio)
}

/// Composite formation utility of the pair on the 0-100 scale.
pub fn formation_utility(ctx: &PairContext<'_>, config: &ScoringConfig) -> f32 {
    FormationUtility::evaluate(ctx, config).composite(config)
}

/// Utility of joining a coalition, from the agent's formation scores against
/// each current member.
pub fn join_utility(member_scores: &[f32], trust: f32) -> f32 {
    let mean = if member_scores.is_empty() {
        0.0
    } else {
        member_scores.iter().sum::<f32>() / member_scores.len() as f32
    };
    mean * weights::JOIN_FORMATION + trust.clamp(0.0, 1.0) * weights::JOIN_TRUST
}

/// Unhappiness with a coalition; compared against the leave and dissolve
/// thresholds.
pub fn dissatisfaction(trust: f32, secrecy: f32, negative_entries: usize) -> f32 {
    (1.0 - trust.clamp(0.0, 1.0)) * weights::DISSATISFACTION_TRUST
        + (1.0 - secrecy.clamp(0.0, 1.0)) * weights::DISSATISFACTION_SECRECY
        + negative_entries as f32 * weights::DISSATISFACTION_NEGATIVE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Traits;

    fn close_pair() -> (AgentProfile, AgentProfile) {
        let a = AgentProfile::new("clan_a", "A")
            .with_faction("vlandia")
            .with_culture("vlandian")
            .with_wealth(10_000)
            .with_strength(500.0)
            .with_traits(Traits::new(2, 0))
            .at(100.0, 100.0);
        let b = AgentProfile::new("clan_b", "B")
            .with_faction("vlandia")
            .with_culture("vlandian")
            .with_wealth(9_000)
            .with_strength(480.0)
            .at(106.0, 108.0);
        (a, b)
    }

    #[test]
    fn test_dissatisfaction_formula() {
        let score = dissatisfaction(0.2, 0.5, 1);
        assert!((score - 57.0).abs() < 1e-4);
    }

    #[test]
    fn test_proximity_falloff() {
        assert_eq!(proximity(0.0, 150.0), 1.0);
        assert!((proximity(75.0, 150.0) - 0.5).abs() < 1e-6);
        assert_eq!(proximity(300.0, 150.0), 0.0);
        assert_eq!(proximity(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_strong_allies_pass_formation_threshold() {
        let (a, b) = close_pair();
        let mut ctx = PairContext::new(&a, &b);
        ctx.relation = 60;

        let score = formation_utility(&ctx, &ScoringConfig::default());
        assert!(score >= 60.0, "expected >= 60, got {}", score);
        assert!(score < 75.0, "expected a moderate score, got {}", score);
    }

    #[test]
    fn test_war_between_factions_hurts_politics() {
        let (a, b) = close_pair();
        let b = b.with_faction("sturgia");
        let config = ScoringConfig::default();

        let mut peace = PairContext::new(&a, &b);
        peace.relation = 20;
        let mut war = peace.clone();
        war.factions_at_war = true;

        let peaceful = FormationUtility::evaluate(&peace, &config);
        let warring = FormationUtility::evaluate(&war, &config);
        assert!(warring.political < peaceful.political);
        assert!(formation_utility(&war, &config) < formation_utility(&peace, &config));
    }

    #[test]
    fn test_components_are_clamped() {
        let raw = FormationUtility {
            military: 3.0,
            economic: -2.0,
            political: 0.4,
            security: -0.3,
        };
        let clamped = raw.clamped();
        assert_eq!(clamped.military, 1.0);
        assert_eq!(clamped.economic, -0.5);
        assert_eq!(clamped.political, 0.4);
        assert_eq!(clamped.security, 0.0);
    }

    #[test]
    fn test_composite_is_monotonic_in_each_component() {
        let config = ScoringConfig::default();
        let base = FormationUtility {
            military: 0.2,
            economic: 0.1,
            political: -0.1,
            security: 0.3,
        };
        let raised = [
            FormationUtility { military: 0.5, ..base },
            FormationUtility { economic: 0.6, ..base },
            FormationUtility { political: 0.4, ..base },
            FormationUtility { security: 0.9, ..base },
        ];
        for r in raised {
            assert!(r.composite(&config) >= base.composite(&config));
        }
    }

    #[test]
    fn test_trade_pair_bonus() {
        let (a, b) = close_pair();
        let config = ScoringConfig::default();
        let plain = FormationUtility::evaluate(&PairContext::new(&a, &b), &config);

        let a = a.with_holdings(vec![SettlementKind::Town]);
        let b = b.with_holdings(vec![SettlementKind::Castle]);
        let traded = FormationUtility::evaluate(&PairContext::new(&a, &b), &config);
        assert!((traded.economic - plain.economic - weights::TRADE_PAIR).abs() < 1e-5);
    }

    #[test]
    fn test_threat_is_bounded() {
        let config = ScoringConfig::default();
        let broke = AgentProfile::new("x", "X");
        assert!((threat(&broke, 10, &config) - 1.0).abs() < 1e-6);

        let safe = AgentProfile::new("y", "Y").with_wealth(50_000).with_strength(2_000.0);
        assert_eq!(threat(&safe, 0, &config), 0.0);
    }

    #[test]
    fn test_join_utility() {
        assert!((join_utility(&[70.0, 50.0], 0.5) - 58.0).abs() < 1e-4);
        assert_eq!(join_utility(&[], 1.0), 20.0);
    }
}
