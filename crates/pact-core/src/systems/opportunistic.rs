//! Opportunistic Actions
//!
//! Dishonorable agents occasionally betray a coalition to an outsider or
//! leak its secrets. Both branches sit behind flat probability gates.

use pact_events::DecisionKind;
use rand::Rng;
use tracing::trace;

use crate::components::{AgentProfile, HistoryEntry, HistoryTag};
use crate::host::Host;
use crate::systems::cycle::{hostile_count, is_at_war, DecisionCycle};
use crate::systems::lifecycle::betray;
use crate::systems::utility::{dissatisfaction, threat, BetrayalContext, Gate};

/// Runs the opportunistic category. Betrayal is tried first; a leak is only
/// considered when no betrayal fired.
pub fn run_opportunistic<H: Host + ?Sized, R: Rng>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    rng: &mut R,
) -> bool {
    try_betrayal(cycle, host, agent, rng) || try_leak(cycle, host, agent, rng)
}

/// Scans (coalition, betrayed member, beneficiary) combinations and betrays
/// on the first one whose utility clears the betrayal threshold.
pub fn try_betrayal<H: Host + ?Sized, R: Rng>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    rng: &mut R,
) -> bool {
    let config = cycle.config;
    if !agent.traits.is_dishonorable() {
        return false;
    }
    if rng.gen::<f64>() >= config.opportunistic.betrayal_gate {
        return false;
    }
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::BetrayAlliance, cycle.now)
    {
        return false;
    }

    let mut coalitions: Vec<_> = host
        .alliances_for(&agent.id)
        .into_iter()
        .filter(|c| c.founder != agent.id && !c.is_leader(&agent.id))
        .collect();
    if coalitions.is_empty() {
        return false;
    }
    coalitions.sort_by(|a, b| a.id.cmp(&b.id));

    let mut outsiders: Vec<AgentProfile> = host
        .agent_ids()
        .iter()
        .filter(|id| **id != agent.id)
        .filter_map(|id| host.profile(id))
        .filter(|p| !p.eliminated && p.has_leader())
        .filter(|p| agent.faction.is_none() || !agent.same_faction(p))
        .collect();
    outsiders.sort_by(|a, b| a.id.cmp(&b.id));

    let agent_threat = threat(agent, hostile_count(&*host, agent), &config.scoring);
    let threshold = cycle.threshold(Gate::Betrayal, agent, is_at_war(&*host, agent));

    for coalition in &coalitions {
        let burden = dissatisfaction(
            coalition.trust,
            coalition.secrecy,
            coalition.negative_history_count(),
        );
        let targets: Vec<AgentProfile> = coalition
            .other_members(&agent.id)
            .filter_map(|m| host.profile(m))
            .collect();

        for target in &targets {
            for beneficiary in outsiders.iter().filter(|o| !coalition.is_member(&o.id)) {
                let ctx = BetrayalContext {
                    agent,
                    target,
                    beneficiary,
                    relation_to_target: host.relation(&agent.id, &target.id),
                    relation_to_beneficiary: host.relation(&agent.id, &beneficiary.id),
                    dissatisfaction: burden,
                    threat: agent_threat,
                    reference_wealth: config.scoring.reference_wealth,
                };
                let utility = cycle.factors.score(&ctx);
                if utility < threshold {
                    continue;
                }
                if betray(cycle, host, agent, coalition, beneficiary, utility, threshold) {
                    return true;
                }
            }
        }
    }
    trace!(agent = %agent.id, threshold, "no betrayal worth the risk");
    false
}

/// Leaks one well-kept coalition secret per cycle.
pub fn try_leak<H: Host + ?Sized, R: Rng>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    rng: &mut R,
) -> bool {
    let config = cycle.config;
    let opportunistic = &config.opportunistic;
    if !agent.traits.is_dishonorable() || agent.wealth >= opportunistic.leak_wealth_ceiling {
        return false;
    }
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::LeakAlliance, cycle.now)
    {
        return false;
    }

    let mut held = host.alliances_for(&agent.id);
    held.sort_by(|a, b| a.id.cmp(&b.id));

    for coalition in held {
        if coalition.secrecy <= opportunistic.leak_secrecy_floor {
            continue;
        }
        if rng.gen::<f64>() >= opportunistic.leak_gate {
            continue;
        }
        host.force_leak(&coalition.id, cycle.now);
        host.append_history(
            &coalition.id,
            HistoryEntry::tagged(
                cycle.now,
                HistoryTag::Leaked,
                format!("Alliance secrets leaked by {}", agent.name),
            ),
        );
        host.adjust_secrecy(&coalition.id, -opportunistic.leak_secrecy_cost);

        let event = cycle
            .event(DecisionKind::LeakAlliance, &agent.id)
            .with_coalition(coalition.id.as_str());
        cycle.fire(&agent.id, event);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AgentId, Traits};
    use crate::config::EngineConfig;
    use crate::host::{CoalitionStore, WorldView};
    use crate::sandbox::SandboxWorld;
    use crate::systems::memory::DecisionMemory;
    use crate::systems::utility::{BetrayalFactors, DefaultBetrayalFactors};
    use pact_events::SimTime;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Opens every probability gate.
    fn always() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.opportunistic.betrayal_gate = 1.0;
        config.opportunistic.leak_gate = 1.0;
        config
    }

    fn scheming_world() -> SandboxWorld {
        let mut world = SandboxWorld::new();
        world.add_agent(
            AgentProfile::new("leader", "Leader")
                .with_faction("vlandia")
                .with_wealth(6_000)
                .with_strength(200.0),
        );
        world.add_agent(
            AgentProfile::new("schemer", "Schemer")
                .with_faction("vlandia")
                .with_wealth(2_000)
                .with_strength(100.0)
                .with_traits(Traits::new(-2, 2)),
        );
        world.add_agent(
            AgentProfile::new("outsider", "Outsider")
                .with_faction("sturgia")
                .with_wealth(40_000)
                .with_strength(2_000.0),
        );
        let schemer = AgentId::from("schemer");
        world.set_relation(&schemer, &AgentId::from("outsider"), 100);
        world.set_relation(&schemer, &AgentId::from("leader"), -100);
        assert!(world.propose_alliance(&AgentId::from("leader"), &schemer, SimTime::start()));
        world
    }

    /// Always scores a fixed utility.
    struct Fixed(f32);

    impl BetrayalFactors for Fixed {
        fn score(&self, _ctx: &BetrayalContext<'_>) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_betrayal_fires_and_punishes() {
        let mut world = scheming_world();
        let schemer_id = AgentId::from("schemer");
        let leader_id = AgentId::from("leader");
        let outsider_id = AgentId::from("outsider");
        world.set_relation(&schemer_id, &leader_id, 0);
        world.set_relation(&schemer_id, &outsider_id, 0);

        let config = always();
        let mut memory = DecisionMemory::new();
        let mut rng = SmallRng::seed_from_u64(7);
        let schemer = world.profile(&schemer_id).unwrap();
        let before = world.alliances_for(&schemer.id)[0].clone();
        let factors = Fixed(90.0);

        let mut cycle = DecisionCycle::new(&config, &mut memory, &factors, SimTime::start());
        assert!(try_betrayal(&mut cycle, &mut world, &schemer, &mut rng));

        let event = &cycle.events()[0];
        assert_eq!(event.kind, DecisionKind::BetrayAlliance);
        assert_eq!(event.counterpart.as_deref(), Some("outsider"));
        assert_eq!(event.utility, Some(90.0));

        let alliance = &config.alliance;
        assert_eq!(
            world.relation(&schemer_id, &leader_id),
            alliance.betrayal_relation_penalty
        );
        assert_eq!(
            world.relation(&schemer_id, &outsider_id),
            alliance.beneficiary_relation_bonus
        );
        let coalition = world.coalition(&before.id).unwrap();
        assert!((before.trust - coalition.trust - alliance.betrayal_trust_penalty).abs() < 1e-5);
        assert!(!coalition.is_member(&schemer.id));
        assert!(coalition
            .history
            .iter()
            .any(|e| e.tag == HistoryTag::Betrayed));
    }

    #[test]
    fn test_default_factors_betray_hated_ally_for_friend() {
        let mut world = scheming_world();
        let config = always();
        let mut memory = DecisionMemory::new();
        let mut rng = SmallRng::seed_from_u64(7);
        let schemer = world.profile(&AgentId::from("schemer")).unwrap();

        let mut cycle =
            DecisionCycle::new(&config, &mut memory, &DefaultBetrayalFactors, SimTime::start());
        assert!(try_betrayal(&mut cycle, &mut world, &schemer, &mut rng));

        let event = &cycle.events()[0];
        assert_eq!(event.counterpart.as_deref(), Some("outsider"));
        assert!(event.utility.unwrap() >= 80.0);
    }

    #[test]
    fn test_betrayal_between_sixty_and_eighty_does_not_fire() {
        let config = always();
        for utility in [60.0, 65.0, 70.0, 79.9] {
            let mut world = scheming_world();
            let mut memory = DecisionMemory::new();
            let mut rng = SmallRng::seed_from_u64(1);
            let schemer = world.profile(&AgentId::from("schemer")).unwrap();
            let factors = Fixed(utility);

            let mut cycle = DecisionCycle::new(&config, &mut memory, &factors, SimTime::start());
            assert!(!try_betrayal(&mut cycle, &mut world, &schemer, &mut rng));
            assert_eq!(world.alliances_for(&schemer.id).len(), 1);
        }
    }

    #[test]
    fn test_leader_never_betrays() {
        let mut world = scheming_world();
        let config = always();
        let mut memory = DecisionMemory::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut leader = world.profile(&AgentId::from("leader")).unwrap();
        leader.traits = Traits::new(-2, 2);
        let factors = Fixed(120.0);

        let mut cycle = DecisionCycle::new(&config, &mut memory, &factors, SimTime::start());
        assert!(!try_betrayal(&mut cycle, &mut world, &leader, &mut rng));
    }

    #[test]
    fn test_leak_costs_secrecy() {
        let mut world = scheming_world();
        let config = always();
        let mut memory = DecisionMemory::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let schemer = world.profile(&AgentId::from("schemer")).unwrap();
        let id = world.alliances_for(&schemer.id)[0].id.clone();

        let mut cycle =
            DecisionCycle::new(&config, &mut memory, &DefaultBetrayalFactors, SimTime::start());
        assert!(try_leak(&mut cycle, &mut world, &schemer, &mut rng));
        assert_eq!(cycle.events()[0].kind, DecisionKind::LeakAlliance);

        let coalition = world.coalition(&id).unwrap();
        assert!((coalition.secrecy - 0.8).abs() < 1e-5);
        assert_eq!(coalition.negative_history_count(), 1);
        assert_eq!(world.leaks().len(), 1);
    }

    #[test]
    fn test_honorable_agent_never_leaks() {
        let mut world = scheming_world();
        let config = always();
        let mut memory = DecisionMemory::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut schemer = world.profile(&AgentId::from("schemer")).unwrap();
        schemer.traits = Traits::new(1, 0);

        let mut cycle =
            DecisionCycle::new(&config, &mut memory, &DefaultBetrayalFactors, SimTime::start());
        assert!(!try_leak(&mut cycle, &mut world, &schemer, &mut rng));
    }
}
