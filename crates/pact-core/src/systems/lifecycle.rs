//! Alliance Lifecycle
//!
//! Create, join, leave, dissolve and betray transitions, plus the joint
//! battle hook the host calls after a fight. Coalitions are only mutated
//! through the [`CoalitionStore`]; refusals are skipped and the next
//! candidate is tried.

use std::cmp::Ordering;

use pact_events::{DecisionKind, SimTime};
use tracing::trace;

use crate::components::{AgentId, AgentProfile, Coalition, CoalitionId, HistoryEntry, HistoryTag};
use crate::config::AllianceConfig;
use crate::host::{CoalitionStore, Host};
use crate::systems::cycle::{is_at_war, DecisionCycle};
use crate::systems::utility::{dissatisfaction, formation_utility, join_utility, Gate, PairContext};

/// Runs the alliance category: create, then join, then leave or dissolve.
/// Stops at the first decision that fires.
pub fn run_alliance<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    eligible: &[AgentProfile],
) -> bool {
    try_create(cycle, host, agent, eligible)
        || try_join(cycle, host, agent)
        || try_leave_or_dissolve(cycle, host, agent)
}

/// Proposes a coalition to the best-scoring eligible partner.
pub fn try_create<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    eligible: &[AgentProfile],
) -> bool {
    let config = cycle.config;
    let alliance = &config.alliance;
    if host.alliances_for(&agent.id).len() >= alliance.max_coalitions_to_create {
        return false;
    }
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::ProposeAlliance, cycle.now)
    {
        trace!(agent = %agent.id, "proposal on cooldown");
        return false;
    }

    let mut scored: Vec<(f32, &AgentProfile)> = eligible
        .iter()
        .filter(|c| c.id != agent.id)
        .filter(|c| host.alliances_for(&c.id).len() < alliance.max_coalitions_to_create)
        .filter(|c| host.alliance(&agent.id, &c.id).is_none())
        .map(|c| {
            let ctx = PairContext::gather(&*host, agent, c);
            (formation_utility(&ctx, &config.scoring), c)
        })
        .collect();
    scored.sort_by(|(ua, a), (ub, b)| {
        ub.partial_cmp(ua)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let threshold = cycle.threshold(Gate::Formation, agent, is_at_war(&*host, agent));
    for (utility, partner) in scored.into_iter().take(alliance.candidate_pool) {
        if utility < threshold {
            break;
        }
        if !host.propose_alliance(&agent.id, &partner.id, cycle.now) {
            trace!(agent = %agent.id, partner = %partner.id, "proposal refused");
            continue;
        }
        let Some(coalition) = host.alliance(&agent.id, &partner.id) else {
            continue;
        };
        host.append_history(
            &coalition.id,
            HistoryEntry::tagged(
                cycle.now,
                HistoryTag::Formed,
                format!("Alliance formed between {} and {}", agent.name, partner.name),
            ),
        );
        let event = cycle
            .event(DecisionKind::ProposeAlliance, &agent.id)
            .with_counterpart(partner.id.as_str())
            .with_coalition(coalition.id.as_str())
            .with_scores(utility, threshold);
        cycle.fire(&agent.id, event);
        return true;
    }
    false
}

/// Joins the first open coalition whose join utility clears the threshold.
pub fn try_join<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
) -> bool {
    let config = cycle.config;
    let alliance = &config.alliance;
    if host.alliances_for(&agent.id).len() >= alliance.max_coalitions_to_join {
        return false;
    }
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::JoinAlliance, cycle.now)
    {
        return false;
    }

    let threshold = cycle.threshold(Gate::Join, agent, is_at_war(&*host, agent));
    let mut open: Vec<Coalition> = host
        .all_active()
        .into_iter()
        .filter(|c| !c.is_member(&agent.id) && c.has_open_slot(alliance.max_members))
        .collect();
    open.sort_by(|a, b| a.id.cmp(&b.id));

    for coalition in open {
        let scores: Vec<f32> = coalition
            .members
            .iter()
            .filter_map(|m| host.profile(m))
            .map(|member| {
                let ctx = PairContext::gather(&*host, agent, &member);
                formation_utility(&ctx, &config.scoring)
            })
            .collect();
        let utility = join_utility(&scores, coalition.trust);
        if utility < threshold {
            trace!(agent = %agent.id, coalition = %coalition.id, utility, threshold, "join below threshold");
            continue;
        }
        if !host.join_alliance(&coalition.id, &agent.id, cycle.now) {
            continue;
        }
        host.append_history(
            &coalition.id,
            HistoryEntry::tagged(
                cycle.now,
                HistoryTag::Joined,
                format!("{} joined the alliance", agent.name),
            ),
        );
        let event = cycle
            .event(DecisionKind::JoinAlliance, &agent.id)
            .with_coalition(coalition.id.as_str())
            .with_scores(utility, threshold);
        cycle.fire(&agent.id, event);
        return true;
    }
    false
}

/// Members leave coalitions they are unhappy with; leaders dissolve them
/// instead. A leader never leaves through this path.
pub fn try_leave_or_dissolve<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
) -> bool {
    let at_war = is_at_war(&*host, agent);
    let mut held = host.alliances_for(&agent.id);
    held.sort_by(|a, b| a.id.cmp(&b.id));

    for coalition in held {
        let unhappiness = dissatisfaction(
            coalition.trust,
            coalition.secrecy,
            coalition.negative_history_count(),
        );

        if coalition.is_leader(&agent.id) {
            if try_dissolve(cycle, host, agent, &coalition, unhappiness, at_war) {
                return true;
            }
            continue;
        }

        if cycle
            .memory
            .has_decision_cooldown(&agent.id, DecisionKind::LeaveAlliance, cycle.now)
        {
            continue;
        }
        let threshold = cycle.threshold(Gate::Leave, agent, at_war);
        if unhappiness < threshold {
            continue;
        }
        if !host.leave_alliance(&coalition.id, &agent.id, cycle.now) {
            continue;
        }
        host.append_history(
            &coalition.id,
            HistoryEntry::tagged(
                cycle.now,
                HistoryTag::Left,
                format!("{} left the alliance", agent.name),
            ),
        );
        let event = cycle
            .event(DecisionKind::LeaveAlliance, &agent.id)
            .with_coalition(coalition.id.as_str())
            .with_scores(unhappiness, threshold);
        cycle.fire(&agent.id, event);
        return true;
    }
    false
}

fn try_dissolve<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    coalition: &Coalition,
    unhappiness: f32,
    at_war: bool,
) -> bool {
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::DissolveAlliance, cycle.now)
    {
        return false;
    }
    let threshold = cycle.threshold(Gate::Dissolve, agent, at_war);
    if unhappiness < threshold {
        return false;
    }
    if !host.dissolve_alliance(&coalition.id, cycle.now) {
        return false;
    }
    host.append_history(
        &coalition.id,
        HistoryEntry::tagged(
            cycle.now,
            HistoryTag::Dissolved,
            format!("Alliance dissolved by {}", agent.name),
        ),
    );
    let event = cycle
        .event(DecisionKind::DissolveAlliance, &agent.id)
        .with_coalition(coalition.id.as_str())
        .with_scores(unhappiness, threshold);
    cycle.fire(&agent.id, event);
    true
}

/// Leaves `coalition` in favour of `beneficiary` and applies the fallout:
/// remaining members resent the agent, the beneficiary warms to it and the
/// coalition loses trust.
pub fn betray<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
    coalition: &Coalition,
    beneficiary: &AgentProfile,
    utility: f32,
    threshold: f32,
) -> bool {
    if !host.leave_alliance(&coalition.id, &agent.id, cycle.now) {
        trace!(agent = %agent.id, coalition = %coalition.id, "betrayal exit refused");
        return false;
    }

    let config = cycle.config;
    let alliance = &config.alliance;
    let remaining: Vec<AgentId> = coalition.other_members(&agent.id).cloned().collect();
    for member in &remaining {
        host.adjust_relation(&agent.id, member, alliance.betrayal_relation_penalty);
    }
    host.adjust_relation(&agent.id, &beneficiary.id, alliance.beneficiary_relation_bonus);
    host.adjust_trust(&coalition.id, -alliance.betrayal_trust_penalty);
    host.append_history(
        &coalition.id,
        HistoryEntry::tagged(
            cycle.now,
            HistoryTag::Betrayed,
            format!(
                "{} betrayed the alliance in favour of {}",
                agent.name, beneficiary.name
            ),
        ),
    );

    let event = cycle
        .event(DecisionKind::BetrayAlliance, &agent.id)
        .with_coalition(coalition.id.as_str())
        .with_counterpart(beneficiary.id.as_str())
        .with_scores(utility, threshold);
    cycle.fire(&agent.id, event);
    true
}

/// Host hook after coalition members fought side by side.
///
/// Each witness costs secrecy, capped per battle.
pub fn note_joint_battle<S: CoalitionStore + ?Sized>(
    store: &mut S,
    coalition: &CoalitionId,
    won: bool,
    witnesses: usize,
    now: SimTime,
    config: &AllianceConfig,
) {
    if store.coalition(coalition).is_none() {
        return;
    }
    let (delta, text) = if won {
        (config.battle_trust_delta, "Fought together and won")
    } else {
        (-config.battle_trust_delta, "Joint battle failed")
    };
    store.adjust_trust(coalition, delta);
    store.append_history(coalition, HistoryEntry::tagged(now, HistoryTag::Battle, text));

    let exposure =
        (config.witness_secrecy_cost * witnesses as f32).min(config.max_witness_secrecy_cost);
    if exposure > 0.0 {
        store.adjust_secrecy(coalition, -exposure);
    }
}
