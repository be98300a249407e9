//! Assistance Negotiation
//!
//! Answers pending mutual-aid requests and originates new ones for agents
//! that are short of gold or troops.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use pact_events::DecisionKind;
use tracing::{trace, warn};

use crate::components::{AgentId, AgentProfile, HistoryEntry, HistoryTag, Request, RequestType};
use crate::error::HostError;
use crate::host::Host;
use crate::systems::cycle::{is_at_war, DecisionCycle};
use crate::systems::utility::{assistance_utility, desperation, AssistanceInputs, Gate};

/// Runs the assistance category: answers pending requests, then asks for
/// aid if the daily cap still allows. Returns true if any decision fired.
pub fn run_assistance<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
) -> bool {
    let responded = respond_to_requests(cycle, host, agent);
    if cycle.at_cap(&agent.id) {
        return responded;
    }
    let Some(agent) = host.profile(&agent.id) else {
        return responded;
    };
    let originated = originate_request(cycle, host, &agent);
    responded || originated
}

/// Accepts, declines or defers pending requests addressed to `agent`, in
/// request order, until the daily cap is reached. Unanswered requests stay
/// pending.
///
/// The helper is re-read before each request so earlier payouts are seen.
pub fn respond_to_requests<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
) -> bool {
    let config = cycle.config;
    let mut pending = host.pending_for(&agent.id);
    pending.sort_by(|a, b| a.id.cmp(&b.id));

    let mut fired = false;
    for request in pending {
        if cycle.at_cap(&agent.id) {
            trace!(
                agent = %agent.id,
                request = %request.id,
                "daily cap reached, request left pending"
            );
            break;
        }
        let Some(helper) = host.profile(&agent.id) else {
            break;
        };
        let agent = &helper;
        let at_war = is_at_war(&*host, agent);
        let accept_at = cycle.threshold(Gate::Accept, agent, at_war);
        let decline_below = cycle.threshold(Gate::Decline, agent, at_war);

        let coalition = host.alliance(&agent.id, &request.requester);
        let utility = assistance_utility(&AssistanceInputs {
            helper: agent,
            request: &request,
            coalition: coalition.as_ref(),
            relation: host.relation(&agent.id, &request.requester),
            desperation: desperation(agent, at_war, &config.thresholds),
        });

        if utility >= accept_at {
            if cycle
                .memory
                .has_decision_cooldown(&agent.id, DecisionKind::AcceptRequest, cycle.now)
            {
                continue;
            }
            if !host.accept(&request.id) {
                continue;
            }
            deliver(cycle, host, agent, &request);
            if let Some(coalition) = &coalition {
                host.adjust_trust(&coalition.id, config.assistance.trust_gain);
                host.adjust_relation(&agent.id, &request.requester, config.assistance.relation_gain);
                host.append_history(
                    &coalition.id,
                    HistoryEntry::tagged(
                        cycle.now,
                        HistoryTag::Assistance,
                        format!(
                            "{} answered a request for {}",
                            agent.name,
                            request.request_type.label().replace('_', " ")
                        ),
                    ),
                );
            }
            let mut event = cycle
                .event(DecisionKind::AcceptRequest, &agent.id)
                .with_counterpart(request.requester.as_str())
                .with_request(request.id.0.as_str())
                .with_scores(utility, accept_at);
            if let Some(coalition) = &coalition {
                event = event.with_coalition(coalition.id.as_str());
            }
            cycle.fire(&agent.id, event);
            fired = true;
        } else if utility < decline_below {
            if cycle
                .memory
                .has_decision_cooldown(&agent.id, DecisionKind::DeclineRequest, cycle.now)
            {
                continue;
            }
            let reason = request.request_type.decline_reason();
            if !host.decline(&request.id, reason) {
                continue;
            }
            host.adjust_relation(
                &agent.id,
                &request.requester,
                config.assistance.decline_relation_penalty,
            );
            let event = cycle
                .event(DecisionKind::DeclineRequest, &agent.id)
                .with_counterpart(request.requester.as_str())
                .with_request(request.id.0.as_str())
                .with_scores(utility, decline_below)
                .with_detail(reason);
            cycle.fire(&agent.id, event);
            fired = true;
        } else {
            trace!(agent = %agent.id, request = %request.id, utility, "request deferred");
        }
    }
    fired
}

/// Carries out an accepted request.
fn deliver<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    helper: &AgentProfile,
    request: &Request,
) {
    match request.request_type {
        RequestType::FinancialAid => {
            let amount = request.reward.min(helper.wealth).max(0);
            host.adjust_wealth(&helper.id, -amount);
            host.adjust_wealth(&request.requester, amount);
        }
        RequestType::BattleAssistance => {
            let result = match &request.battle {
                Some(battle) => host.add_combatant(battle, &helper.id),
                None => Err(HostError::BattleUnavailable(request.id.0.clone())),
            };
            if let Err(e) = result {
                warn!(
                    agent = %helper.id,
                    request = %request.id,
                    error = %e,
                    "could not join battle, simulating assistance"
                );
                if let Some(coalition) = host.alliance(&helper.id, &request.requester) {
                    host.adjust_trust(&coalition.id, cycle.config.assistance.trust_gain);
                    host.append_history(
                        &coalition.id,
                        HistoryEntry::tagged(
                            cycle.now,
                            HistoryTag::Assistance,
                            "Answered the call to arms (simulated)",
                        ),
                    );
                }
            }
        }
        RequestType::Intelligence => {}
    }
}

/// Asks the most capable ally for gold or troops. At most one request per
/// cycle.
pub fn originate_request<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
) -> bool {
    let config = cycle.config;
    let assistance = &config.assistance;
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::RequestAid, cycle.now)
    {
        return false;
    }

    let (request_type, reward) = if agent.wealth < assistance.need_wealth_floor {
        (RequestType::FinancialAid, assistance.financial_ask)
    } else if agent.strength < assistance.need_strength_floor {
        (RequestType::BattleAssistance, assistance.battle_offer)
    } else {
        return false;
    };

    let already_asked: BTreeSet<AgentId> = host
        .sent_by(&agent.id)
        .into_iter()
        .filter(|r| r.is_pending())
        .map(|r| r.target)
        .collect();

    let allies: BTreeSet<AgentId> = host
        .alliances_for(&agent.id)
        .iter()
        .flat_map(|c| c.other_members(&agent.id).cloned().collect::<Vec<_>>())
        .filter(|ally| !already_asked.contains(ally))
        .collect();

    let best = allies
        .iter()
        .filter_map(|ally| host.profile(ally))
        .filter(|ally| !ally.eliminated)
        .map(|ally| {
            let score = match request_type {
                RequestType::FinancialAid => {
                    let warmth = (host.relation(&agent.id, &ally.id).clamp(-100, 100) + 100) as f32
                        / 200.0;
                    ally.wealth.max(0) as f32 * warmth
                }
                _ => ally.strength,
            };
            (score, ally)
        })
        .max_by(|(sa, a), (sb, b)| {
            sa.partial_cmp(sb)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.id.cmp(&a.id))
        });

    let Some((_, target)) = best else {
        trace!(agent = %agent.id, "no ally to ask for aid");
        return false;
    };

    let description = match request_type {
        RequestType::FinancialAid => format!("{} asks {} for {} gold", agent.name, target.name, reward),
        _ => format!("{} calls on {} to join the fight", agent.name, target.name),
    };
    let Some(request) = host.create(
        request_type,
        &agent.id,
        &target.id,
        &description,
        reward,
        cycle.now,
    ) else {
        return false;
    };
    let request_id = request.id.clone();
    host.add(request);

    let event = cycle
        .event(DecisionKind::RequestAid, &agent.id)
        .with_counterpart(target.id.as_str())
        .with_request(request_id.0.as_str())
        .with_detail(request_type.label());
    cycle.fire(&agent.id, event);
    true
}
