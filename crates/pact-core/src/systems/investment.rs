//! Investment Decisions
//!
//! Wealthy members buy back secrecy for the coalition that needs it most.

use std::cmp::Ordering;

use pact_events::DecisionKind;
use tracing::trace;

use crate::components::{AgentProfile, HistoryEntry, HistoryTag};
use crate::host::Host;
use crate::systems::cycle::{is_at_war, DecisionCycle};
use crate::systems::utility::{investment_utility, Gate};

/// Spends gold on the coalition with the best investment utility. At most
/// one investment per cycle.
pub fn try_invest<H: Host + ?Sized>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentProfile,
) -> bool {
    let config = cycle.config;
    let investment = &config.investment;
    if agent.wealth < investment.min_wealth {
        return false;
    }
    if cycle
        .memory
        .has_decision_cooldown(&agent.id, DecisionKind::InvestSecrecy, cycle.now)
    {
        return false;
    }

    let best = host
        .alliances_for(&agent.id)
        .into_iter()
        .map(|c| {
            (
                investment_utility(c.secrecy, agent.wealth, investment.cost),
                c,
            )
        })
        .max_by(|(ua, a), (ub, b)| {
            ua.partial_cmp(ub)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.id.cmp(&a.id))
        });
    let Some((utility, coalition)) = best else {
        return false;
    };

    let threshold = cycle.threshold(Gate::Investment, agent, is_at_war(&*host, agent));
    if utility < threshold {
        trace!(agent = %agent.id, coalition = %coalition.id, utility, threshold, "investment not worth it");
        return false;
    }

    host.adjust_wealth(&agent.id, -investment.cost);
    host.adjust_secrecy(&coalition.id, investment.secrecy_gain);
    host.append_history(
        &coalition.id,
        HistoryEntry::tagged(
            cycle.now,
            HistoryTag::Investment,
            format!("{} invested in secrecy", agent.name),
        ),
    );

    let event = cycle
        .event(DecisionKind::InvestSecrecy, &agent.id)
        .with_coalition(coalition.id.as_str())
        .with_scores(utility, threshold)
        .with_detail(format!("spent {} gold", investment.cost));
    cycle.fire(&agent.id, event);
    true
}
