//! Per-day decision context shared by the category handlers.

use pact_events::{DecisionEvent, DecisionKind, SimTime};
use tracing::debug;

use crate::components::{AgentId, AgentProfile};
use crate::config::EngineConfig;
use crate::host::WorldView;
use crate::systems::memory::DecisionMemory;
use crate::systems::utility::{adjusted_threshold, BetrayalFactors, Gate};

/// Borrowed engine state for one simulated day.
///
/// Every fired decision goes through [`DecisionCycle::fire`], which records
/// it in memory, starts its cooldown and queues the event.
pub struct DecisionCycle<'a> {
    pub config: &'a EngineConfig,
    pub memory: &'a mut DecisionMemory,
    pub factors: &'a dyn BetrayalFactors,
    pub now: SimTime,
    events: Vec<DecisionEvent>,
}

impl<'a> DecisionCycle<'a> {
    pub fn new(
        config: &'a EngineConfig,
        memory: &'a mut DecisionMemory,
        factors: &'a dyn BetrayalFactors,
        now: SimTime,
    ) -> Self {
        Self {
            config,
            memory,
            factors,
            now,
            events: Vec::new(),
        }
    }

    pub fn fire(&mut self, agent: &AgentId, event: DecisionEvent) {
        let kind = event.kind;
        self.memory.record(agent, kind, self.now);
        self.memory.start_decision_cooldown(
            agent,
            kind,
            self.now,
            self.config.cooldowns.duration(kind),
        );
        debug!(
            agent = %agent,
            decision = kind.label(),
            coalition = ?event.coalition_id,
            counterpart = ?event.counterpart,
            utility = ?event.utility,
            threshold = ?event.threshold,
            "decision fired"
        );
        self.events.push(event);
    }

    /// Starts a decision event stamped with the cycle's time.
    pub fn event(&self, kind: DecisionKind, agent: &AgentId) -> DecisionEvent {
        DecisionEvent::new(kind, agent.as_str(), self.now)
    }

    pub fn threshold(&self, gate: Gate, agent: &AgentProfile, at_war: bool) -> f32 {
        adjusted_threshold(gate, agent, at_war, &self.config.thresholds)
    }

    /// True once the agent has used its daily decision allowance.
    pub fn at_cap(&self, agent: &AgentId) -> bool {
        let scheduler = &self.config.scheduler;
        self.memory.cap_count(agent, self.now, scheduler.cap_scope) >= scheduler.daily_cap
    }

    /// Events fired so far this cycle.
    pub fn events(&self) -> &[DecisionEvent] {
        &self.events
    }

    pub fn fired_count(&self) -> usize {
        self.events.len()
    }

    pub fn into_events(self) -> Vec<DecisionEvent> {
        self.events
    }
}

/// True when the agent's faction has any enemy.
pub fn is_at_war<H: WorldView + ?Sized>(host: &H, agent: &AgentProfile) -> bool {
    agent
        .faction
        .as_ref()
        .is_some_and(|f| !host.hostile_factions(f).is_empty())
}

/// Number of factions at war with the agent's faction.
pub fn hostile_count<H: WorldView + ?Sized>(host: &H, agent: &AgentProfile) -> usize {
    agent
        .faction
        .as_ref()
        .map(|f| host.hostile_factions(f).len())
        .unwrap_or(0)
}
