//! Decision Scheduler
//!
//! Runs one simulated day: prune expired cooldowns, select eligible agents,
//! process a bounded batch category by category, and prune old decision
//! records on weekly boundaries.

use pact_events::{DecisionCategory, DecisionEvent, SimDate, SimDuration, SimTime};
use rand::Rng;
use tracing::{info, trace};

use crate::components::{AgentId, AgentProfile};
use crate::config::EngineConfig;
use crate::host::{Host, WorldView};
use crate::systems::assistance::run_assistance;
use crate::systems::cycle::DecisionCycle;
use crate::systems::investment::try_invest;
use crate::systems::lifecycle::run_alliance;
use crate::systems::memory::{DecisionMemory, PruneStats};
use crate::systems::opportunistic::run_opportunistic;
use crate::systems::utility::{BetrayalFactors, DefaultBetrayalFactors};

/// Categories in processing order
pub const CATEGORY_ORDER: [DecisionCategory; 4] = [
    DecisionCategory::Alliance,
    DecisionCategory::Assistance,
    DecisionCategory::Investment,
    DecisionCategory::Opportunistic,
];

/// Outcome of one simulated day
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub at: SimTime,
    pub date: SimDate,
    /// Agents that passed eligibility
    pub eligible: usize,
    /// Agents processed this day, in order
    pub processed: Vec<AgentId>,
    pub events: Vec<DecisionEvent>,
    pub pruned: PruneStats,
    pub weekly_prune: bool,
}

impl CycleReport {
    pub fn decisions_for(&self, agent: &AgentId) -> impl Iterator<Item = &DecisionEvent> {
        let id = agent.as_str().to_string();
        self.events.iter().filter(move |e| e.agent_id == id)
    }
}

/// Owns the engine state that persists between days.
pub struct DecisionScheduler {
    config: EngineConfig,
    memory: DecisionMemory,
    factors: Box<dyn BetrayalFactors + Send + Sync>,
    /// Last agent processed; the next batch starts after it
    cursor: Option<AgentId>,
}

impl DecisionScheduler {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            memory: DecisionMemory::new(),
            factors: Box::new(DefaultBetrayalFactors),
            cursor: None,
        }
    }

    pub fn with_memory(mut self, memory: DecisionMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_factors(mut self, factors: Box<dyn BetrayalFactors + Send + Sync>) -> Self {
        self.factors = factors;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn memory(&self) -> &DecisionMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut DecisionMemory {
        &mut self.memory
    }

    pub fn cursor(&self) -> Option<&AgentId> {
        self.cursor.as_ref()
    }

    /// Agents that may decide at `now`, ordered by ID and rotated to start
    /// after the last agent processed. Does not mutate state.
    pub fn select_eligible<H: WorldView + ?Sized>(&self, host: &H, now: SimTime) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = host
            .agent_ids()
            .into_iter()
            .filter(|id| {
                host.profile(id).is_some_and(|p| {
                    !p.eliminated && !p.is_player && p.has_leader()
                })
            })
            .filter(|id| !self.memory.has_daily_cooldown(id, now))
            .collect();
        ids.sort();
        ids.dedup();

        if let Some(cursor) = &self.cursor {
            let start = ids.iter().position(|id| id > cursor).unwrap_or(0);
            ids.rotate_left(start);
        }
        ids
    }

    /// Runs one simulated day.
    pub fn run_day<H: Host + ?Sized, R: Rng>(
        &mut self,
        host: &mut H,
        now: SimTime,
        rng: &mut R,
    ) -> CycleReport {
        let mut pruned = PruneStats {
            cooldowns: self.memory.prune_cooldowns(now),
            ..PruneStats::default()
        };

        let eligible = self.select_eligible(&*host, now);
        let profiles: Vec<AgentProfile> = eligible.iter().filter_map(|id| host.profile(id)).collect();
        let batch: Vec<AgentId> = eligible
            .iter()
            .take(self.config.scheduler.batch_size)
            .cloned()
            .collect();

        let daily = SimDuration::from_hours(self.config.scheduler.daily_cooldown_hours);
        let mut cycle = DecisionCycle::new(&self.config, &mut self.memory, self.factors.as_ref(), now);
        for agent in &batch {
            process_agent(&mut cycle, host, agent, &profiles, rng);
            cycle.memory.start_daily_cooldown(agent, now, daily);
        }
        let events = cycle.into_events();
        if let Some(last) = batch.last() {
            self.cursor = Some(last.clone());
        }

        let interval = self.config.scheduler.prune_interval_days.max(1);
        let weekly_prune = now.day_index() % interval == 0;
        if weekly_prune {
            let retention = SimDuration::from_days(self.config.scheduler.decision_retention_days);
            let stats = self.memory.prune_decisions(now, retention);
            info!(
                records = stats.records,
                logs = stats.logs,
                "weekly decision prune"
            );
            pruned.merge(stats);
        }

        info!(
            date = %now.date(),
            eligible = eligible.len(),
            processed = batch.len(),
            decisions = events.len(),
            "cycle complete"
        );

        CycleReport {
            at: now,
            date: now.date(),
            eligible: eligible.len(),
            processed: batch,
            events,
            pruned,
            weekly_prune,
        }
    }
}

/// Runs every category for one agent until its daily cap is reached.
///
/// The agent's profile is re-read before each category so gold moved by an
/// earlier decision is seen by the next.
pub fn process_agent<H: Host + ?Sized, R: Rng>(
    cycle: &mut DecisionCycle<'_>,
    host: &mut H,
    agent: &AgentId,
    eligible: &[AgentProfile],
    rng: &mut R,
) {
    let chance = cycle.config.scheduler.opportunistic_chance;

    for category in CATEGORY_ORDER {
        if cycle.at_cap(agent) {
            trace!(agent = %agent, ?category, "daily cap reached");
            return;
        }
        let Some(profile) = host.profile(agent) else {
            return;
        };
        match category {
            DecisionCategory::Alliance => {
                run_alliance(cycle, host, &profile, eligible);
            }
            DecisionCategory::Assistance => {
                run_assistance(cycle, host, &profile);
            }
            DecisionCategory::Investment => {
                try_invest(cycle, host, &profile);
            }
            DecisionCategory::Opportunistic => {
                if rng.gen::<f64>() < chance {
                    run_opportunistic(cycle, host, &profile, rng);
                }
            }
        }
    }
}
