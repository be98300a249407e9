//! Host Collaborators
//!
//! The engine reads the world and mutates it only through these traits.
//! A game integration implements them over its own entity graph and stores;
//! [`crate::sandbox::SandboxWorld`] implements them in memory.
//!
//! Every call is synchronous. Refusals come back as `false`/`None` and are
//! treated as no-ops by the engine.

use pact_events::SimTime;

use crate::components::{
    AgentId, AgentProfile, Coalition, CoalitionId, FactionId, HistoryEntry, Request, RequestId,
    RequestType,
};
use crate::error::HostError;

/// Read access to clans, relations and wars.
pub trait WorldView {
    /// All agent IDs known to the host.
    fn agent_ids(&self) -> Vec<AgentId>;

    fn profile(&self, agent: &AgentId) -> Option<AgentProfile>;

    /// Leader-to-leader relation in [-100, 100].
    fn relation(&self, a: &AgentId, b: &AgentId) -> i32;

    fn factions_at_war(&self, a: &FactionId, b: &FactionId) -> bool;

    /// Factions currently at war with `faction`.
    fn hostile_factions(&self, faction: &FactionId) -> Vec<FactionId>;
}

/// Mutations the engine may request on host entities.
pub trait WorldMutator {
    fn adjust_wealth(&mut self, agent: &AgentId, delta: i64);

    fn adjust_relation(&mut self, a: &AgentId, b: &AgentId, delta: i32);
}

/// Alliance membership store.
pub trait CoalitionStore {
    /// Forms a new coalition led by `proposer`. False when refused.
    fn propose_alliance(&mut self, proposer: &AgentId, partner: &AgentId, now: SimTime) -> bool;

    fn join_alliance(&mut self, coalition: &CoalitionId, agent: &AgentId, now: SimTime) -> bool;

    fn leave_alliance(&mut self, coalition: &CoalitionId, agent: &AgentId, now: SimTime) -> bool;

    fn dissolve_alliance(&mut self, coalition: &CoalitionId, now: SimTime) -> bool;

    /// Active coalitions `agent` belongs to.
    fn alliances_for(&self, agent: &AgentId) -> Vec<Coalition>;

    fn all_active(&self) -> Vec<Coalition>;

    /// The active coalition shared by `a` and `b`, if any.
    fn alliance(&self, a: &AgentId, b: &AgentId) -> Option<Coalition>;

    fn coalition(&self, id: &CoalitionId) -> Option<Coalition>;

    fn append_history(&mut self, coalition: &CoalitionId, entry: HistoryEntry);

    fn adjust_trust(&mut self, coalition: &CoalitionId, delta: f32);

    fn adjust_secrecy(&mut self, coalition: &CoalitionId, delta: f32);
}

/// Request inbox/outbox store.
pub trait RequestStore {
    fn pending_for(&self, agent: &AgentId) -> Vec<Request>;

    fn sent_by(&self, agent: &AgentId) -> Vec<Request>;

    fn accept(&mut self, request: &RequestId) -> bool;

    fn decline(&mut self, request: &RequestId, reason: &str) -> bool;

    /// Builds a request with a store-assigned ID; `None` when refused.
    fn create(
        &mut self,
        request_type: RequestType,
        requester: &AgentId,
        target: &AgentId,
        description: &str,
        reward: i64,
        now: SimTime,
    ) -> Option<Request>;

    /// Delivers a request to its target's inbox.
    fn add(&mut self, request: Request);
}

/// Leak/exposure subsystem.
pub trait ExposureService {
    fn force_leak(&mut self, coalition: &CoalitionId, now: SimTime);
}

/// Battle resolver capability used when answering a call to arms.
pub trait BattleService {
    fn add_combatant(&mut self, battle: &str, agent: &AgentId) -> Result<(), HostError>;
}

/// Everything the decision engine needs from its host.
pub trait Host:
    WorldView + WorldMutator + CoalitionStore + RequestStore + ExposureService + BattleService
{
}

impl<T> Host for T where
    T: WorldView + WorldMutator + CoalitionStore + RequestStore + ExposureService + BattleService
{
}
