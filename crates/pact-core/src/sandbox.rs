//! Sandbox Host
//!
//! An in-memory implementation of every host collaborator, used by the
//! runner and the tests. It keeps clans, relations, wars, coalitions,
//! requests and battles in ordered maps so runs are reproducible.

use std::collections::{BTreeMap, BTreeSet};

use pact_events::{generate_snapshot_id, PactsSnapshot, SimDuration, SimTime};
use tracing::trace;

use crate::components::{
    AgentId, AgentProfile, Coalition, CoalitionId, FactionId, FactionPair, HistoryEntry, Request,
    RequestId, RequestStatus, RequestType, DEFAULT_MAX_MEMBERS,
};
use crate::error::HostError;
use crate::host::{
    BattleService, CoalitionStore, ExposureService, RequestStore, WorldMutator, WorldView,
};

/// Danger attached to every call to arms created by the sandbox
pub const BATTLE_RISK: f32 = 0.3;

const RELATION_MIN: i32 = -100;
const RELATION_MAX: i32 = 100;

#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    agents: BTreeMap<AgentId, AgentProfile>,
    /// Keyed by the ordered pair of agent IDs
    relations: BTreeMap<(AgentId, AgentId), i32>,
    wars: BTreeSet<FactionPair>,
    coalitions: BTreeMap<CoalitionId, Coalition>,
    requests: BTreeMap<RequestId, Request>,
    battles: BTreeMap<String, Vec<AgentId>>,
    /// Agents that turn down every proposal
    refusing: BTreeSet<AgentId>,
    leaks: Vec<(CoalitionId, SimTime)>,
    max_members: usize,
    next_coalition: u64,
    next_request: u64,
}

fn pair_key(a: &AgentId, b: &AgentId) -> (AgentId, AgentId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self {
            max_members: DEFAULT_MAX_MEMBERS,
            next_coalition: 1,
            next_request: 1,
            ..Self::default()
        }
    }

    pub fn with_max_members(mut self, max_members: usize) -> Self {
        self.max_members = max_members;
        self
    }

    pub fn add_agent(&mut self, profile: AgentProfile) {
        self.agents.insert(profile.id.clone(), profile);
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn set_relation(&mut self, a: &AgentId, b: &AgentId, value: i32) {
        if a == b {
            return;
        }
        self.relations
            .insert(pair_key(a, b), value.clamp(RELATION_MIN, RELATION_MAX));
    }

    pub fn declare_war(&mut self, a: &FactionId, b: &FactionId) {
        if a != b {
            self.wars.insert(FactionPair::new(a.clone(), b.clone()));
        }
    }

    pub fn make_peace(&mut self, a: &FactionId, b: &FactionId) {
        self.wars.remove(&FactionPair::new(a.clone(), b.clone()));
    }

    pub fn refuse_proposals_to(&mut self, agent: &AgentId) {
        self.refusing.insert(agent.clone());
    }

    pub fn allow_proposals_to(&mut self, agent: &AgentId) {
        self.refusing.remove(agent);
    }

    /// Opens a battle with `agent` as its first combatant.
    pub fn open_battle(&mut self, battle: impl Into<String>, agent: &AgentId) {
        self.battles.insert(battle.into(), vec![agent.clone()]);
    }

    pub fn combatants(&self, battle: &str) -> Vec<AgentId> {
        self.battles.get(battle).cloned().unwrap_or_default()
    }

    pub fn request(&self, id: &RequestId) -> Option<&Request> {
        self.requests.get(id)
    }

    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.requests.values()
    }

    /// Every coalition ever formed, dissolved ones included.
    pub fn coalitions(&self) -> impl Iterator<Item = &Coalition> {
        self.coalitions.values()
    }

    pub fn leaks(&self) -> &[(CoalitionId, SimTime)] {
        &self.leaks
    }

    /// Marks pending requests older than `max_age` as expired.
    pub fn expire_requests(&mut self, now: SimTime, max_age: SimDuration) -> usize {
        let mut expired = 0;
        for request in self.requests.values_mut() {
            if request.is_pending() && now.since(request.created_at) > max_age {
                request.status = RequestStatus::Expired;
                expired += 1;
            }
        }
        expired
    }

    pub fn snapshot(&self, now: SimTime, sequence: u64) -> PactsSnapshot {
        PactsSnapshot {
            snapshot_id: generate_snapshot_id(sequence),
            at: now,
            date: now.date(),
            coalitions: self.coalitions.values().map(|c| c.to_snapshot()).collect(),
        }
    }

    fn is_active_agent(&self, id: &AgentId) -> bool {
        self.agents.get(id).is_some_and(|p| !p.eliminated)
    }

    fn active_coalition_mut(&mut self, id: &CoalitionId) -> Option<&mut Coalition> {
        self.coalitions.get_mut(id).filter(|c| c.is_active())
    }
}

impl WorldView for SandboxWorld {
    fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().cloned().collect()
    }

    fn profile(&self, agent: &AgentId) -> Option<AgentProfile> {
        self.agents.get(agent).cloned()
    }

    fn relation(&self, a: &AgentId, b: &AgentId) -> i32 {
        self.relations.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    fn factions_at_war(&self, a: &FactionId, b: &FactionId) -> bool {
        self.wars.contains(&FactionPair::new(a.clone(), b.clone()))
    }

    fn hostile_factions(&self, faction: &FactionId) -> Vec<FactionId> {
        self.wars
            .iter()
            .filter_map(|pair| pair.other(faction).cloned())
            .collect()
    }
}

impl WorldMutator for SandboxWorld {
    fn adjust_wealth(&mut self, agent: &AgentId, delta: i64) {
        if let Some(profile) = self.agents.get_mut(agent) {
            profile.wealth = profile.wealth.saturating_add(delta).max(0);
        }
    }

    fn adjust_relation(&mut self, a: &AgentId, b: &AgentId, delta: i32) {
        let current = self.relation(a, b);
        self.set_relation(a, b, current.saturating_add(delta));
    }
}

impl CoalitionStore for SandboxWorld {
    fn propose_alliance(&mut self, proposer: &AgentId, partner: &AgentId, now: SimTime) -> bool {
        if proposer == partner
            || !self.is_active_agent(proposer)
            || !self.is_active_agent(partner)
            || self.refusing.contains(partner)
            || self.alliance(proposer, partner).is_some()
        {
            return false;
        }
        let id = format!("pact_{:04}", self.next_coalition);
        self.next_coalition += 1;
        let coalition = Coalition::new(id, proposer.clone(), partner.clone(), now);
        trace!(coalition = %coalition.id, %proposer, %partner, "coalition formed");
        self.coalitions.insert(coalition.id.clone(), coalition);
        true
    }

    fn join_alliance(&mut self, coalition: &CoalitionId, agent: &AgentId, _now: SimTime) -> bool {
        if !self.is_active_agent(agent) {
            return false;
        }
        let max_members = self.max_members;
        match self.active_coalition_mut(coalition) {
            Some(c) if c.has_open_slot(max_members) => c.add_member(agent.clone()),
            _ => false,
        }
    }

    fn leave_alliance(&mut self, coalition: &CoalitionId, agent: &AgentId, _now: SimTime) -> bool {
        let Some(c) = self.active_coalition_mut(coalition) else {
            return false;
        };
        if !c.remove_member(agent) {
            return false;
        }
        if c.member_count() < 2 {
            c.dissolve();
        }
        true
    }

    fn dissolve_alliance(&mut self, coalition: &CoalitionId, _now: SimTime) -> bool {
        match self.active_coalition_mut(coalition) {
            Some(c) => {
                c.dissolve();
                true
            }
            None => false,
        }
    }

    fn alliances_for(&self, agent: &AgentId) -> Vec<Coalition> {
        self.coalitions
            .values()
            .filter(|c| c.is_active() && c.is_member(agent))
            .cloned()
            .collect()
    }

    fn all_active(&self) -> Vec<Coalition> {
        self.coalitions
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect()
    }

    fn alliance(&self, a: &AgentId, b: &AgentId) -> Option<Coalition> {
        self.coalitions
            .values()
            .find(|c| c.is_active() && c.is_member(a) && c.is_member(b))
            .cloned()
    }

    fn coalition(&self, id: &CoalitionId) -> Option<Coalition> {
        self.coalitions.get(id).cloned()
    }

    fn append_history(&mut self, coalition: &CoalitionId, entry: HistoryEntry) {
        if let Some(c) = self.coalitions.get_mut(coalition) {
            c.record(entry);
        }
    }

    fn adjust_trust(&mut self, coalition: &CoalitionId, delta: f32) {
        if let Some(c) = self.coalitions.get_mut(coalition) {
            c.adjust_trust(delta);
        }
    }

    fn adjust_secrecy(&mut self, coalition: &CoalitionId, delta: f32) {
        if let Some(c) = self.coalitions.get_mut(coalition) {
            c.adjust_secrecy(delta);
        }
    }
}

impl RequestStore for SandboxWorld {
    fn pending_for(&self, agent: &AgentId) -> Vec<Request> {
        self.requests
            .values()
            .filter(|r| &r.target == agent && r.is_pending())
            .cloned()
            .collect()
    }

    fn sent_by(&self, agent: &AgentId) -> Vec<Request> {
        self.requests
            .values()
            .filter(|r| &r.requester == agent)
            .cloned()
            .collect()
    }

    fn accept(&mut self, request: &RequestId) -> bool {
        match self.requests.get_mut(request) {
            Some(r) if r.is_pending() => {
                r.status = RequestStatus::Accepted;
                true
            }
            _ => false,
        }
    }

    fn decline(&mut self, request: &RequestId, reason: &str) -> bool {
        match self.requests.get_mut(request) {
            Some(r) if r.is_pending() => {
                r.status = RequestStatus::Declined;
                r.decline_reason = Some(reason.to_string());
                true
            }
            _ => false,
        }
    }

    fn create(
        &mut self,
        request_type: RequestType,
        requester: &AgentId,
        target: &AgentId,
        description: &str,
        reward: i64,
        now: SimTime,
    ) -> Option<Request> {
        if requester == target || !self.is_active_agent(requester) || !self.is_active_agent(target)
        {
            return None;
        }
        let id = format!("req_{:05}", self.next_request);
        self.next_request += 1;
        let mut request = Request::new(
            id,
            request_type,
            requester.clone(),
            target.clone(),
            description,
            reward,
            now,
        );
        if request_type == RequestType::BattleAssistance {
            request = request.with_risk(BATTLE_RISK);
            let fighting = self
                .battles
                .iter()
                .find(|(_, combatants)| combatants.contains(requester))
                .map(|(battle, _)| battle.clone());
            if let Some(battle) = fighting {
                request = request.with_battle(battle);
            }
        }
        Some(request)
    }

    fn add(&mut self, request: Request) {
        self.requests.insert(request.id.clone(), request);
    }
}

impl ExposureService for SandboxWorld {
    fn force_leak(&mut self, coalition: &CoalitionId, now: SimTime) {
        if self.coalitions.contains_key(coalition) {
            self.leaks.push((coalition.clone(), now));
        }
    }
}

impl BattleService for SandboxWorld {
    fn add_combatant(&mut self, battle: &str, agent: &AgentId) -> Result<(), HostError> {
        if !self.is_active_agent(agent) {
            return Err(HostError::CombatantRejected(agent.to_string()));
        }
        let combatants = self
            .battles
            .get_mut(battle)
            .ok_or_else(|| HostError::BattleUnavailable(battle.to_string()))?;
        if !combatants.contains(agent) {
            combatants.push(agent.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::new().with_max_members(3);
        for id in ["a", "b", "c", "d"] {
            world.add_agent(AgentProfile::new(id, id.to_uppercase()));
        }
        world
    }

    #[test]
    fn test_relations_are_symmetric_and_clamped() {
        let mut world = world();
        let (a, b) = (AgentId::from("a"), AgentId::from("b"));
        world.set_relation(&a, &b, 90);
        world.adjust_relation(&b, &a, 30);
        assert_eq!(world.relation(&a, &b), 100);
        assert_eq!(world.relation(&b, &a), 100);
    }

    #[test]
    fn test_wars_are_symmetric() {
        let mut world = world();
        let (v, s) = (FactionId::from("vlandia"), FactionId::from("sturgia"));
        world.declare_war(&v, &s);
        assert!(world.factions_at_war(&s, &v));
        assert_eq!(world.hostile_factions(&v), vec![s.clone()]);
        world.make_peace(&s, &v);
        assert!(world.hostile_factions(&v).is_empty());
    }

    #[test]
    fn test_membership_limits() {
        let mut world = world();
        let ids: Vec<AgentId> = ["a", "b", "c", "d"].iter().map(|s| AgentId::from(*s)).collect();
        let now = SimTime::start();
        assert!(world.propose_alliance(&ids[0], &ids[1], now));
        assert!(!world.propose_alliance(&ids[1], &ids[0], now));

        let id = world.alliance(&ids[0], &ids[1]).unwrap().id;
        assert!(world.join_alliance(&id, &ids[2], now));
        assert!(!world.join_alliance(&id, &ids[3], now));
        assert_eq!(world.alliances_for(&ids[2]).len(), 1);
    }

    #[test]
    fn test_coalition_below_two_members_dissolves() {
        let mut world = world();
        let (a, b) = (AgentId::from("a"), AgentId::from("b"));
        let now = SimTime::start();
        assert!(world.propose_alliance(&a, &b, now));
        let id = world.alliance(&a, &b).unwrap().id;

        assert!(world.leave_alliance(&id, &b, now));
        assert!(!world.coalition(&id).unwrap().is_active());
        assert!(world.all_active().is_empty());
        assert!(!world.leave_alliance(&id, &a, now));
    }

    #[test]
    fn test_request_lifecycle() {
        let mut world = world();
        let (a, b) = (AgentId::from("a"), AgentId::from("b"));
        let now = SimTime::start();
        assert!(world
            .create(RequestType::FinancialAid, &a, &a, "self", 10, now)
            .is_none());

        let request = world
            .create(RequestType::FinancialAid, &a, &b, "gold", 10, now)
            .unwrap();
        let id = request.id.clone();
        world.add(request);
        assert_eq!(world.pending_for(&b).len(), 1);
        assert_eq!(world.sent_by(&a).len(), 1);

        assert!(world.decline(&id, "no"));
        assert!(!world.accept(&id));
        assert!(world.pending_for(&b).is_empty());
        assert_eq!(world.request(&id).unwrap().decline_reason.as_deref(), Some("no"));
    }

    #[test]
    fn test_stale_requests_expire() {
        let mut world = world();
        let (a, b) = (AgentId::from("a"), AgentId::from("b"));
        let request = world
            .create(RequestType::Intelligence, &a, &b, "news", 0, SimTime::start())
            .unwrap();
        world.add(request);

        let later = SimTime::start().days_from_now(10);
        assert_eq!(world.expire_requests(later, SimDuration::from_days(7)), 1);
        assert!(world.pending_for(&b).is_empty());
    }

    #[test]
    fn test_add_combatant_errors() {
        let mut world = world();
        let a = AgentId::from("a");
        assert!(matches!(
            world.add_combatant("nowhere", &a),
            Err(HostError::BattleUnavailable(_))
        ));
        world.open_battle("field", &AgentId::from("b"));
        assert!(world.add_combatant("field", &a).is_ok());
        assert!(matches!(
            world.add_combatant("field", &AgentId::from("ghost")),
            Err(HostError::CombatantRejected(_))
        ));
    }
}
