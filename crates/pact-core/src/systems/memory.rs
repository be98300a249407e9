//! Decision Memory
//!
//! Cooldown expirations and per-agent logs of recent decisions. The scheduler
//! consults it for eligibility and the daily cap; every fired decision is
//! recorded here. Persisted through [`MemorySnapshot`] as JSON.

use pact_events::{DecisionKind, MemorySnapshot, SimDuration, SimTime, DAYS_PER_YEAR};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::components::AgentId;
use crate::config::CapScope;
use crate::error::{ParseRecordError, PersistenceError};

const DAILY_PREFIX: &str = "daily:";

/// One recorded decision, stored as `year_dayOfYear_label`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub year: u32,
    pub day_of_year: u32,
    pub label: String,
}

impl DecisionRecord {
    pub fn new(at: SimTime, kind: DecisionKind) -> Self {
        Self {
            year: at.year(),
            day_of_year: at.day_of_year(),
            label: kind.label().to_string(),
        }
    }

    /// Zero-based absolute day the record was made on
    pub fn day_index(&self) -> u64 {
        self.year.saturating_sub(1) as u64 * DAYS_PER_YEAR as u64
            + self.day_of_year.saturating_sub(1) as u64
    }

    pub fn kind(&self) -> Option<DecisionKind> {
        DecisionKind::from_label(&self.label)
    }
}

impl fmt::Display for DecisionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.year, self.day_of_year, self.label)
    }
}

impl FromStr for DecisionRecord {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '_');
        let (Some(year), Some(day), Some(label)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseRecordError::Format(s.to_string()));
        };
        if label.is_empty() {
            return Err(ParseRecordError::Format(s.to_string()));
        }
        let year = year
            .parse()
            .map_err(|_| ParseRecordError::Year(s.to_string()))?;
        let day_of_year: u32 = day
            .parse()
            .map_err(|_| ParseRecordError::Day(s.to_string()))?;
        if day_of_year == 0 || day_of_year > DAYS_PER_YEAR {
            return Err(ParseRecordError::Day(s.to_string()));
        }
        Ok(Self {
            year,
            day_of_year,
            label: label.to_string(),
        })
    }
}

/// Key of a cooldown entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CooldownKey {
    /// Blocks every decision of the agent; `daily:<agent>`
    Daily(AgentId),
    /// Blocks one decision label; `<agent>:<label>`
    Decision(AgentId, String),
}

impl CooldownKey {
    pub fn decision(agent: &AgentId, kind: DecisionKind) -> Self {
        CooldownKey::Decision(agent.clone(), kind.label().to_string())
    }

    pub fn agent(&self) -> &AgentId {
        match self {
            CooldownKey::Daily(agent) | CooldownKey::Decision(agent, _) => agent,
        }
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CooldownKey::Daily(agent) => write!(f, "{}{}", DAILY_PREFIX, agent),
            CooldownKey::Decision(agent, label) => write!(f, "{}:{}", agent, label),
        }
    }
}

impl FromStr for CooldownKey {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(agent) = s.strip_prefix(DAILY_PREFIX) {
            if agent.is_empty() {
                return Err(PersistenceError::CooldownKey(s.to_string()));
            }
            return Ok(CooldownKey::Daily(AgentId::from(agent)));
        }
        match s.rsplit_once(':') {
            Some((agent, label)) if !agent.is_empty() && !label.is_empty() => Ok(
                CooldownKey::Decision(AgentId::from(agent), label.to_string()),
            ),
            _ => Err(PersistenceError::CooldownKey(s.to_string())),
        }
    }
}

/// What a prune pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub cooldowns: usize,
    pub records: usize,
    /// Agent logs dropped because they became empty
    pub logs: usize,
}

impl PruneStats {
    pub fn total(&self) -> usize {
        self.cooldowns + self.records + self.logs
    }

    pub fn merge(&mut self, other: PruneStats) {
        self.cooldowns += other.cooldowns;
        self.records += other.records;
        self.logs += other.logs;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionMemory {
    cooldowns: BTreeMap<CooldownKey, SimTime>,
    decisions: BTreeMap<AgentId, Vec<DecisionRecord>>,
}

impl DecisionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active iff the expiry lies strictly after `now`.
    pub fn is_on_cooldown(&self, key: &CooldownKey, now: SimTime) -> bool {
        self.cooldowns.get(key).is_some_and(|expiry| *expiry > now)
    }

    pub fn has_daily_cooldown(&self, agent: &AgentId, now: SimTime) -> bool {
        self.is_on_cooldown(&CooldownKey::Daily(agent.clone()), now)
    }

    pub fn has_decision_cooldown(&self, agent: &AgentId, kind: DecisionKind, now: SimTime) -> bool {
        self.is_on_cooldown(&CooldownKey::decision(agent, kind), now)
    }

    pub fn set_cooldown(&mut self, key: CooldownKey, expiry: SimTime) {
        self.cooldowns.insert(key, expiry);
    }

    pub fn start_daily_cooldown(&mut self, agent: &AgentId, now: SimTime, length: SimDuration) {
        self.set_cooldown(CooldownKey::Daily(agent.clone()), now + length);
    }

    /// Zero-length cooldowns are not stored.
    pub fn start_decision_cooldown(
        &mut self,
        agent: &AgentId,
        kind: DecisionKind,
        now: SimTime,
        length: SimDuration,
    ) {
        if length == SimDuration::ZERO {
            return;
        }
        self.set_cooldown(CooldownKey::decision(agent, kind), now + length);
    }

    pub fn cooldown_expiry(&self, key: &CooldownKey) -> Option<SimTime> {
        self.cooldowns.get(key).copied()
    }

    pub fn cooldown_count(&self) -> usize {
        self.cooldowns.len()
    }

    pub fn record(&mut self, agent: &AgentId, kind: DecisionKind, at: SimTime) {
        self.decisions
            .entry(agent.clone())
            .or_default()
            .push(DecisionRecord::new(at, kind));
    }

    pub fn records_for(&self, agent: &AgentId) -> &[DecisionRecord] {
        self.decisions
            .get(agent)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_log(&self, agent: &AgentId) -> bool {
        self.decisions.contains_key(agent)
    }

    /// Records that count toward the daily cap at `now`.
    pub fn cap_count(&self, agent: &AgentId, now: SimTime, scope: CapScope) -> usize {
        let (year, day) = (now.year(), now.day_of_year());
        self.records_for(agent)
            .iter()
            .filter(|r| match scope {
                CapScope::SameYear => r.year == year,
                CapScope::SameDay => r.year == year && r.day_of_year == day,
            })
            .count()
    }

    /// Removes cooldowns whose expiry lies strictly before `now`.
    pub fn prune_cooldowns(&mut self, now: SimTime) -> usize {
        let before = self.cooldowns.len();
        self.cooldowns.retain(|_, expiry| *expiry >= now);
        before - self.cooldowns.len()
    }

    /// Removes records older than `retention` and drops emptied logs.
    pub fn prune_decisions(&mut self, now: SimTime, retention: SimDuration) -> PruneStats {
        let today = now.day_index();
        let keep_days = retention.whole_days();
        let mut stats = PruneStats::default();

        for records in self.decisions.values_mut() {
            let before = records.len();
            records.retain(|r| today.saturating_sub(r.day_index()) <= keep_days);
            stats.records += before - records.len();
        }

        let before = self.decisions.len();
        self.decisions.retain(|_, records| !records.is_empty());
        stats.logs = before - self.decisions.len();
        stats
    }

    pub fn to_snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            cooldowns: self
                .cooldowns
                .iter()
                .map(|(key, expiry)| (key.to_string(), *expiry))
                .collect(),
            decisions: self
                .decisions
                .iter()
                .map(|(agent, records)| {
                    (
                        agent.0.clone(),
                        records.iter().map(|r| r.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: &MemorySnapshot) -> Result<Self, PersistenceError> {
        let mut memory = Self::new();
        for (key, expiry) in &snapshot.cooldowns {
            memory.cooldowns.insert(key.parse()?, *expiry);
        }
        for (agent, records) in &snapshot.decisions {
            let parsed = records
                .iter()
                .map(|r| r.parse::<DecisionRecord>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| PersistenceError::Record {
                    agent: agent.clone(),
                    source,
                })?;
            memory.decisions.insert(AgentId::from(agent.as_str()), parsed);
        }
        Ok(memory)
    }

    /// Writes the memory as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.to_snapshot())?;
        fs::write(path.as_ref(), json)?;
        debug!(
            path = %path.as_ref().display(),
            cooldowns = self.cooldowns.len(),
            agents = self.decisions.len(),
            "saved decision memory"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path)?;
        let snapshot: MemorySnapshot = serde_json::from_str(&json)?;
        Self::from_snapshot(&snapshot)
    }
}
