//! Coalition Components
//!
//! Covert alliances between clans: membership, trust, secrecy and the
//! append-only history log.

use pact_events::{CoalitionSnapshot, SimTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::AgentId;

/// Default maximum number of members in one coalition
pub const DEFAULT_MAX_MEMBERS: usize = 5;
/// Trust of a freshly formed coalition
pub const INITIAL_TRUST: f32 = 0.5;
/// Secrecy of a freshly formed coalition
pub const INITIAL_SECRECY: f32 = 1.0;

/// Unique identifier for a coalition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoalitionId(pub String);

impl CoalitionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoalitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoalitionId {
    fn from(s: &str) -> Self {
        CoalitionId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoalitionStatus {
    Active,
    Dissolved,
}

/// Category of a history entry.
///
/// Failed, Leaked and Betrayed entries feed the dissatisfaction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTag {
    Formed,
    Joined,
    Left,
    Dissolved,
    Betrayed,
    Leaked,
    Failed,
    Investment,
    Assistance,
    Battle,
    Note,
}

impl HistoryTag {
    /// Tag free text by the words it contains.
    ///
    /// "failed", "leaked" and "betrayed" win over everything else, in that
    /// order, so wording of negative entries stays load-bearing.
    pub fn classify(text: &str) -> HistoryTag {
        let lower = text.to_lowercase();
        if lower.contains("failed") {
            HistoryTag::Failed
        } else if lower.contains("leaked") {
            HistoryTag::Leaked
        } else if lower.contains("betrayed") {
            HistoryTag::Betrayed
        } else {
            HistoryTag::Note
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            HistoryTag::Failed | HistoryTag::Leaked | HistoryTag::Betrayed
        )
    }
}

/// A timestamped line in a coalition's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: SimTime,
    pub tag: HistoryTag,
    pub text: String,
}

impl HistoryEntry {
    /// Entry tagged from its wording.
    pub fn new(at: SimTime, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            at,
            tag: HistoryTag::classify(&text),
            text,
        }
    }

    /// Entry with an explicit tag. A negative classification of the text
    /// still takes precedence so scans over wording and tags agree.
    pub fn tagged(at: SimTime, tag: HistoryTag, text: impl Into<String>) -> Self {
        let text = text.into();
        let classified = HistoryTag::classify(&text);
        let tag = if classified.is_negative() { classified } else { tag };
        Self { at, tag, text }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.date(), self.text)
    }
}

/// A covert alliance between clans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coalition {
    pub id: CoalitionId,
    /// Ordered membership; the founder comes first
    pub members: Vec<AgentId>,
    pub leader: AgentId,
    pub founder: AgentId,
    /// Cooperation quality in [0, 1]
    pub trust: f32,
    /// Inverse of exposure in [0, 1]
    pub secrecy: f32,
    pub history: Vec<HistoryEntry>,
    pub status: CoalitionStatus,
    pub formed_at: SimTime,
}

impl Coalition {
    /// A new two-member coalition led by its founder.
    pub fn new(id: impl Into<String>, founder: AgentId, partner: AgentId, at: SimTime) -> Self {
        Self {
            id: CoalitionId(id.into()),
            members: vec![founder.clone(), partner],
            leader: founder.clone(),
            founder,
            trust: INITIAL_TRUST,
            secrecy: INITIAL_SECRECY,
            history: Vec::new(),
            status: CoalitionStatus::Active,
            formed_at: at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CoalitionStatus::Active
    }

    pub fn is_member(&self, agent: &AgentId) -> bool {
        self.members.contains(agent)
    }

    pub fn is_leader(&self, agent: &AgentId) -> bool {
        &self.leader == agent
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_open_slot(&self, max_members: usize) -> bool {
        self.members.len() < max_members
    }

    /// Members other than `agent`, in membership order.
    pub fn other_members<'a>(&'a self, agent: &'a AgentId) -> impl Iterator<Item = &'a AgentId> {
        self.members.iter().filter(move |m| *m != agent)
    }

    /// Number of Failed, Leaked or Betrayed history entries.
    pub fn negative_history_count(&self) -> usize {
        self.history.iter().filter(|e| e.tag.is_negative()).count()
    }

    pub fn adjust_trust(&mut self, delta: f32) {
        self.trust = (self.trust + delta).clamp(0.0, 1.0);
    }

    pub fn adjust_secrecy(&mut self, delta: f32) {
        self.secrecy = (self.secrecy + delta).clamp(0.0, 1.0);
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    pub fn add_member(&mut self, agent: AgentId) -> bool {
        if self.is_member(&agent) {
            return false;
        }
        self.members.push(agent);
        true
    }

    /// Removes a member. A departing leader hands over to the next member in
    /// order; an emptied coalition is dissolved.
    pub fn remove_member(&mut self, agent: &AgentId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != agent);
        if self.members.len() == before {
            return false;
        }
        if &self.leader == agent {
            if let Some(next) = self.members.first() {
                self.leader = next.clone();
            }
        }
        if self.members.is_empty() {
            self.status = CoalitionStatus::Dissolved;
        }
        true
    }

    pub fn dissolve(&mut self) {
        self.status = CoalitionStatus::Dissolved;
    }

    pub fn to_snapshot(&self) -> CoalitionSnapshot {
        CoalitionSnapshot {
            coalition_id: self.id.0.clone(),
            leader: self.leader.0.clone(),
            founder: self.founder.0.clone(),
            members: self.members.iter().map(|m| m.0.clone()).collect(),
            trust: self.trust,
            secrecy: self.secrecy,
            status: match self.status {
                CoalitionStatus::Active => "active".to_string(),
                CoalitionStatus::Dissolved => "dissolved".to_string(),
            },
            formed_on: self.formed_at.date(),
            history: self.history.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pact() -> Coalition {
        Coalition::new("pact_1", AgentId::from("a"), AgentId::from("b"), SimTime::start())
    }

    #[test]
    fn test_classify_negative_wording() {
        assert_eq!(HistoryTag::classify("Joint battle failed"), HistoryTag::Failed);
        assert_eq!(HistoryTag::classify("Secrets LEAKED to the court"), HistoryTag::Leaked);
        assert_eq!(HistoryTag::classify("a betrayed the alliance"), HistoryTag::Betrayed);
        assert_eq!(HistoryTag::classify("Alliance formed"), HistoryTag::Note);
    }

    #[test]
    fn test_tagged_entry_keeps_negative_wording() {
        let entry = HistoryEntry::tagged(SimTime::start(), HistoryTag::Battle, "Joint battle failed");
        assert_eq!(entry.tag, HistoryTag::Failed);
        let entry = HistoryEntry::tagged(SimTime::start(), HistoryTag::Battle, "Fought together and won");
        assert_eq!(entry.tag, HistoryTag::Battle);
    }

    #[test]
    fn test_negative_history_count() {
        let mut c = pact();
        c.record(HistoryEntry::new(SimTime::start(), "Alliance formed"));
        c.record(HistoryEntry::new(SimTime::start(), "Joint battle failed"));
        c.record(HistoryEntry::new(SimTime::start(), "Alliance secrets leaked by b"));
        assert_eq!(c.negative_history_count(), 2);
    }

    #[test]
    fn test_levels_are_clamped() {
        let mut c = pact();
        c.adjust_trust(2.0);
        c.adjust_secrecy(-3.0);
        assert_eq!(c.trust, 1.0);
        assert_eq!(c.secrecy, 0.0);
    }

    #[test]
    fn test_leader_is_always_a_member() {
        let mut c = pact();
        assert!(c.remove_member(&AgentId::from("a")));
        assert_eq!(c.leader, AgentId::from("b"));
        assert!(c.is_member(&c.leader));

        assert!(c.remove_member(&AgentId::from("b")));
        assert_eq!(c.status, CoalitionStatus::Dissolved);
        assert!(!c.remove_member(&AgentId::from("b")));
    }

    #[test]
    fn test_other_members() {
        let mut c = pact();
        c.add_member(AgentId::from("c"));
        let a = AgentId::from("a");
        let others: Vec<_> = c.other_members(&a).cloned().collect();
        assert_eq!(others, vec![AgentId::from("b"), AgentId::from("c")]);
        assert!(!c.add_member(AgentId::from("c")));
    }
}
