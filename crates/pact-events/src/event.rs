//! Decision Event Types
//!
//! Every decision the engine takes is emitted as a [`DecisionEvent`], one JSON
//! object per line in the run's event log.

use serde::{Deserialize, Serialize};

use crate::{SimDate, SimTime};

/// Generates a decision event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("dec_{:08}", sequence)
}

/// Scheduler category a decision belongs to, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    Alliance,
    Assistance,
    Investment,
    Opportunistic,
}

/// Every decision the engine can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    ProposeAlliance,
    JoinAlliance,
    LeaveAlliance,
    DissolveAlliance,
    BetrayAlliance,
    LeakAlliance,
    AcceptRequest,
    DeclineRequest,
    RequestAid,
    InvestSecrecy,
}

impl DecisionKind {
    /// Label used in decision records and cooldown keys.
    pub fn label(&self) -> &'static str {
        match self {
            DecisionKind::ProposeAlliance => "propose_alliance",
            DecisionKind::JoinAlliance => "join_alliance",
            DecisionKind::LeaveAlliance => "leave_alliance",
            DecisionKind::DissolveAlliance => "dissolve_alliance",
            DecisionKind::BetrayAlliance => "betray_alliance",
            DecisionKind::LeakAlliance => "leak_alliance",
            DecisionKind::AcceptRequest => "accept_request",
            DecisionKind::DeclineRequest => "decline_request",
            DecisionKind::RequestAid => "request_aid",
            DecisionKind::InvestSecrecy => "invest_secrecy",
        }
    }

    /// Inverse of [`DecisionKind::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.label() == label)
    }

    pub fn category(&self) -> DecisionCategory {
        match self {
            DecisionKind::ProposeAlliance
            | DecisionKind::JoinAlliance
            | DecisionKind::LeaveAlliance
            | DecisionKind::DissolveAlliance => DecisionCategory::Alliance,
            DecisionKind::AcceptRequest | DecisionKind::DeclineRequest | DecisionKind::RequestAid => {
                DecisionCategory::Assistance
            }
            DecisionKind::InvestSecrecy => DecisionCategory::Investment,
            DecisionKind::BetrayAlliance | DecisionKind::LeakAlliance => {
                DecisionCategory::Opportunistic
            }
        }
    }

    /// Returns all decision kinds.
    pub fn all() -> &'static [DecisionKind] {
        &[
            DecisionKind::ProposeAlliance,
            DecisionKind::JoinAlliance,
            DecisionKind::LeaveAlliance,
            DecisionKind::DissolveAlliance,
            DecisionKind::BetrayAlliance,
            DecisionKind::LeakAlliance,
            DecisionKind::AcceptRequest,
            DecisionKind::DeclineRequest,
            DecisionKind::RequestAid,
            DecisionKind::InvestSecrecy,
        ]
    }
}

/// A single decision taken by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub event_id: String,
    pub at: SimTime,
    pub date: SimDate,
    pub kind: DecisionKind,
    /// Agent that took the decision
    pub agent_id: String,
    /// Other agent involved (proposal partner, requester, beneficiary)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coalition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DecisionEvent {
    /// Creates an event with no ID; the logger assigns one on write.
    pub fn new(kind: DecisionKind, agent_id: impl Into<String>, at: SimTime) -> Self {
        Self {
            event_id: String::new(),
            at,
            date: at.date(),
            kind,
            agent_id: agent_id.into(),
            counterpart: None,
            coalition_id: None,
            request_id: None,
            utility: None,
            threshold: None,
            detail: None,
        }
    }

    pub fn with_counterpart(mut self, counterpart: impl Into<String>) -> Self {
        self.counterpart = Some(counterpart.into());
        self
    }

    pub fn with_coalition(mut self, coalition_id: impl Into<String>) -> Self {
        self.coalition_id = Some(coalition_id.into());
        self
    }

    pub fn with_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attaches the utility that fired the decision and the threshold it cleared.
    pub fn with_scores(mut self, utility: f32, threshold: f32) -> Self {
        self.utility = Some(utility);
        self.threshold = Some(threshold);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn category(&self) -> DecisionCategory {
        self.kind.category()
    }

    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Season;

    #[test]
    fn test_label_roundtrip() {
        for kind in DecisionKind::all() {
            assert_eq!(DecisionKind::from_label(kind.label()), Some(*kind));
        }
        assert_eq!(DecisionKind::from_label("conquer_world"), None);
    }

    #[test]
    fn test_categories_follow_processing_order() {
        assert!(DecisionCategory::Alliance < DecisionCategory::Assistance);
        assert!(DecisionCategory::Investment < DecisionCategory::Opportunistic);
        assert_eq!(DecisionKind::BetrayAlliance.category(), DecisionCategory::Opportunistic);
        assert_eq!(DecisionKind::RequestAid.category(), DecisionCategory::Assistance);
    }

    #[test]
    fn test_event_jsonl_skips_empty_fields() {
        let at = SimTime::from_date(SimDate::new(1, Season::Spring, 3));
        let event = DecisionEvent::new(DecisionKind::LeaveAlliance, "clan_0001", at)
            .with_coalition("pact_0002");
        let json = event.to_jsonl().unwrap();

        assert!(json.contains(r#""kind":"leave_alliance""#));
        assert!(json.contains(r#""date":"year_1.spring.day_3""#));
        assert!(!json.contains("counterpart"));

        let parsed = DecisionEvent::from_jsonl(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
