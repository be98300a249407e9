//! Request Components
//!
//! Directed mutual-aid asks between clans.

use pact_events::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::AgentId;

/// Unique identifier for a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Gold tribute; `reward` is the sum asked for
    FinancialAid,
    /// Join a battle on the requester's side; `reward` is the payment offered
    BattleAssistance,
    /// Share what is known about a rival; `reward` is the payment offered
    Intelligence,
}

impl RequestType {
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::FinancialAid => "financial_aid",
            RequestType::BattleAssistance => "battle_assistance",
            RequestType::Intelligence => "intelligence",
        }
    }

    /// Canned reason given when the request is declined.
    pub fn decline_reason(&self) -> &'static str {
        match self {
            RequestType::FinancialAid => "Our coffers cannot bear another burden this season",
            RequestType::BattleAssistance => "Our warriors are needed closer to home",
            RequestType::Intelligence => "Some things are better left unsaid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

/// A mutual-aid ask from one clan to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub request_type: RequestType,
    pub requester: AgentId,
    pub target: AgentId,
    pub description: String,
    /// Gold involved; see [`RequestType`] for its meaning per type
    pub reward: i64,
    /// Danger to the helper in [0, 1]
    pub risk: f32,
    /// Host battle the requester is fighting, for battle assistance
    pub battle: Option<String>,
    pub created_at: SimTime,
    pub status: RequestStatus,
    pub decline_reason: Option<String>,
}

impl Request {
    pub fn new(
        id: impl Into<String>,
        request_type: RequestType,
        requester: AgentId,
        target: AgentId,
        description: impl Into<String>,
        reward: i64,
        created_at: SimTime,
    ) -> Self {
        Self {
            id: RequestId(id.into()),
            request_type,
            requester,
            target,
            description: description.into(),
            reward,
            risk: 0.0,
            battle: None,
            created_at,
            status: RequestStatus::Pending,
            decline_reason: None,
        }
    }

    pub fn with_risk(mut self, risk: f32) -> Self {
        self.risk = risk.clamp(0.0, 1.0);
        self
    }

    pub fn with_battle(mut self, battle: impl Into<String>) -> Self {
        self.battle = Some(battle.into());
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
