//! Assistance and investment utilities.

use crate::components::{AgentProfile, Coalition, Request, RequestType};

/// Assistance term weights
pub mod weights {
    pub const TRUST: f32 = 30.0;
    /// Flat obligation of a fellow member
    pub const MEMBERSHIP: f32 = 10.0;
    pub const RELATION: f32 = 20.0;
    /// Capability term ceiling for gold and troops
    pub const CAPABILITY: f32 = 20.0;
    /// Helper wealth, in multiples of the ask, that makes aid painless
    pub const COMFORT_MULTIPLE: f32 = 3.0;
    pub const VALOR: f32 = 3.0;
    pub const INTELLIGENCE: f32 = 10.0;
    pub const REWARD: f32 = 15.0;
    /// Payment at which the reward term saturates
    pub const REWARD_REFERENCE: f32 = 1000.0;
    pub const HONOR: f32 = 5.0;
    pub const GENEROSITY: f32 = 3.0;
    pub const DESPERATION: f32 = 20.0;
    /// Investment cost multiple at which the agent can comfortably pay
    pub const INVESTMENT_COMFORT_MULTIPLE: f32 = 5.0;
}

/// Inputs for scoring one pending request from the helper's side
#[derive(Debug, Clone)]
pub struct AssistanceInputs<'a> {
    pub helper: &'a AgentProfile,
    pub request: &'a Request,
    /// Coalition shared with the requester; `None` for unsolicited requests
    pub coalition: Option<&'a Coalition>,
    pub relation: i32,
    /// The helper's own desperation in [0, 1]
    pub desperation: f32,
}

/// Willingness to grant a request, 0 to 100. Never negative.
pub fn assistance_utility(inputs: &AssistanceInputs<'_>) -> f32 {
    let helper = inputs.helper;
    let request = inputs.request;
    let mut score = 0.0;

    if let Some(coalition) = inputs.coalition {
        score += coalition.trust.clamp(0.0, 1.0) * weights::TRUST;
        score += weights::MEMBERSHIP;
        score += weights::HONOR * helper.traits.honor as f32;
    }

    score += inputs.relation.clamp(-100, 100) as f32 / 100.0 * weights::RELATION;

    score += match request.request_type {
        RequestType::FinancialAid => {
            let affordability = if request.reward <= 0 {
                1.0
            } else {
                (helper.wealth.max(0) as f32 / (weights::COMFORT_MULTIPLE * request.reward as f32))
                    .min(1.0)
            };
            weights::CAPABILITY * affordability
                + weights::GENEROSITY * helper.traits.generosity as f32
        }
        RequestType::BattleAssistance => {
            weights::CAPABILITY * (1.0 - request.risk.clamp(0.0, 1.0))
                + weights::VALOR * helper.traits.valor as f32
        }
        RequestType::Intelligence => weights::INTELLIGENCE,
    };

    // a financial ask costs the helper; only payments offered attract
    if request.request_type != RequestType::FinancialAid {
        score += (request.reward.max(0) as f32 / weights::REWARD_REFERENCE).min(1.0)
            * weights::REWARD;
    }

    score -= weights::DESPERATION * inputs.desperation.clamp(0.0, 1.0);
    score.clamp(0.0, 100.0)
}

/// Value of buying back a coalition's secrecy, 0 to 100.
pub fn investment_utility(secrecy: f32, wealth: i64, cost: i64) -> f32 {
    let affordability = if cost <= 0 {
        1.0
    } else {
        (wealth.max(0) as f32 / (weights::INVESTMENT_COMFORT_MULTIPLE * cost as f32)).min(1.0)
    };
    (1.0 - secrecy.clamp(0.0, 1.0)) * 100.0 * affordability
}
