//! Betrayal Utility
//!
//! Betrayal sums five bounded sub-scores. Each lives on [`BetrayalFactors`]
//! as a default method so a host can swap one factor without touching the
//! composite:
//!
//! | factor           | range     |
//! |------------------|-----------|
//! | opportunity      | 0..30     |
//! | power imbalance  | 0..25     |
//! | political shift  | -20..25   |
//! | alliance burden  | 0..20     |
//! | external pressure| 0..20     |

use crate::components::AgentProfile;

/// Sub-score ceilings
pub mod limits {
    pub const OPPORTUNITY: f32 = 30.0;
    pub const POWER_IMBALANCE: f32 = 25.0;
    pub const POLITICAL_GAIN: f32 = 25.0;
    pub const POLITICAL_LOSS: f32 = 20.0;
    pub const BURDEN: f32 = 20.0;
    pub const PRESSURE: f32 = 20.0;
}

/// Everything the factors may look at for one
/// (agent, betrayed member, beneficiary) combination.
#[derive(Debug, Clone)]
pub struct BetrayalContext<'a> {
    pub agent: &'a AgentProfile,
    /// Coalition member being betrayed
    pub target: &'a AgentProfile,
    /// Outsider the agent defects to
    pub beneficiary: &'a AgentProfile,
    pub relation_to_target: i32,
    pub relation_to_beneficiary: i32,
    /// The agent's dissatisfaction with the coalition
    pub dissatisfaction: f32,
    /// The agent's threat level in [0, 1]
    pub threat: f32,
    /// Wealth at which the beneficiary's purse counts in full
    pub reference_wealth: f32,
}

pub trait BetrayalFactors {
    /// What the beneficiary can pay for the defection.
    fn opportunity(&self, ctx: &BetrayalContext<'_>) -> f32 {
        if ctx.reference_wealth <= 0.0 {
            return 0.0;
        }
        let purse = (ctx.beneficiary.wealth.max(0) as f32 / ctx.reference_wealth).min(1.0);
        limits::OPPORTUNITY * purse
    }

    /// How much stronger the beneficiary is than the betrayed member.
    fn power_imbalance(&self, ctx: &BetrayalContext<'_>) -> f32 {
        let beneficiary = ctx.beneficiary.strength.max(0.0);
        if beneficiary <= 0.0 {
            return 0.0;
        }
        let edge = ((beneficiary - ctx.target.strength.max(0.0)) / beneficiary).clamp(0.0, 1.0);
        limits::POWER_IMBALANCE * edge
    }

    /// Warmer ties to the beneficiary than to the member pull toward
    /// defection; colder ones push back.
    fn political_shift(&self, ctx: &BetrayalContext<'_>) -> f32 {
        let diff = (ctx.relation_to_beneficiary - ctx.relation_to_target) as f32 / 200.0;
        let diff = diff.clamp(-1.0, 1.0);
        if diff >= 0.0 {
            limits::POLITICAL_GAIN * diff
        } else {
            limits::POLITICAL_LOSS * diff
        }
    }

    fn alliance_burden(&self, ctx: &BetrayalContext<'_>) -> f32 {
        limits::BURDEN * (ctx.dissatisfaction / 100.0).clamp(0.0, 1.0)
    }

    fn external_pressure(&self, ctx: &BetrayalContext<'_>) -> f32 {
        limits::PRESSURE * ctx.threat.clamp(0.0, 1.0)
    }

    /// Composite betrayal utility; 0 to 120.
    fn score(&self, ctx: &BetrayalContext<'_>) -> f32 {
        (self.opportunity(ctx)
            + self.power_imbalance(ctx)
            + self.political_shift(ctx)
            + self.alliance_burden(ctx)
            + self.external_pressure(ctx))
        .max(0.0)
    }
}

/// Stock factor set
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBetrayalFactors;

impl BetrayalFactors for DefaultBetrayalFactors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        agent: &'a AgentProfile,
        target: &'a AgentProfile,
        beneficiary: &'a AgentProfile,
    ) -> BetrayalContext<'a> {
        BetrayalContext {
            agent,
            target,
            beneficiary,
            relation_to_target: 0,
            relation_to_beneficiary: 0,
            dissatisfaction: 0.0,
            threat: 0.0,
            reference_wealth: 20_000.0,
        }
    }

    #[test]
    fn test_factors_are_bounded() {
        let agent = AgentProfile::new("a", "A");
        let target = AgentProfile::new("t", "T");
        let rich = AgentProfile::new("b", "B")
            .with_wealth(1_000_000)
            .with_strength(10_000.0);

        let mut c = ctx(&agent, &target, &rich);
        c.relation_to_beneficiary = 100;
        c.relation_to_target = -100;
        c.dissatisfaction = 500.0;
        c.threat = 3.0;

        let f = DefaultBetrayalFactors;
        assert_eq!(f.opportunity(&c), 30.0);
        assert_eq!(f.power_imbalance(&c), 25.0);
        assert_eq!(f.political_shift(&c), 25.0);
        assert_eq!(f.alliance_burden(&c), 20.0);
        assert_eq!(f.external_pressure(&c), 20.0);
        assert_eq!(f.score(&c), 120.0);

        c.relation_to_beneficiary = -100;
        c.relation_to_target = 100;
        assert_eq!(f.political_shift(&c), -20.0);
    }

    #[test]
    fn test_poor_beneficiary_is_unattractive() {
        let agent = AgentProfile::new("a", "A");
        let target = AgentProfile::new("t", "T").with_strength(400.0);
        let weak = AgentProfile::new("b", "B").with_wealth(1_000).with_strength(100.0);
        let c = ctx(&agent, &target, &weak);
        assert!(DefaultBetrayalFactors.score(&c) < 80.0);
    }

    struct NoPressure;

    impl BetrayalFactors for NoPressure {
        fn external_pressure(&self, _ctx: &BetrayalContext<'_>) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_single_factor_override() {
        let agent = AgentProfile::new("a", "A");
        let target = AgentProfile::new("t", "T");
        let beneficiary = AgentProfile::new("b", "B");
        let mut c = ctx(&agent, &target, &beneficiary);
        c.threat = 1.0;

        assert_eq!(DefaultBetrayalFactors.score(&c), 20.0);
        assert_eq!(NoPressure.score(&c), 0.0);
    }
}
