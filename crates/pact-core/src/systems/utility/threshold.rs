//! Disposition-adjusted decision thresholds.

use crate::components::AgentProfile;
use crate::config::ThresholdConfig;

/// Share of desperation contributed by each hardship
const DESPERATION_STEP: f32 = 0.25;

/// A utility-gated decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    Formation,
    Join,
    Leave,
    Dissolve,
    Betrayal,
    Accept,
    Decline,
    Investment,
}

impl Gate {
    pub fn base(&self, config: &ThresholdConfig) -> f32 {
        match self {
            Gate::Formation => config.formation,
            Gate::Join => config.join,
            Gate::Leave => config.leave,
            Gate::Dissolve => config.dissolve,
            Gate::Betrayal => config.betrayal,
            Gate::Accept => config.accept,
            Gate::Decline => config.decline,
            Gate::Investment => config.investment,
        }
    }

    /// Decisions that break faith with partners; honor and calculation
    /// move their bar.
    pub fn is_defection(&self) -> bool {
        matches!(self, Gate::Leave | Gate::Betrayal)
    }
}

/// Hardship in [0, 1]: a quarter for each of low wealth, low strength,
/// an active war and no holdings.
pub fn desperation(agent: &AgentProfile, at_war: bool, config: &ThresholdConfig) -> f32 {
    let hardships = [
        agent.wealth < config.desperate_wealth,
        agent.strength < config.desperate_strength,
        at_war,
        agent.holdings.is_empty(),
    ];
    hardships.iter().filter(|&&h| h).count() as f32 * DESPERATION_STEP
}

/// Threshold `agent` must reach for `gate`.
///
/// Never below `base * floor_ratio`; betrayal never below its base.
pub fn adjusted_threshold(
    gate: Gate,
    agent: &AgentProfile,
    at_war: bool,
    config: &ThresholdConfig,
) -> f32 {
    let base = gate.base(config);
    let mut adjusted = base;

    if gate.is_defection() {
        adjusted += config.honor_step * agent.traits.honor as f32;
        adjusted -= config.calculating_step * agent.traits.calculating as f32;
    }
    adjusted -= desperation(agent, at_war, config) * config.desperation_discount;

    let floor = if gate == Gate::Betrayal {
        base
    } else {
        base * config.floor_ratio
    };
    adjusted.max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{SettlementKind, Traits};

    fn comfortable() -> AgentProfile {
        AgentProfile::new("a", "A")
            .with_wealth(10_000)
            .with_strength(500.0)
            .with_holdings(vec![SettlementKind::Town])
    }

    #[test]
    fn test_comfortable_agent_uses_base() {
        let config = ThresholdConfig::default();
        let agent = comfortable();
        assert_eq!(desperation(&agent, false, &config), 0.0);
        assert_eq!(adjusted_threshold(Gate::Formation, &agent, false, &config), 60.0);
    }

    #[test]
    fn test_desperation_lowers_every_threshold() {
        let config = ThresholdConfig::default();
        let agent = AgentProfile::new("a", "A").with_wealth(500).with_strength(20.0);
        assert_eq!(desperation(&agent, true, &config), 1.0);
        assert_eq!(adjusted_threshold(Gate::Formation, &agent, true, &config), 40.0);
        assert_eq!(adjusted_threshold(Gate::Decline, &agent, true, &config), 10.0);
    }

    #[test]
    fn test_honor_raises_leave_bar() {
        let config = ThresholdConfig::default();
        let honorable = comfortable().with_traits(Traits::new(2, 0));
        let scheming = comfortable().with_traits(Traits::new(-2, 2));
        assert_eq!(adjusted_threshold(Gate::Leave, &honorable, false, &config), 70.0);
        assert_eq!(adjusted_threshold(Gate::Leave, &scheming, false, &config), 40.0);
        // disposition does not touch ordinary gates
        assert_eq!(adjusted_threshold(Gate::Join, &scheming, false, &config), 60.0);
    }

    #[test]
    fn test_betrayal_never_below_base() {
        let config = ThresholdConfig::default();
        let agent = AgentProfile::new("a", "A")
            .with_wealth(0)
            .with_traits(Traits::new(-2, 2));
        let threshold = adjusted_threshold(Gate::Betrayal, &agent, true, &config);
        assert_eq!(threshold, 80.0);
        assert!(threshold > adjusted_threshold(Gate::Formation, &agent, true, &config));
    }

    #[test]
    fn test_floor_holds_for_ordinary_gates() {
        let config = ThresholdConfig {
            desperation_discount: 100.0,
            ..ThresholdConfig::default()
        };
        let agent = AgentProfile::new("a", "A");
        assert_eq!(adjusted_threshold(Gate::Accept, &agent, true, &config), 30.0);
    }
}
