//! Configuration System
//!
//! All weights, thresholds, caps and probabilities of the decision engine.
//! Loaded from TOML; every section and field falls back to its default.

use pact_events::{DecisionKind, SimDuration};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "pacts.toml";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub alliance: AllianceConfig,
    #[serde(default)]
    pub assistance: AssistanceConfig,
    #[serde(default)]
    pub investment: InvestmentConfig,
    #[serde(default)]
    pub opportunistic: OpportunisticConfig,
    #[serde(default)]
    pub cooldowns: CooldownConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// How the hard daily cap counts an agent's recorded decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapScope {
    /// Every retained record from the current year counts
    #[default]
    SameYear,
    /// Only records from the current day count
    SameDay,
}

/// Daily cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Agents processed per simulated day
    pub batch_size: usize,
    /// Recorded decisions after which an agent's turn ends
    pub daily_cap: usize,
    pub cap_scope: CapScope,
    /// Cooldown placed on every processed agent
    pub daily_cooldown_hours: u64,
    /// Chance per agent per day of considering opportunistic actions
    pub opportunistic_chance: f64,
    pub prune_interval_days: u64,
    /// Decision records older than this are pruned
    pub decision_retention_days: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            daily_cap: 2,
            cap_scope: CapScope::SameYear,
            daily_cooldown_hours: 24,
            opportunistic_chance: 0.10,
            prune_interval_days: 7,
            decision_retention_days: 7,
        }
    }
}

/// Composite weights and normalisation references for utility scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub military_weight: f32,
    pub economic_weight: f32,
    pub political_weight: f32,
    pub security_weight: f32,
    /// Distance at which proximity bonuses reach zero
    pub proximity_radius: f32,
    /// Strength considered fully safe when computing threat
    pub reference_strength: f32,
    /// Wealth considered fully safe when computing threat
    pub reference_wealth: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            military_weight: 0.3,
            economic_weight: 0.25,
            political_weight: 0.25,
            security_weight: 0.2,
            proximity_radius: 150.0,
            reference_strength: 1000.0,
            reference_wealth: 20000.0,
        }
    }
}

/// Base thresholds and their disposition adjustments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub formation: f32,
    pub join: f32,
    pub leave: f32,
    pub dissolve: f32,
    pub betrayal: f32,
    pub accept: f32,
    pub decline: f32,
    pub investment: f32,
    /// Added per honor level to defection-style thresholds
    pub honor_step: f32,
    /// Subtracted per calculating level from defection-style thresholds
    pub calculating_step: f32,
    /// Reduction at full desperation
    pub desperation_discount: f32,
    /// Ordinary thresholds never fall below base * floor_ratio
    pub floor_ratio: f32,
    pub desperate_wealth: i64,
    pub desperate_strength: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            formation: 60.0,
            join: 60.0,
            leave: 60.0,
            dissolve: 80.0,
            betrayal: 80.0,
            accept: 60.0,
            decline: 20.0,
            investment: 50.0,
            honor_step: 5.0,
            calculating_step: 5.0,
            desperation_discount: 20.0,
            floor_ratio: 0.5,
            desperate_wealth: 1000,
            desperate_strength: 50.0,
        }
    }
}

/// Alliance lifecycle limits and consequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllianceConfig {
    pub max_members: usize,
    /// Agents holding this many coalitions stop proposing new ones
    pub max_coalitions_to_create: usize,
    /// Agents holding this many coalitions stop joining
    pub max_coalitions_to_join: usize,
    /// Best-scoring candidates scanned per proposal attempt
    pub candidate_pool: usize,
    pub betrayal_relation_penalty: i32,
    pub beneficiary_relation_bonus: i32,
    pub betrayal_trust_penalty: f32,
    pub battle_trust_delta: f32,
    pub witness_secrecy_cost: f32,
    pub max_witness_secrecy_cost: f32,
}

impl Default for AllianceConfig {
    fn default() -> Self {
        Self {
            max_members: 5,
            max_coalitions_to_create: 2,
            max_coalitions_to_join: 3,
            candidate_pool: 5,
            betrayal_relation_penalty: -30,
            beneficiary_relation_bonus: 10,
            betrayal_trust_penalty: 0.3,
            battle_trust_delta: 0.05,
            witness_secrecy_cost: 0.02,
            max_witness_secrecy_cost: 0.2,
        }
    }
}

/// Mutual-aid settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistanceConfig {
    /// Below this wealth an agent asks allies for gold
    pub need_wealth_floor: i64,
    /// Below this strength an agent asks allies for troops
    pub need_strength_floor: f32,
    pub financial_ask: i64,
    pub battle_offer: i64,
    pub trust_gain: f32,
    pub relation_gain: i32,
    pub decline_relation_penalty: i32,
}

impl Default for AssistanceConfig {
    fn default() -> Self {
        Self {
            need_wealth_floor: 2000,
            need_strength_floor: 100.0,
            financial_ask: 1000,
            battle_offer: 500,
            trust_gain: 0.05,
            relation_gain: 5,
            decline_relation_penalty: -2,
        }
    }
}

/// Secrecy investment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentConfig {
    pub min_wealth: i64,
    pub cost: i64,
    pub secrecy_gain: f32,
}

impl Default for InvestmentConfig {
    fn default() -> Self {
        Self {
            min_wealth: 5000,
            cost: 1000,
            secrecy_gain: 0.1,
        }
    }
}

/// Betrayal and leak gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunisticConfig {
    pub betrayal_gate: f64,
    pub leak_gate: f64,
    /// Only agents poorer than this consider leaking
    pub leak_wealth_ceiling: i64,
    /// Coalitions at or below this secrecy are not worth leaking
    pub leak_secrecy_floor: f32,
    pub leak_secrecy_cost: f32,
}

impl Default for OpportunisticConfig {
    fn default() -> Self {
        Self {
            betrayal_gate: 0.15,
            leak_gate: 0.05,
            leak_wealth_ceiling: 5000,
            leak_secrecy_floor: 0.3,
            leak_secrecy_cost: 0.2,
        }
    }
}

/// Per-decision cooldowns, in days. Zero disables the cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub propose_days: u64,
    pub join_days: u64,
    pub leave_days: u64,
    pub dissolve_days: u64,
    pub betray_days: u64,
    pub leak_days: u64,
    pub accept_days: u64,
    pub decline_days: u64,
    pub request_days: u64,
    pub invest_days: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            propose_days: 7,
            join_days: 7,
            leave_days: 14,
            dissolve_days: 14,
            betray_days: 30,
            leak_days: 30,
            accept_days: 0,
            decline_days: 0,
            request_days: 3,
            invest_days: 7,
        }
    }
}

impl CooldownConfig {
    /// Cooldown started when `kind` is recorded.
    pub fn duration(&self, kind: DecisionKind) -> SimDuration {
        let days = match kind {
            DecisionKind::ProposeAlliance => self.propose_days,
            DecisionKind::JoinAlliance => self.join_days,
            DecisionKind::LeaveAlliance => self.leave_days,
            DecisionKind::DissolveAlliance => self.dissolve_days,
            DecisionKind::BetrayAlliance => self.betray_days,
            DecisionKind::LeakAlliance => self.leak_days,
            DecisionKind::AcceptRequest => self.accept_days,
            DecisionKind::DeclineRequest => self.decline_days,
            DecisionKind::RequestAid => self.request_days,
            DecisionKind::InvestSecrecy => self.invest_days,
        };
        SimDuration::from_days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.scheduler.batch_size, 10);
        assert_eq!(config.scheduler.daily_cap, 2);
        assert_eq!(config.thresholds.formation, 60.0);
        assert_eq!(config.thresholds.betrayal, 80.0);
        assert_eq!(config.alliance.max_members, 5);
        assert!(config.thresholds.betrayal > config.thresholds.formation);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [scheduler]
            batch_size = 25
            cap_scope = "same_day"

            [thresholds]
            formation = 55.0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.scheduler.batch_size, 25);
        assert_eq!(config.scheduler.cap_scope, CapScope::SameDay);
        assert_eq!(config.scheduler.daily_cap, 2);
        assert_eq!(config.thresholds.formation, 55.0);
        assert_eq!(config.thresholds.betrayal, 80.0);
        assert_eq!(config.investment.cost, 1000);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = EngineConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[scheduler]"));
        assert!(toml.contains("[opportunistic]"));

        let parsed = EngineConfig::from_str(&toml).unwrap();
        assert_eq!(parsed.cooldowns.betray_days, 30);
        assert_eq!(parsed.scoring.proximity_radius, 150.0);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(EngineConfig::from_str("[scheduler\nbatch_size = ").is_err());
    }

    #[test]
    fn test_cooldown_durations() {
        let cooldowns = CooldownConfig::default();
        assert_eq!(
            cooldowns.duration(DecisionKind::ProposeAlliance),
            SimDuration::from_days(7)
        );
        assert_eq!(cooldowns.duration(DecisionKind::AcceptRequest), SimDuration::ZERO);
    }
}
