//! Utility Scoring
//!
//! Pure functions mapping agent and coalition snapshots to scalar utilities.
//! Composite utilities are on a 0-100 scale and compared against the
//! disposition-adjusted thresholds in [`threshold`].

pub mod assistance;
pub mod betrayal;
pub mod formation;
pub mod threshold;

pub use assistance::{assistance_utility, investment_utility, AssistanceInputs};
pub use betrayal::{BetrayalContext, BetrayalFactors, DefaultBetrayalFactors};
pub use formation::{
    dissatisfaction, formation_utility, join_utility, proximity, threat, FormationUtility,
    PairContext,
};
pub use threshold::{adjusted_threshold, desperation, Gate};

/// Bounds applied to sub-utilities before weighting
pub mod bounds {
    /// Lower bound of military, economic and political sub-utilities
    pub const COMPONENT_MIN: f32 = -0.5;
    /// Upper bound of every sub-utility
    pub const COMPONENT_MAX: f32 = 1.0;
    /// Lower bound of the security sub-utility
    pub const SECURITY_MIN: f32 = 0.0;
    /// Composite utilities are sub-utility x weight x SCALE
    pub const SCALE: f32 = 100.0;
}
