//! Decision Systems
//!
//! Utility scoring, decision memory, the alliance lifecycle, assistance,
//! investment, opportunistic actions and the daily scheduler that drives them.

pub mod assistance;
pub mod cycle;
pub mod investment;
pub mod lifecycle;
pub mod memory;
pub mod opportunistic;
pub mod scheduler;
pub mod utility;

// Re-export commonly used systems
pub use assistance::{originate_request, respond_to_requests, run_assistance};
pub use cycle::{is_at_war, DecisionCycle};
pub use investment::try_invest;
pub use lifecycle::{
    betray, note_joint_battle, run_alliance, try_create, try_join, try_leave_or_dissolve,
};
pub use memory::{CooldownKey, DecisionMemory, DecisionRecord, PruneStats};
pub use opportunistic::{run_opportunistic, try_betrayal, try_leak};
pub use scheduler::{process_agent, CycleReport, DecisionScheduler, CATEGORY_ORDER};
pub use utility::{
    adjusted_threshold, assistance_utility, desperation, dissatisfaction, formation_utility,
    investment_utility, join_utility, BetrayalContext, BetrayalFactors, DefaultBetrayalFactors,
    FormationUtility, Gate, PairContext,
};
