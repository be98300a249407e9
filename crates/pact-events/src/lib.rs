//! Shared calendar, event and snapshot types for the covert pact engine.
//!
//! This crate contains pure data structures with no decision logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod snapshot;
pub mod timestamp;

// Re-export calendar types
pub use timestamp::{
    ParseDateError, Season, SimDate, SimDuration, SimTime, DAYS_PER_SEASON, DAYS_PER_WEEK,
    DAYS_PER_YEAR, HOURS_PER_DAY,
};

// Re-export event types
pub use event::*;

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, CoalitionSnapshot, MemorySnapshot, PactsSnapshot,
};
