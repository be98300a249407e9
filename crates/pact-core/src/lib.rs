//! Covert Pact Decision Engine
//!
//! Autonomous clans form, join, leave, dissolve and betray covert coalitions,
//! answer and originate mutual-aid requests, and invest in secrecy. The engine
//! reads the world through the [`host`] traits and never owns it.

use bevy_ecs::prelude::*;
use pact_events::SimTime;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod output;
pub mod sandbox;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::EngineConfig;
pub use error::{ConfigError, HostError, ParseRecordError, PersistenceError};
pub use host::Host;
pub use sandbox::SandboxWorld;
pub use systems::{CycleReport, DecisionMemory, DecisionScheduler};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Current simulated instant and the number of days run so far
#[derive(Resource, Debug, Clone, Copy)]
pub struct Clock {
    pub now: SimTime,
    pub days_run: u64,
}

impl Clock {
    pub fn new(now: SimTime) -> Self {
        Self { now, days_run: 0 }
    }

    pub fn advance_day(&mut self) {
        self.now.advance_day();
        self.days_run += 1;
    }
}
