//! Data Components
//!
//! Snapshots of clans, factions, coalitions and requests exchanged with the host.

pub mod agent;
pub mod coalition;
pub mod faction;
pub mod request;

pub use agent::*;
pub use coalition::*;
pub use faction::*;
pub use request::*;
