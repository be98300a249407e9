//! Sandbox Setup
//!
//! Seeded population generation for the sandbox host: factions, wars,
//! clans and their starting relations.

pub mod clans;
pub mod factions;

pub use clans::*;
pub use factions::*;
