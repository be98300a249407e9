//! Decision Event Output
//!
//! JSONL logging of fired decisions.

pub mod logger;

pub use logger::{EventLogger, PendingDecisions};
