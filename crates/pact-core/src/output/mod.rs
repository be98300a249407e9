//! Run Output
//!
//! Statistics collected over a sandbox run.

pub mod stats;

pub use stats::*;
