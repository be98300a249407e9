//! Snapshot Types
//!
//! Serialization structs for the state that crosses the persistence boundary:
//! decision memory blobs and end-of-run coalition summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{SimDate, SimTime};

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Persisted form of the decision memory.
///
/// Both maps are opaque to the host: cooldown keys map to expiry instants,
/// agent keys map to their recent decision record strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub cooldowns: BTreeMap<String, SimTime>,
    #[serde(default)]
    pub decisions: BTreeMap<String, Vec<String>>,
}

impl MemorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.cooldowns.is_empty() && self.decisions.is_empty()
    }
}

/// Coalition summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalitionSnapshot {
    pub coalition_id: String,
    pub leader: String,
    pub founder: String,
    pub members: Vec<String>,
    pub trust: f32,
    pub secrecy: f32,
    pub status: String,
    pub formed_on: SimDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<String>,
}

/// All coalitions known to the store at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PactsSnapshot {
    pub snapshot_id: String,
    pub at: SimTime,
    pub date: SimDate,
    pub coalitions: Vec<CoalitionSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_snapshot_json_shape() {
        let mut snapshot = MemorySnapshot::default();
        assert!(snapshot.is_empty());

        snapshot
            .cooldowns
            .insert("daily:clan_0001".to_string(), SimTime::from_hours(48));
        snapshot.decisions.insert(
            "clan_0001".to_string(),
            vec!["1_2_propose_alliance".to_string()],
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"cooldowns":{"daily:clan_0001":48},"decisions":{"clan_0001":["1_2_propose_alliance"]}}"#
        );
        let parsed: MemorySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_snapshot_id_format() {
        assert_eq!(generate_snapshot_id(7), "snap_000007");
    }
}
