//! Statistics Output
//!
//! Collects decision counts day by day and summarizes the coalitions left
//! standing at the end of a run.

use bevy_ecs::prelude::*;
use pact_events::{DecisionEvent, PactsSnapshot, SimTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::sandbox::SandboxWorld;
use crate::systems::CycleReport;

/// Summary of one simulated day
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day_index: u64,
    pub processed: usize,
    pub decisions: usize,
}

/// Coalition counts at the end of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoalitionSummary {
    pub formed: usize,
    pub active: usize,
    pub dissolved: usize,
    pub average_members: f64,
    pub average_trust: f64,
    pub average_secrecy: f64,
    pub leaks: usize,
}

/// Overall run statistics
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub days: u64,
    pub total_decisions: usize,
    pub decisions_by_kind: BTreeMap<String, usize>,
    pub decisions_by_category: BTreeMap<String, usize>,
    pub average_decisions_per_day: f64,
    pub records_pruned: usize,
    pub coalitions: CoalitionSummary,
    pub day_history: Vec<DaySummary>,
    pub final_snapshot: PactsSnapshot,
}

/// Resource to accumulate statistics during a run
#[derive(Resource, Default)]
pub struct StatsCollector {
    pub total_decisions: usize,
    pub decisions_by_kind: BTreeMap<String, usize>,
    pub decisions_by_category: BTreeMap<String, usize>,
    pub records_pruned: usize,
    pub day_history: Vec<DaySummary>,
}

fn category_label(event: &DecisionEvent) -> String {
    format!("{:?}", event.category()).to_lowercase()
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_day(&mut self, report: &CycleReport) {
        for event in &report.events {
            self.total_decisions += 1;
            *self
                .decisions_by_kind
                .entry(event.kind.label().to_string())
                .or_insert(0) += 1;
            *self
                .decisions_by_category
                .entry(category_label(event))
                .or_insert(0) += 1;
        }
        self.records_pruned += report.pruned.records;
        self.day_history.push(DaySummary {
            day_index: report.at.day_index(),
            processed: report.processed.len(),
            decisions: report.events.len(),
        });
    }

    pub fn generate_stats(&self, days: u64, world: &SandboxWorld, now: SimTime) -> RunStats {
        let average_decisions_per_day = if days > 0 {
            self.total_decisions as f64 / days as f64
        } else {
            0.0
        };

        let mut coalitions = CoalitionSummary {
            leaks: world.leaks().len(),
            ..CoalitionSummary::default()
        };
        let (mut members, mut trust, mut secrecy) = (0usize, 0.0f64, 0.0f64);
        for coalition in world.coalitions() {
            coalitions.formed += 1;
            if coalition.is_active() {
                coalitions.active += 1;
                members += coalition.member_count();
                trust += coalition.trust as f64;
                secrecy += coalition.secrecy as f64;
            } else {
                coalitions.dissolved += 1;
            }
        }
        if coalitions.active > 0 {
            let active = coalitions.active as f64;
            coalitions.average_members = members as f64 / active;
            coalitions.average_trust = trust / active;
            coalitions.average_secrecy = secrecy / active;
        }

        RunStats {
            days,
            total_decisions: self.total_decisions,
            decisions_by_kind: self.decisions_by_kind.clone(),
            decisions_by_category: self.decisions_by_category.clone(),
            average_decisions_per_day,
            records_pruned: self.records_pruned,
            coalitions,
            day_history: self.day_history.clone(),
            final_snapshot: world.snapshot(now, days),
        }
    }
}

/// Write statistics as pretty JSON, creating parent directories as needed
pub fn write_stats(stats: &RunStats, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AgentId, AgentProfile};
    use crate::host::CoalitionStore;
    use crate::systems::PruneStats;
    use pact_events::DecisionKind;

    fn report(events: Vec<DecisionEvent>) -> CycleReport {
        let at = SimTime::start();
        CycleReport {
            at,
            date: at.date(),
            eligible: 3,
            processed: vec![AgentId::from("a"), AgentId::from("b")],
            events,
            pruned: PruneStats::default(),
            weekly_prune: true,
        }
    }

    #[test]
    fn test_stats_collector_new() {
        let collector = StatsCollector::new();
        assert_eq!(collector.total_decisions, 0);
        assert!(collector.decisions_by_kind.is_empty());
    }

    #[test]
    fn test_counts_by_kind_and_category() {
        let mut collector = StatsCollector::new();
        let now = SimTime::start();
        collector.record_day(&report(vec![
            DecisionEvent::new(DecisionKind::ProposeAlliance, "a", now),
            DecisionEvent::new(DecisionKind::LeakAlliance, "b", now),
            DecisionEvent::new(DecisionKind::ProposeAlliance, "b", now),
        ]));

        assert_eq!(collector.total_decisions, 3);
        assert_eq!(collector.decisions_by_kind["propose_alliance"], 2);
        assert_eq!(collector.decisions_by_category["alliance"], 2);
        assert_eq!(collector.decisions_by_category["opportunistic"], 1);
        assert_eq!(collector.day_history[0].processed, 2);
    }

    #[test]
    fn test_coalition_summary() {
        let mut world = SandboxWorld::new();
        for id in ["a", "b", "c"] {
            world.add_agent(AgentProfile::new(id, id));
        }
        let now = SimTime::start();
        assert!(world.propose_alliance(&AgentId::from("a"), &AgentId::from("b"), now));
        assert!(world.propose_alliance(&AgentId::from("a"), &AgentId::from("c"), now));
        let id = world.alliance(&AgentId::from("a"), &AgentId::from("c")).unwrap().id;
        assert!(world.dissolve_alliance(&id, now));

        let stats = StatsCollector::new().generate_stats(10, &world, now);
        assert_eq!(stats.coalitions.formed, 2);
        assert_eq!(stats.coalitions.active, 1);
        assert_eq!(stats.coalitions.dissolved, 1);
        assert!((stats.coalitions.average_members - 2.0).abs() < 1e-9);
        assert_eq!(stats.final_snapshot.coalitions.len(), 2);
    }

    #[test]
    fn test_write_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("stats.json");
        let stats = StatsCollector::new().generate_stats(0, &SandboxWorld::new(), SimTime::start());

        write_stats(&stats, &path).unwrap();
        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"total_decisions\": 0"));
    }
}
