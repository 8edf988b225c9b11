use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Counters describing what the engine has been asked to do.
#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    selections: u64,
    usages: u64,
    releases: u64,
    ignored_references: u64,
    rebalances: u64,
    penalized_zones: u64,
    generations: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_selection(&mut self) {
        self.selections = self.selections.saturating_add(1);
    }

    pub fn record_usage(&mut self) {
        self.usages = self.usages.saturating_add(1);
    }

    pub fn record_release(&mut self) {
        self.releases = self.releases.saturating_add(1);
    }

    /// Usage or release aimed at a zone that is not in the current generation.
    pub fn record_ignored_reference(&mut self) {
        self.ignored_references = self.ignored_references.saturating_add(1);
    }

    pub fn record_rebalance(&mut self, penalized: usize) {
        self.rebalances = self.rebalances.saturating_add(1);
        self.penalized_zones = self.penalized_zones.saturating_add(penalized as u64);
    }

    pub fn record_generation(&mut self) {
        self.generations = self.generations.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            selections: self.selections,
            usages: self.usages,
            releases: self.releases,
            ignored_references: self.ignored_references,
            rebalances: self.rebalances,
            penalized_zones: self.penalized_zones,
            generations: self.generations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub selections: u64,
    pub usages: u64,
    pub releases: u64,
    pub ignored_references: u64,
    pub rebalances: u64,
    pub penalized_zones: u64,
    pub generations: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("selections".to_string(), json!(self.selections));
        map.insert("usages".to_string(), json!(self.usages));
        map.insert("releases".to_string(), json!(self.releases));
        map.insert(
            "ignored_references".to_string(),
            json!(self.ignored_references),
        );
        map.insert("rebalances".to_string(), json!(self.rebalances));
        map.insert("penalized_zones".to_string(), json!(self.penalized_zones));
        map.insert("generations".to_string(), json!(self.generations));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "engine_metrics", self.as_fields())
    }
}
