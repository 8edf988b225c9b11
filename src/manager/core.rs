use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::{Value, json};

use crate::clock::{Clock, MonotonicClock};
use crate::config::ZoneConfig;
use crate::error::{Result, ScatterError};
use crate::geometry::{Point, Viewport};
use crate::layout::{self, ZoneLayout};
use crate::logging::{
    LogLevel, Logger, MANAGER_TARGET, METRICS_TARGET, event_with_fields, json_kv,
};
use crate::metrics::{EngineMetrics, MetricSnapshot};
use crate::strategy::{self, SelectionContext, SelectionStrategy};
use crate::tracker::{
    DistributionHistory, DistributionStats, RebalanceReport, balance_score, center_utilization,
    rebalance,
};
use crate::zone::{ZoneId, ZoneKind, ZoneView};

/// A selected zone plus a sampled position inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub zone_id: ZoneId,
    pub kind: ZoneKind,
    pub position: Point,
}

pub struct ZoneManager {
    config: ZoneConfig,
    layout: ZoneLayout,
    history: DistributionHistory,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    logger: Option<Logger>,
    metrics: EngineMetrics,
    started: Instant,
    usages_since_rebalance: u32,
    generation: u64,
}

impl ZoneManager {
    /// Validate `config` and build the first zone generation for `viewport`.
    pub fn new(viewport: Viewport, config: ZoneConfig) -> Result<Self> {
        let mut manager = Self::uninitialized(config)?;
        manager.install(viewport);
        Ok(manager)
    }

    /// Manager with no zones. Selection fails with `InvalidState` until
    /// [`ZoneManager::initialize_zones`] runs.
    pub fn uninitialized(config: ZoneConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: seeded_rng(config.seed),
            history: DistributionHistory::new(config.max_history_size),
            layout: ZoneLayout::empty(Viewport::new(0.0, 0.0)),
            config,
            clock: Arc::new(MonotonicClock::new()),
            logger: None,
            metrics: EngineMetrics::new(),
            started: Instant::now(),
            usages_since_rebalance: 0,
            generation: 0,
        })
    }

    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub(crate) fn replace_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    pub(crate) fn replace_logger(&mut self, logger: Logger) {
        self.logger = Some(logger);
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    pub fn layout(&self) -> &ZoneLayout {
        &self.layout
    }

    pub fn history(&self) -> &DistributionHistory {
        &self.history
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Replace the current generation with a fresh layout.
    ///
    /// Usage statistics, weights and the distribution history of the previous
    /// generation are discarded.
    pub fn initialize_zones(&mut self, viewport: Viewport, config: ZoneConfig) -> Result<()> {
        config.validate()?;
        if config.seed != self.config.seed {
            self.rng = seeded_rng(config.seed);
        }
        self.config = config;
        self.install(viewport);
        Ok(())
    }

    fn install(&mut self, viewport: Viewport) {
        let effective = self.config.effective_for(viewport);
        self.generation += 1;
        self.layout = layout::build(viewport, &effective).with_generation(self.generation);
        self.history = DistributionHistory::new(self.config.max_history_size);
        self.usages_since_rebalance = 0;
        self.metrics.record_generation();
        self.log_manager_event(
            LogLevel::Info,
            "zones_initialized",
            [
                json_kv("generation", self.generation),
                json_kv("width", viewport.width),
                json_kv("height", viewport.height),
                json_kv("orientation", json!(viewport.orientation())),
                json_kv("center_zone_size", effective.center_zone_size),
                json_kv("transition_zone_width", effective.transition_zone_width),
                json_kv("zones", self.layout.len()),
            ],
        );
    }

    pub fn select_zone(&mut self, strategy: SelectionStrategy) -> Result<ZoneId> {
        let ctx = SelectionContext {
            layout: &self.layout,
            history: &self.history,
            config: &self.config,
            now_ms: self.clock.now_ms(),
        };
        match strategy::select(ctx, strategy, &mut self.rng) {
            Ok(zone_id) => {
                self.metrics.record_selection();
                self.log_manager_event(
                    LogLevel::Trace,
                    "zone_selected",
                    [
                        json_kv("strategy", strategy.as_str()),
                        json_kv("zone", zone_id.as_str()),
                    ],
                );
                Ok(zone_id)
            }
            Err(err) => {
                self.log_manager_event(
                    LogLevel::Error,
                    "selection_failed",
                    [
                        json_kv("strategy", strategy.as_str()),
                        json_kv("error", err.to_string()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Mark one placement as occupying `zone_id`.
    ///
    /// Returns `false` and changes nothing when the id is not part of the
    /// current generation.
    pub fn record_zone_usage(&mut self, zone_id: &str) -> bool {
        let now = self.clock.now_ms();
        let Some(zone) = self.layout.get_mut(zone_id) else {
            self.note_stale_reference("usage", zone_id);
            return false;
        };
        zone.record_usage(now);
        self.history.push(zone_id, now);
        self.metrics.record_usage();

        self.usages_since_rebalance = self.usages_since_rebalance.saturating_add(1);
        let interval = self.config.rebalance_interval;
        if interval > 0 && self.usages_since_rebalance >= interval {
            self.trigger_rebalancing();
        }
        true
    }

    /// Release one placement from `zone_id`. Extra releases are clamped at zero.
    pub fn record_zone_release(&mut self, zone_id: &str) -> bool {
        let Some(zone) = self.layout.get_mut(zone_id) else {
            self.note_stale_reference("release", zone_id);
            return false;
        };
        zone.release();
        self.metrics.record_release();
        true
    }

    pub fn trigger_rebalancing(&mut self) -> RebalanceReport {
        self.usages_since_rebalance = 0;
        let report = rebalance(&mut self.layout, &self.config);
        self.metrics.record_rebalance(report.penalized.len());
        if !report.is_noop() {
            self.log_manager_event(
                LogLevel::Debug,
                "zones_rebalanced",
                [
                    json_kv("penalized", json!(report.penalized)),
                    json_kv("relaxed", json!(report.relaxed)),
                    json_kv("average_density", report.average_density),
                ],
            );
        }
        report
    }

    pub fn get_zone(&self, zone_id: &str) -> Option<ZoneView> {
        self.layout.get(zone_id).map(|zone| zone.view())
    }

    pub fn get_zones_by_type(&self, kind: ZoneKind) -> Vec<ZoneView> {
        self.layout.by_kind(kind).map(|zone| zone.view()).collect()
    }

    pub fn get_distribution_stats(&self) -> DistributionStats {
        DistributionStats::collect(&self.layout)
    }

    pub fn center_utilization(&self) -> f64 {
        center_utilization(&self.layout)
    }

    pub fn balance_score(&self) -> f64 {
        balance_score(&self.layout)
    }

    /// Random point inside `zone_id`, inset by the configured placement margin.
    pub fn position_in_zone(&mut self, zone_id: &str) -> Result<Point> {
        let zone = self
            .layout
            .get(zone_id)
            .ok_or_else(|| ScatterError::UnknownZone(zone_id.to_string()))?;
        Ok(zone.random_position(self.config.placement_margin, &mut self.rng))
    }

    /// Select a zone and sample a position in it. Usage is not recorded; the
    /// caller reports it once the fragment is actually shown.
    pub fn place_fragment(&mut self, strategy: SelectionStrategy) -> Result<Placement> {
        let zone_id = self.select_zone(strategy)?;
        let position = self.position_in_zone(&zone_id)?;
        let kind = self
            .layout
            .get(&zone_id)
            .map(|zone| zone.kind())
            .ok_or_else(|| ScatterError::UnknownZone(zone_id.clone()))?;
        Ok(Placement {
            zone_id,
            kind,
            position,
        })
    }

    pub fn metrics_snapshot(&self) -> MetricSnapshot {
        self.metrics.snapshot(self.started.elapsed())
    }

    /// Send the current metrics snapshot to the logger, if one is installed.
    pub fn emit_metrics(&self) {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(self.metrics_snapshot().to_log_event(METRICS_TARGET));
        }
    }

    fn note_stale_reference(&mut self, operation: &str, zone_id: &str) {
        self.metrics.record_ignored_reference();
        self.log_manager_event(
            LogLevel::Debug,
            "stale_zone_reference",
            [
                json_kv("operation", operation),
                json_kv("zone", zone_id),
                json_kv("generation", self.generation),
            ],
        );
    }

    fn log_manager_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            if logger.enabled(level) {
                let event = event_with_fields(level, MANAGER_TARGET, message, fields);
                let _ = logger.log_event(event);
            }
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
