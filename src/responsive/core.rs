use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{MAX_ZONE_FRACTION, ZoneConfig};
use crate::error::{Result, ScatterError};
use crate::geometry::Viewport;
use crate::layout;
use crate::logging::{LogLevel, Logger, RESPONSIVE_TARGET, event_with_fields, json_kv};
use crate::manager::{Placement, ZoneManager};
use crate::strategy::SelectionStrategy;
use crate::zone::ZoneId;

/// Coarse performance class reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    #[default]
    High,
    Medium,
    Low,
}

impl DeviceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::High => "high",
            DeviceTier::Medium => "medium",
            DeviceTier::Low => "low",
        }
    }
}

impl fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceTier {
    type Err = ScatterError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "high" => Ok(DeviceTier::High),
            "medium" => Ok(DeviceTier::Medium),
            "low" => Ok(DeviceTier::Low),
            other => Err(ScatterError::InvalidConfig(format!(
                "unknown device tier `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSignals {
    pub tier: DeviceTier,
    pub reduced_motion: bool,
    pub low_battery: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveConfig {
    /// Viewports whose smaller side is below this get the center boost.
    pub small_screen_threshold: f64,
    /// Viewports whose smaller side is below this run constrained.
    pub tiny_screen_threshold: f64,
    pub small_screen_center_boost: f64,
    /// Edge weight used while constrained.
    pub constrained_edge_weight: f64,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            small_screen_threshold: 768.0,
            tiny_screen_threshold: 480.0,
            small_screen_center_boost: 0.1,
            constrained_edge_weight: 1.2,
        }
    }
}

impl ResponsiveConfig {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("small_screen_threshold", self.small_screen_threshold),
            ("tiny_screen_threshold", self.tiny_screen_threshold),
            ("constrained_edge_weight", self.constrained_edge_weight),
        ];
        for (name, value) in checks {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ScatterError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.small_screen_center_boost >= 0.0 && self.small_screen_center_boost.is_finite()) {
            return Err(ScatterError::InvalidConfig(format!(
                "small_screen_center_boost must be non-negative, got {}",
                self.small_screen_center_boost
            )));
        }
        Ok(())
    }
}

/// Resize waiting out the debounce window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingResize {
    pub viewport: Viewport,
    pub requested_at: u64,
}

pub struct ResponsiveAdapter {
    manager: ZoneManager,
    base_config: ZoneConfig,
    responsive: ResponsiveConfig,
    signals: DeviceSignals,
    viewport: Viewport,
    pending: Option<PendingResize>,
    clock: Arc<dyn Clock>,
    logger: Option<Logger>,
}

impl ResponsiveAdapter {
    pub fn new(
        viewport: Viewport,
        base_config: ZoneConfig,
        signals: DeviceSignals,
    ) -> Result<Self> {
        Self::with_config(viewport, base_config, ResponsiveConfig::default(), signals)
    }

    pub fn with_config(
        viewport: Viewport,
        base_config: ZoneConfig,
        responsive: ResponsiveConfig,
        signals: DeviceSignals,
    ) -> Result<Self> {
        base_config.validate()?;
        responsive.validate()?;
        let mut adapter = Self {
            manager: ZoneManager::uninitialized(base_config.clone())?,
            base_config,
            responsive,
            signals,
            viewport,
            pending: None,
            clock: Arc::new(MonotonicClock::new()),
            logger: None,
        };
        let config = adapter.adjusted_config();
        adapter.manager.initialize_zones(viewport, config)?;
        Ok(adapter)
    }

    /// Share `clock` between the adapter's debounce and the manager's recency
    /// bookkeeping.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        let shared: Arc<dyn Clock> = Arc::new(clock);
        self.manager.replace_clock(Arc::clone(&shared));
        self.clock = shared;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.manager.replace_logger(logger.clone());
        self.logger = Some(logger);
        self
    }

    pub fn manager(&self) -> &ZoneManager {
        &self.manager
    }

    pub fn signals(&self) -> DeviceSignals {
        self.signals
    }

    pub fn responsive_config(&self) -> &ResponsiveConfig {
        &self.responsive
    }

    /// Viewport of the current generation.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pending(&self) -> Option<PendingResize> {
        self.pending
    }

    pub fn is_small_screen(&self) -> bool {
        self.viewport.min_dimension() < self.responsive.small_screen_threshold
    }

    pub fn is_constrained(&self) -> bool {
        self.signals.tier == DeviceTier::Low
            || self.signals.reduced_motion
            || self.signals.low_battery
            || self.viewport.min_dimension() < self.responsive.tiny_screen_threshold
    }

    /// Strategy actually run for a caller's request under the current signals.
    pub fn effective_strategy(&self, requested: SelectionStrategy) -> SelectionStrategy {
        if self.is_constrained() {
            return SelectionStrategy::EdgeOnly;
        }
        match requested {
            SelectionStrategy::CenterWeighted if self.is_small_screen() => {
                SelectionStrategy::MobileOptimized
            }
            other => other,
        }
    }

    /// Configuration the next generation is built from.
    ///
    /// The aspect fallback is folded in here, so the returned copy has it
    /// switched off for the manager.
    pub fn adjusted_config(&self) -> ZoneConfig {
        let mut config = self.base_config.effective_for(self.viewport);
        if self.is_small_screen() {
            config.center_zone_size = (config.center_zone_size
                + self.responsive.small_screen_center_boost)
                .min(MAX_ZONE_FRACTION);
        }
        if self.is_constrained() {
            config.weights.edge = self.responsive.constrained_edge_weight;
        }
        config.aspect_fallback = false;
        config
    }

    /// Queue a rebuild for `viewport`. A newer event replaces the pending one
    /// and restarts the debounce window; the replaced viewport is returned.
    pub fn on_resize(&mut self, viewport: Viewport) -> Option<Viewport> {
        let requested_at = self.clock.now_ms();
        let replaced = self
            .pending
            .replace(PendingResize {
                viewport,
                requested_at,
            })
            .map(|pending| pending.viewport);

        self.log_responsive_event(
            LogLevel::Debug,
            "resize_queued",
            [
                json_kv("width", viewport.width),
                json_kv("height", viewport.height),
                json_kv("requested_at", requested_at),
                json_kv("coalesced", replaced.is_some()),
            ],
        );
        if viewport.orientation() != self.viewport.orientation() {
            self.log_responsive_event(
                LogLevel::Info,
                "orientation_changed",
                [
                    json_kv("from", json!(self.viewport.orientation())),
                    json_kv("to", json!(viewport.orientation())),
                ],
            );
        }
        replaced
    }

    /// Apply the pending resize once the debounce window has elapsed.
    ///
    /// Returns whether a new generation was built.
    pub fn poll(&mut self) -> Result<bool> {
        let Some(pending) = self.pending else {
            return Ok(false);
        };
        let elapsed = self.clock.now_ms().saturating_sub(pending.requested_at);
        if elapsed < self.base_config.orientation_change_delay_ms {
            return Ok(false);
        }
        self.pending = None;
        self.apply_resize(pending.viewport)
    }

    /// Apply the pending resize now, ignoring the debounce window.
    pub fn flush(&mut self) -> Result<bool> {
        match self.pending.take() {
            Some(pending) => self.apply_resize(pending.viewport),
            None => Ok(false),
        }
    }

    pub fn set_signals(&mut self, signals: DeviceSignals) -> Result<bool> {
        if signals == self.signals {
            return Ok(false);
        }
        self.signals = signals;
        self.log_responsive_event(
            LogLevel::Info,
            "device_signals_changed",
            [
                json_kv("tier", signals.tier.as_str()),
                json_kv("reduced_motion", signals.reduced_motion),
                json_kv("low_battery", signals.low_battery),
            ],
        );
        self.rebuild("device_signals")
    }

    pub fn set_device_tier(&mut self, tier: DeviceTier) -> Result<bool> {
        self.set_signals(DeviceSignals {
            tier,
            ..self.signals
        })
    }

    pub fn set_reduced_motion(&mut self, reduced_motion: bool) -> Result<bool> {
        self.set_signals(DeviceSignals {
            reduced_motion,
            ..self.signals
        })
    }

    pub fn set_low_battery(&mut self, low_battery: bool) -> Result<bool> {
        self.set_signals(DeviceSignals {
            low_battery,
            ..self.signals
        })
    }

    pub fn select_zone(&mut self, requested: SelectionStrategy) -> Result<ZoneId> {
        let strategy = self.effective_strategy(requested);
        self.manager.select_zone(strategy)
    }

    pub fn place_fragment(&mut self, requested: SelectionStrategy) -> Result<Placement> {
        let strategy = self.effective_strategy(requested);
        self.manager.place_fragment(strategy)
    }

    pub fn record_zone_usage(&mut self, zone_id: &str) -> bool {
        self.manager.record_zone_usage(zone_id)
    }

    pub fn record_zone_release(&mut self, zone_id: &str) -> bool {
        self.manager.record_zone_release(zone_id)
    }

    fn apply_resize(&mut self, viewport: Viewport) -> Result<bool> {
        self.viewport = viewport;
        self.rebuild("resize")
    }

    fn rebuild(&mut self, reason: &str) -> Result<bool> {
        let config = self.adjusted_config();
        let signature = layout::signature(self.viewport, &config);
        if signature == self.manager.layout().signature() {
            self.log_responsive_event(
                LogLevel::Debug,
                "layout_unchanged",
                [
                    json_kv("reason", reason),
                    json_kv("generation", self.manager.generation()),
                ],
            );
            return Ok(false);
        }

        let center_zone_size = config.center_zone_size;
        let edge_weight = config.weights.edge;
        self.manager.initialize_zones(self.viewport, config)?;
        self.log_responsive_event(
            LogLevel::Info,
            "layout_rebuilt",
            [
                json_kv("reason", reason),
                json_kv("generation", self.manager.generation()),
                json_kv("tier", self.signals.tier.as_str()),
                json_kv("constrained", self.is_constrained()),
                json_kv("small_screen", self.is_small_screen()),
                json_kv("center_zone_size", center_zone_size),
                json_kv("edge_weight", edge_weight),
            ],
        );
        Ok(true)
    }

    fn log_responsive_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            if logger.enabled(level) {
                let event = event_with_fields(level, RESPONSIVE_TARGET, message, fields);
                let _ = logger.log_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::logging::MemorySink;
    use crate::zone::ZoneKind;

    fn adapter_at(
        width: f64,
        height: f64,
        signals: DeviceSignals,
    ) -> (ResponsiveAdapter, ManualClock) {
        let clock = ManualClock::new(0);
        let adapter = ResponsiveAdapter::new(
            Viewport::new(width, height),
            ZoneConfig::default().with_seed(5),
            signals,
        )
        .unwrap()
        .with_clock(clock.clone());
        (adapter, clock)
    }

    fn center_width(adapter: &ResponsiveAdapter) -> f64 {
        adapter.manager().get_zone("center").unwrap().bounds.x.length()
    }

    #[test]
    fn resize_waits_for_debounce() {
        let (mut adapter, clock) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        adapter.on_resize(Viewport::new(800.0, 600.0));

        clock.advance(100);
        assert!(!adapter.poll().unwrap());
        assert_eq!(adapter.manager().layout().viewport(), Viewport::new(1920.0, 1080.0));

        clock.advance(200);
        assert!(adapter.poll().unwrap());
        let center = adapter.manager().get_zone("center").unwrap().center;
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
        assert!(adapter.pending().is_none());
    }

    #[test]
    fn repeated_resizes_coalesce() {
        let (mut adapter, clock) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        assert_eq!(adapter.on_resize(Viewport::new(800.0, 600.0)), None);
        clock.advance(200);
        assert_eq!(
            adapter.on_resize(Viewport::new(1024.0, 768.0)),
            Some(Viewport::new(800.0, 600.0))
        );

        clock.advance(200);
        assert!(!adapter.poll().unwrap());
        clock.advance(100);
        assert!(adapter.poll().unwrap());
        assert_eq!(adapter.viewport(), Viewport::new(1024.0, 768.0));
        assert_eq!(adapter.manager().generation(), 2);
    }

    #[test]
    fn low_tier_forces_edge_only() {
        let signals = DeviceSignals {
            tier: DeviceTier::Low,
            ..DeviceSignals::default()
        };
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, signals);
        assert!(adapter.is_constrained());
        assert_eq!(
            adapter.effective_strategy(SelectionStrategy::Organic),
            SelectionStrategy::EdgeOnly
        );
        for _ in 0..100 {
            let id = adapter.select_zone(SelectionStrategy::CenterWeighted).unwrap();
            assert_eq!(adapter.manager().get_zone(&id).unwrap().kind, ZoneKind::Edge);
        }
        for zone in adapter.manager().get_zones_by_type(ZoneKind::Edge) {
            assert_eq!(zone.weight, 1.2);
        }
    }

    #[test]
    fn reduced_motion_rebuilds_immediately() {
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        assert!(!adapter.is_constrained());
        assert!(adapter.set_reduced_motion(true).unwrap());
        assert_eq!(adapter.manager().generation(), 2);
        assert!(adapter.is_constrained());
        assert_eq!(adapter.manager().get_zone("edge-top").unwrap().weight, 1.2);

        assert!(!adapter.set_reduced_motion(true).unwrap());
        assert_eq!(adapter.manager().generation(), 2);
    }

    #[test]
    fn medium_tier_keeps_layout() {
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        assert!(!adapter.set_device_tier(DeviceTier::Medium).unwrap());
        assert_eq!(adapter.manager().generation(), 1);
        assert_eq!(adapter.signals().tier, DeviceTier::Medium);
    }

    #[test]
    fn small_screen_boosts_center() {
        let (adapter, _) = adapter_at(700.0, 500.0, DeviceSignals::default());
        assert!(adapter.is_small_screen());
        assert!(!adapter.is_constrained());
        assert!((center_width(&adapter) - 350.0).abs() < 1e-9);
        assert_eq!(
            adapter.effective_strategy(SelectionStrategy::CenterWeighted),
            SelectionStrategy::MobileOptimized
        );
        assert_eq!(
            adapter.effective_strategy(SelectionStrategy::Balanced),
            SelectionStrategy::Balanced
        );
    }

    #[test]
    fn tiny_screen_runs_constrained() {
        let (adapter, _) = adapter_at(320.0, 400.0, DeviceSignals::default());
        assert!(adapter.is_constrained());
        assert_eq!(
            adapter.effective_strategy(SelectionStrategy::Balanced),
            SelectionStrategy::EdgeOnly
        );
    }

    #[test]
    fn wide_desktop_uses_aspect_fallback() {
        let (adapter, _) = adapter_at(3840.0, 1080.0, DeviceSignals::default());
        assert!(!adapter.is_small_screen());
        assert!((center_width(&adapter) - 1152.0).abs() < 1e-9);
        assert!(!adapter.manager().config().aspect_fallback);
    }

    #[test]
    fn identical_resize_keeps_generation() {
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        adapter.record_zone_usage("center");
        adapter.on_resize(Viewport::new(1920.0, 1080.0));
        assert!(!adapter.flush().unwrap());
        assert_eq!(adapter.manager().generation(), 1);
        assert_eq!(adapter.manager().get_zone("center").unwrap().total_usage, 1);
    }

    #[test]
    fn signal_rebuild_keeps_resized_viewport() {
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        adapter.on_resize(Viewport::new(1280.0, 1024.0));
        assert!(adapter.flush().unwrap());
        assert!(adapter.set_low_battery(true).unwrap());

        let manager = adapter.manager();
        assert_eq!(manager.layout().viewport(), Viewport::new(1280.0, 1024.0));
        assert_eq!(manager.get_zone("edge-left").unwrap().weight, 1.2);
        assert_eq!(manager.generation(), 3);
    }

    #[test]
    fn rebuild_starts_from_clean_slate() {
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        adapter.record_zone_usage("center");
        adapter.record_zone_usage("edge-left");
        adapter.on_resize(Viewport::new(1280.0, 1024.0));
        assert!(adapter.flush().unwrap());

        let manager = adapter.manager();
        assert!(manager.history().is_empty());
        assert_eq!(manager.get_zone("center").unwrap().total_usage, 0);
        assert_eq!(manager.get_distribution_stats().center_utilization, 0.0);
        assert!(!adapter.record_zone_release("edge-diagonal"));
    }

    #[test]
    fn flush_without_pending_is_noop() {
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        assert!(!adapter.flush().unwrap());
        assert!(!adapter.poll().unwrap());
    }

    #[test]
    fn orientation_flip_is_logged() {
        let sink = MemorySink::new();
        let (adapter, _) = adapter_at(1920.0, 1080.0, DeviceSignals::default());
        let mut adapter = adapter.with_logger(Logger::new(sink.clone()));

        adapter.on_resize(Viewport::new(1080.0, 1920.0));
        assert!(adapter.flush().unwrap());

        assert_eq!(
            sink.messages(),
            [
                "resize_queued",
                "orientation_changed",
                "zones_initialized",
                "layout_rebuilt"
            ]
        );
        let events = sink.events();
        assert_eq!(events[1].target, RESPONSIVE_TARGET);
        assert_eq!(events[1].field("to"), Some(&json!("portrait")));
        assert_eq!(events[3].field("reason"), Some(&json!("resize")));
    }

    #[test]
    fn placement_respects_constraints() {
        let signals = DeviceSignals {
            low_battery: true,
            ..DeviceSignals::default()
        };
        let (mut adapter, _) = adapter_at(1920.0, 1080.0, signals);
        let placement = adapter.place_fragment(SelectionStrategy::Organic).unwrap();
        assert_eq!(placement.kind, ZoneKind::Edge);
    }

    #[test]
    fn tier_parses_from_lowercase() {
        assert_eq!("low".parse::<DeviceTier>().unwrap(), DeviceTier::Low);
        assert!("turbo".parse::<DeviceTier>().is_err());
        let signals: DeviceSignals = serde_json::from_str(r#"{ "tier": "medium" }"#).unwrap();
        assert_eq!(signals.tier, DeviceTier::Medium);
        assert!(!signals.reduced_motion);
    }

    #[test]
    fn invalid_responsive_config_is_rejected() {
        let responsive = ResponsiveConfig {
            constrained_edge_weight: 0.0,
            ..ResponsiveConfig::default()
        };
        let result = ResponsiveAdapter::with_config(
            Viewport::new(800.0, 600.0),
            ZoneConfig::default(),
            responsive,
            DeviceSignals::default(),
        );
        assert!(matches!(result, Err(ScatterError::InvalidConfig(_))));
    }
}
