//! Zone engine configuration.
//!
//! A `ZoneConfig` is owned by the manager that uses it. The responsive adapter
//! derives adjusted copies per viewport/device signal instead of mutating a
//! shared instance.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScatterError};
use crate::geometry::Viewport;

/// Aspect ratio (width / height) at or above which a viewport counts as extremely wide.
pub const EXTREME_WIDE_ASPECT: f64 = 2.5;
/// Aspect ratio at or below which a viewport counts as extremely tall.
pub const EXTREME_TALL_ASPECT: f64 = 0.5;

/// Upper bound for every zone geometry fraction.
pub const MAX_ZONE_FRACTION: f64 = 0.5;

const WIDE_CENTER_ZONE_SIZE: f64 = 0.3;
const WIDE_TRANSITION_ZONE_WIDTH: f64 = 0.2;
const TALL_CENTER_ZONE_SIZE: f64 = 0.5;
const TALL_TRANSITION_ZONE_WIDTH: f64 = 0.1;

/// Base selection weights assigned to each zone kind at build time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneWeights {
    pub edge: f64,
    pub center: f64,
    pub transition: f64,
}

impl Default for ZoneWeights {
    fn default() -> Self {
        Self {
            edge: 0.8,
            center: 1.5,
            transition: 1.0,
        }
    }
}

/// Aspect ratio class used by the extreme-viewport fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectClass {
    Regular,
    ExtremeWide,
    ExtremeTall,
}

impl AspectClass {
    pub fn of(viewport: Viewport) -> Self {
        let aspect = viewport.aspect_ratio();
        if aspect >= EXTREME_WIDE_ASPECT {
            AspectClass::ExtremeWide
        } else if aspect <= EXTREME_TALL_ASPECT {
            AspectClass::ExtremeTall
        } else {
            AspectClass::Regular
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Fraction of the smaller viewport dimension used as edge band thickness.
    pub edge_margin: f64,
    /// Fraction of each viewport axis covered by the primary center zone.
    pub center_zone_size: f64,
    /// Fraction of each viewport axis covered by a corner transition band.
    pub transition_zone_width: f64,
    /// Density multiple of the average above which a zone counts as too dense.
    pub max_density_ratio: f64,
    /// Debounce applied to resize/orientation events before rebuilding.
    pub orientation_change_delay_ms: u64,
    pub max_history_size: usize,
    /// Zones idle for longer than this receive the recency bonus.
    pub recency_window_ms: u64,
    pub recency_bonus: f64,
    pub density_penalty: f64,
    /// Number of trailing history entries inspected by the organic strategy.
    pub organic_window: usize,
    /// Recorded usages between automatic rebalances. Zero disables them.
    pub rebalance_interval: u32,
    pub rebalance_damping: f64,
    pub min_weight: f64,
    /// Share of the gap to the base weight recovered per rebalance by zones
    /// that are not over-dense.
    pub weight_recovery: f64,
    pub min_viewport_dimension: f64,
    /// Inset fraction applied when sampling a position inside a zone.
    pub placement_margin: f64,
    pub weights: ZoneWeights,
    /// Apply [`ZoneConfig::for_viewport`] when a layout is initialized.
    pub aspect_fallback: bool,
    /// Seed for the selection RNG. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            edge_margin: 0.1,
            center_zone_size: 0.4,
            transition_zone_width: 0.15,
            max_density_ratio: 2.0,
            orientation_change_delay_ms: 300,
            max_history_size: 50,
            recency_window_ms: 5_000,
            recency_bonus: 1.5,
            density_penalty: 0.3,
            organic_window: 5,
            rebalance_interval: 10,
            rebalance_damping: 0.6,
            min_weight: 0.05,
            weight_recovery: 0.25,
            min_viewport_dimension: 1.0,
            placement_margin: 0.1,
            weights: ZoneWeights::default(),
            aspect_fallback: true,
            seed: None,
        }
    }
}

impl ZoneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: ZoneConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("edge_margin", self.edge_margin)?;
        check_fraction("center_zone_size", self.center_zone_size)?;
        check_fraction("transition_zone_width", self.transition_zone_width)?;
        check_positive("max_density_ratio", self.max_density_ratio)?;
        check_positive("recency_bonus", self.recency_bonus)?;
        check_positive("density_penalty", self.density_penalty)?;
        check_positive("min_weight", self.min_weight)?;
        check_positive("weights.edge", self.weights.edge)?;
        check_positive("weights.center", self.weights.center)?;
        check_positive("weights.transition", self.weights.transition)?;
        check_positive("min_viewport_dimension", self.min_viewport_dimension)?;

        if !(self.rebalance_damping > 0.0 && self.rebalance_damping < 1.0) {
            return Err(ScatterError::InvalidConfig(format!(
                "rebalance_damping must be in (0, 1), got {}",
                self.rebalance_damping
            )));
        }
        if !(0.0..=1.0).contains(&self.weight_recovery) {
            return Err(ScatterError::InvalidConfig(format!(
                "weight_recovery must be in [0, 1], got {}",
                self.weight_recovery
            )));
        }
        if !(0.0..=1.0).contains(&self.placement_margin) {
            return Err(ScatterError::InvalidConfig(format!(
                "placement_margin must be in [0, 1], got {}",
                self.placement_margin
            )));
        }
        if self.max_history_size == 0 {
            return Err(ScatterError::InvalidConfig(
                "max_history_size must be at least 1".to_string(),
            ));
        }
        if self.organic_window == 0 {
            return Err(ScatterError::InvalidConfig(
                "organic_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of this configuration with the extreme aspect ratio fallback applied.
    pub fn for_viewport(&self, viewport: Viewport) -> Self {
        let mut adjusted = self.clone();
        match AspectClass::of(viewport) {
            AspectClass::ExtremeWide => {
                adjusted.center_zone_size = WIDE_CENTER_ZONE_SIZE;
                adjusted.transition_zone_width = WIDE_TRANSITION_ZONE_WIDTH;
            }
            AspectClass::ExtremeTall => {
                adjusted.center_zone_size = TALL_CENTER_ZONE_SIZE;
                adjusted.transition_zone_width = TALL_TRANSITION_ZONE_WIDTH;
            }
            AspectClass::Regular => {}
        }
        adjusted
    }

    /// Configuration a layout for `viewport` is actually built from.
    pub fn effective_for(&self, viewport: Viewport) -> Self {
        if self.aspect_fallback {
            self.for_viewport(viewport)
        } else {
            self.clone()
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= MAX_ZONE_FRACTION {
        Ok(())
    } else {
        Err(ScatterError::InvalidConfig(format!(
            "{name} must be in (0, {MAX_ZONE_FRACTION}], got {value}"
        )))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ScatterError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
