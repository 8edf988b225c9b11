use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ScatterError;
use crate::geometry::{Bounds, Point};

pub type ZoneId = String;

/// Semantic role of a zone within the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Edge,
    Center,
    Transition,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 3] = [ZoneKind::Edge, ZoneKind::Center, ZoneKind::Transition];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Edge => "edge",
            ZoneKind::Center => "center",
            ZoneKind::Transition => "transition",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneKind {
    type Err = ScatterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "edge" => Ok(ZoneKind::Edge),
            "center" => Ok(ZoneKind::Center),
            "transition" => Ok(ZoneKind::Transition),
            other => Err(ScatterError::UnknownZoneKind(other.to_string())),
        }
    }
}

/// Rectangular viewport region with live usage statistics.
#[derive(Debug, Clone)]
pub struct Zone {
    id: ZoneId,
    kind: ZoneKind,
    bounds: Bounds,
    weight: f64,
    base_weight: f64,
    active_count: u32,
    total_usage: u64,
    last_used: Option<u64>,
}

impl Zone {
    pub fn new(id: impl Into<ZoneId>, kind: ZoneKind, bounds: Bounds, weight: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            bounds,
            weight,
            base_weight: weight,
            active_count: 0,
            total_usage: 0,
            last_used: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn base_weight(&self) -> f64 {
        self.base_weight
    }

    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    pub fn total_usage(&self) -> u64 {
        self.total_usage
    }

    pub fn last_used(&self) -> Option<u64> {
        self.last_used
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.bounds.contains(x, y)
    }

    pub fn area(&self) -> f64 {
        self.bounds.area()
    }

    /// Active placements per unit area. Zero-area zones always report 0.
    pub fn density(&self) -> f64 {
        let area = self.area();
        if area > 0.0 {
            f64::from(self.active_count) / area
        } else {
            0.0
        }
    }

    /// Uniform point inside the bounds inset by `margin` of each axis span.
    pub fn random_position<R: Rng + ?Sized>(&self, margin: f64, rng: &mut R) -> Point {
        let x = self.bounds.x.shrink(margin);
        let y = self.bounds.y.shrink(margin);
        Point::new(sample(rng, x.min, x.max), sample(rng, y.min, y.max))
    }

    pub fn record_usage(&mut self, now_ms: u64) {
        self.active_count = self.active_count.saturating_add(1);
        self.total_usage = self.total_usage.saturating_add(1);
        self.last_used = Some(now_ms);
    }

    pub fn release(&mut self) {
        self.active_count = self.active_count.saturating_sub(1);
    }

    /// Set the selection weight, clamped to at least `floor`. A non-positive
    /// floor is replaced by `f64::MIN_POSITIVE` so the weight stays selectable.
    pub fn set_weight(&mut self, weight: f64, floor: f64) {
        let floor = if floor > 0.0 { floor } else { f64::MIN_POSITIVE };
        self.weight = if weight.is_finite() {
            weight.max(floor)
        } else {
            self.base_weight.max(floor)
        };
    }

    /// Read-only snapshot handed to collaborators.
    pub fn view(&self) -> ZoneView {
        ZoneView {
            id: self.id.clone(),
            kind: self.kind,
            bounds: self.bounds,
            weight: self.weight,
            base_weight: self.base_weight,
            active_count: self.active_count,
            total_usage: self.total_usage,
            last_used: self.last_used,
            area: self.area(),
            density: self.density(),
            center: self.center(),
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneView {
    pub id: ZoneId,
    pub kind: ZoneKind,
    pub bounds: Bounds,
    pub weight: f64,
    pub base_weight: f64,
    pub active_count: u32,
    pub total_usage: u64,
    pub last_used: Option<u64>,
    pub area: f64,
    pub density: f64,
    pub center: Point,
}
