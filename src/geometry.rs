use serde::{Deserialize, Serialize};

/// Viewport dimensions in pixels as reported by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width >= self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Width over height. A zero height reports an infinitely wide viewport.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            f64::INFINITY
        } else {
            self.width / self.height
        }
    }

    /// Same viewport with both dimensions raised to at least `floor`.
    pub fn clamped_to(&self, floor: f64) -> Self {
        Self {
            width: self.width.max(floor),
            height: self.height.max(floor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Closed interval on one axis. `min <= max` holds for every constructed span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    /// Build a span, collapsing an inverted range onto `min`.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Intersect with `[lo, hi]`, keeping the span well formed.
    pub fn clamp_to(&self, lo: f64, hi: f64) -> Self {
        let min = self.min.clamp(lo, hi);
        let max = self.max.clamp(lo, hi);
        Self::new(min, max)
    }

    /// Shrink both ends by `margin` of the length. Margins of one half or
    /// more collapse the span onto its midpoint.
    pub fn shrink(&self, margin: f64) -> Self {
        let margin = margin.max(0.0);
        if margin >= 0.5 {
            let mid = self.midpoint();
            return Self { min: mid, max: mid };
        }
        let inset = self.length() * margin;
        Self::new(self.min + inset, self.max - inset)
    }
}

/// Axis-aligned rectangle in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: Span,
    pub y: Span,
}

impl Bounds {
    pub fn new(x: Span, y: Span) -> Self {
        Self { x, y }
    }

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Span::new(x, x + width.max(0.0)),
            y: Span::new(y, y + height.max(0.0)),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x.midpoint(), self.y.midpoint())
    }

    pub fn area(&self) -> f64 {
        self.x.length() * self.y.length()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }

    pub fn clamp_to(&self, viewport: Viewport) -> Self {
        Self {
            x: self.x.clamp_to(0.0, viewport.width),
            y: self.y.clamp_to(0.0, viewport.height),
        }
    }
}
