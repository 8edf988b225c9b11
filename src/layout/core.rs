use std::collections::HashMap;

use blake3::Hash;

use crate::config::ZoneConfig;
use crate::geometry::{Bounds, Orientation, Span, Viewport};
use crate::zone::{Zone, ZoneId, ZoneKind};

pub const EDGE_ZONE_COUNT: usize = 4;
pub const CENTER_ZONE_COUNT: usize = 5;
pub const TRANSITION_ZONE_COUNT: usize = 4;
pub const ZONE_COUNT: usize = EDGE_ZONE_COUNT + CENTER_ZONE_COUNT + TRANSITION_ZONE_COUNT;

/// Ordered, keyed set of zones for one viewport generation.
#[derive(Debug, Clone)]
pub struct ZoneLayout {
    zones: Vec<Zone>,
    index: HashMap<ZoneId, usize>,
    viewport: Viewport,
    orientation: Orientation,
    generation: u64,
    signature: Hash,
}

impl ZoneLayout {
    /// Layout without zones. Selection against it fails with `InvalidState`.
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            zones: Vec::new(),
            index: HashMap::new(),
            viewport,
            orientation: viewport.orientation(),
            generation: 0,
            signature: blake3::hash(&[]),
        }
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fingerprint of the viewport and the configuration the layout was built from.
    pub fn signature(&self) -> Hash {
        self.signature
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&Zone> {
        self.index.get(id).map(|&idx| &self.zones[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Zone> {
        match self.index.get(id) {
            Some(&idx) => self.zones.get_mut(idx),
            None => None,
        }
    }

    pub fn by_kind(&self, kind: ZoneKind) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |zone| zone.kind() == kind)
    }

    pub fn count_of(&self, kind: ZoneKind) -> usize {
        self.by_kind(kind).count()
    }

    /// Arithmetic mean of the zone densities; zero for an empty layout.
    pub fn average_density(&self) -> f64 {
        if self.zones.is_empty() {
            return 0.0;
        }
        let total: f64 = self.zones.iter().map(Zone::density).sum();
        total / self.zones.len() as f64
    }

    pub fn total_area(&self) -> f64 {
        self.zones.iter().map(Zone::area).sum()
    }

    pub fn total_active(&self) -> u64 {
        self.zones
            .iter()
            .map(|zone| u64::from(zone.active_count()))
            .sum()
    }

    fn push(&mut self, zone: Zone) {
        self.index.insert(zone.id().to_string(), self.zones.len());
        self.zones.push(zone);
    }
}

/// Computes the 13-zone layout for a viewport.
///
/// The build is a pure function of its inputs. The configuration is used as
/// given; callers that want the extreme aspect ratio fallback pass the result
/// of [`ZoneConfig::for_viewport`].
pub fn build(viewport: Viewport, config: &ZoneConfig) -> ZoneLayout {
    let area = viewport.clamped_to(config.min_viewport_dimension);
    let mut layout = ZoneLayout {
        zones: Vec::with_capacity(ZONE_COUNT),
        index: HashMap::with_capacity(ZONE_COUNT),
        viewport,
        orientation: viewport.orientation(),
        generation: 0,
        signature: signature(viewport, config),
    };

    for zone in edge_zones(area, config) {
        layout.push(zone);
    }
    for zone in center_zones(area, config) {
        layout.push(zone);
    }
    for zone in transition_zones(area, config) {
        layout.push(zone);
    }

    layout
}

fn edge_thickness(area: Viewport, config: &ZoneConfig) -> f64 {
    config.edge_margin * area.min_dimension()
}

fn edge_zones(area: Viewport, config: &ZoneConfig) -> [Zone; EDGE_ZONE_COUNT] {
    let (w, h) = (area.width, area.height);
    let t = edge_thickness(area, config);
    let weight = config.weights.edge;
    let edge = |id: &str, x: Span, y: Span| {
        Zone::new(
            id,
            ZoneKind::Edge,
            Bounds::new(x, y).clamp_to(area),
            weight,
        )
    };

    [
        edge("edge-top", Span::new(0.0, w), Span::new(0.0, t)),
        edge("edge-right", Span::new(w - t, w), Span::new(0.0, h)),
        edge("edge-bottom", Span::new(0.0, w), Span::new(h - t, h)),
        edge("edge-left", Span::new(0.0, t), Span::new(0.0, h)),
    ]
}

fn center_zones(area: Viewport, config: &ZoneConfig) -> [Zone; CENTER_ZONE_COUNT] {
    let (cx, cy) = (area.width / 2.0, area.height / 2.0);
    let cw = config.center_zone_size * area.width;
    let ch = config.center_zone_size * area.height;
    let weight = config.weights.center;

    // Sub-centers are half-size tiles straddling each corner of the primary zone.
    let sub = |n: usize, dx: f64, dy: f64| {
        let (sx, sy) = (cx + dx * cw / 2.0, cy + dy * ch / 2.0);
        Zone::new(
            format!("center-{n}"),
            ZoneKind::Center,
            Bounds::new(
                Span::new(sx - cw / 4.0, sx + cw / 4.0),
                Span::new(sy - ch / 4.0, sy + ch / 4.0),
            )
            .clamp_to(area),
            weight,
        )
    };

    [
        Zone::new(
            "center",
            ZoneKind::Center,
            Bounds::new(
                Span::new(cx - cw / 2.0, cx + cw / 2.0),
                Span::new(cy - ch / 2.0, cy + ch / 2.0),
            )
            .clamp_to(area),
            weight,
        ),
        sub(1, -1.0, -1.0),
        sub(2, 1.0, -1.0),
        sub(3, -1.0, 1.0),
        sub(4, 1.0, 1.0),
    ]
}

fn transition_zones(area: Viewport, config: &ZoneConfig) -> [Zone; TRANSITION_ZONE_COUNT] {
    let (w, h) = (area.width, area.height);
    let t = edge_thickness(area, config);
    let tw = config.transition_zone_width * w;
    let th = config.transition_zone_width * h;
    let weight = config.weights.transition;

    let left = Span::new(t, t + tw);
    let right = Span::new(w - t - tw, w - t);
    let top = Span::new(t, t + th);
    let bottom = Span::new(h - t - th, h - t);
    let transition = |id: &str, x: Span, y: Span| {
        Zone::new(
            id,
            ZoneKind::Transition,
            Bounds::new(x, y).clamp_to(area),
            weight,
        )
    };

    [
        transition("transition-top-left", left, top),
        transition("transition-top-right", right, top),
        transition("transition-bottom-left", left, bottom),
        transition("transition-bottom-right", right, bottom),
    ]
}

/// Fingerprint of the inputs that shape a layout: viewport, zone geometry
/// fractions and kind weights.
pub fn signature(viewport: Viewport, config: &ZoneConfig) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for value in [
        viewport.width,
        viewport.height,
        config.edge_margin,
        config.center_zone_size,
        config.transition_zone_width,
        config.min_viewport_dimension,
        config.weights.edge,
        config.weights.center,
        config.weights.transition,
    ] {
        hasher.update(&value.to_le_bytes());
    }
    hasher.finalize()
}
