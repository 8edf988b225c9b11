use std::collections::BTreeMap;

use serde::Serialize;

use crate::layout::ZoneLayout;
use crate::zone::{Zone, ZoneId, ZoneKind};

/// True when the zone's density exceeds `average_density * max_density_ratio`.
pub fn is_over_dense(zone: &Zone, average_density: f64, max_density_ratio: f64) -> bool {
    zone.density() > average_density * max_density_ratio
}

/// Share of all active placements that sit in center zones; 0 when nothing is active.
pub fn center_utilization(layout: &ZoneLayout) -> f64 {
    let total = layout.total_active();
    if total == 0 {
        return 0.0;
    }
    let center: u64 = layout
        .by_kind(ZoneKind::Center)
        .map(|zone| u64::from(zone.active_count()))
        .sum();
    center as f64 / total as f64
}

/// Share of each zone's weight taken from its area; the rest is uniform.
const AREA_WEIGHT_BLEND: f64 = 0.5;

/// Evenness of active placements, in `(0, 1]`.
///
/// Each zone's load is its active count relative to the mean count. The
/// score is `1 / (1 + σ²/μ²)` over those loads, with mean and variance
/// weighted by `½·(1/n) + ½·(area share)`. The uniform half keeps tiny zones
/// from hiding a hotspot: one zone at ten times the others stays below 0.5
/// on any viewport. Equal usage and an idle layout both score 1.
pub fn balance_score(layout: &ZoneLayout) -> f64 {
    let total_active = layout.total_active();
    if total_active == 0 || layout.is_empty() {
        return 1.0;
    }

    let count = layout.len() as f64;
    let total_area = layout.total_area();
    let mean_active = total_active as f64 / count;
    let weighted: Vec<(f64, f64)> = layout
        .iter()
        .map(|zone| {
            let area_share = if total_area > 0.0 {
                zone.area() / total_area
            } else {
                1.0 / count
            };
            let weight = (1.0 - AREA_WEIGHT_BLEND) / count + AREA_WEIGHT_BLEND * area_share;
            let load = f64::from(zone.active_count()) / mean_active;
            (weight, load)
        })
        .collect();

    let mean: f64 = weighted.iter().map(|(weight, load)| weight * load).sum();
    if mean <= 0.0 {
        return 1.0;
    }
    let variance: f64 = weighted
        .iter()
        .map(|(weight, load)| weight * (load - mean).powi(2))
        .sum();

    (1.0 / (1.0 + variance / (mean * mean))).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneTypeCounts {
    pub edge: usize,
    pub center: usize,
    pub transition: usize,
}

/// Aggregate view of the current generation handed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionStats {
    pub zone_density: BTreeMap<ZoneId, f64>,
    pub center_utilization: f64,
    pub balance_score: f64,
    pub total_zones: usize,
    pub zone_types: ZoneTypeCounts,
    pub average_density: f64,
}

impl DistributionStats {
    pub fn collect(layout: &ZoneLayout) -> Self {
        let zone_density = layout
            .iter()
            .map(|zone| (zone.id().to_string(), zone.density()))
            .collect();
        Self {
            zone_density,
            center_utilization: center_utilization(layout),
            balance_score: balance_score(layout),
            total_zones: layout.len(),
            zone_types: ZoneTypeCounts {
                edge: layout.count_of(ZoneKind::Edge),
                center: layout.count_of(ZoneKind::Center),
                transition: layout.count_of(ZoneKind::Transition),
            },
            average_density: layout.average_density(),
        }
    }
}
