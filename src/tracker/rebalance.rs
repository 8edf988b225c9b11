use serde::Serialize;

use crate::config::ZoneConfig;
use crate::layout::ZoneLayout;
use crate::zone::ZoneId;

use super::stats::is_over_dense;

/// Outcome of one rebalancing pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RebalanceReport {
    /// Over-dense zones whose weight was damped.
    pub penalized: Vec<ZoneId>,
    /// Zones below their base weight that were relaxed back toward it.
    pub relaxed: Vec<ZoneId>,
    pub average_density: f64,
    pub threshold: f64,
}

impl RebalanceReport {
    pub fn is_noop(&self) -> bool {
        self.penalized.is_empty() && self.relaxed.is_empty()
    }
}

/// Damp the weight of every over-dense zone and relax the others toward
/// their base weight.
///
/// Damped weights are floored at `config.min_weight`, so repeated passes over
/// a persistently hot zone converge on the floor.
pub fn rebalance(layout: &mut ZoneLayout, config: &ZoneConfig) -> RebalanceReport {
    let average_density = layout.average_density();
    let mut report = RebalanceReport {
        average_density,
        threshold: average_density * config.max_density_ratio,
        ..RebalanceReport::default()
    };

    for zone in layout.iter_mut() {
        if is_over_dense(zone, average_density, config.max_density_ratio) {
            let damped = zone.weight() * config.rebalance_damping;
            zone.set_weight(damped, config.min_weight);
            report.penalized.push(zone.id().to_string());
        } else if zone.weight() < zone.base_weight() {
            let gap = zone.base_weight() - zone.weight();
            let relaxed = (zone.weight() + gap * config.weight_recovery).min(zone.base_weight());
            zone.set_weight(relaxed, config.min_weight);
            report.relaxed.push(zone.id().to_string());
        }
    }

    report
}
