use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ZoneConfig;
use crate::error::{Result, ScatterError};
use crate::layout::ZoneLayout;
use crate::tracker::{DistributionHistory, is_over_dense};
use crate::zone::{Zone, ZoneId, ZoneKind};

/// Chance of drawing from the center zones under `CenterWeighted`.
pub const CENTER_PROBABILITY: f64 = 0.7;
/// Chance of drawing from the center zones under `MobileOptimized`.
pub const MOBILE_CENTER_PROBABILITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Weighted draw over every zone.
    #[default]
    Balanced,
    /// Center zones with probability 0.7, the rest otherwise.
    CenterWeighted,
    /// Center zones with probability 0.8, the rest otherwise.
    MobileOptimized,
    /// Edge zones only.
    EdgeOnly,
    /// Steers away from long runs of one zone kind in the recent history.
    Organic,
}

impl SelectionStrategy {
    pub const ALL: [SelectionStrategy; 5] = [
        SelectionStrategy::Balanced,
        SelectionStrategy::CenterWeighted,
        SelectionStrategy::MobileOptimized,
        SelectionStrategy::EdgeOnly,
        SelectionStrategy::Organic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::Balanced => "balanced",
            SelectionStrategy::CenterWeighted => "center-weighted",
            SelectionStrategy::MobileOptimized => "mobile-optimized",
            SelectionStrategy::EdgeOnly => "edge-only",
            SelectionStrategy::Organic => "organic",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = ScatterError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        SelectionStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == value)
            .ok_or_else(|| ScatterError::UnknownStrategy(value.to_string()))
    }
}

/// Read-only inputs shared by every strategy.
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    pub layout: &'a ZoneLayout,
    pub history: &'a DistributionHistory,
    pub config: &'a ZoneConfig,
    pub now_ms: u64,
}

/// Zone paired with its effective weight for one draw.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub zone: &'a Zone,
    pub weight: f64,
}

/// `weight × density penalty × recency bonus` for one zone.
pub fn effective_weight(
    zone: &Zone,
    average_density: f64,
    config: &ZoneConfig,
    now_ms: u64,
) -> f64 {
    let penalty = if is_over_dense(zone, average_density, config.max_density_ratio) {
        config.density_penalty
    } else {
        1.0
    };
    let stale = match zone.last_used() {
        Some(last) => now_ms.saturating_sub(last) > config.recency_window_ms,
        None => true,
    };
    let bonus = if stale { config.recency_bonus } else { 1.0 };
    zone.weight() * penalty * bonus
}

/// Cumulative-weight walk for a pre-drawn `r` in `[0, total weight)`.
///
/// Candidates are visited in order, so equal spans resolve to the earlier
/// zone. Rounding past the end lands on the last candidate.
pub fn roulette<'a>(candidates: &[Candidate<'a>], mut r: f64) -> Option<&'a Zone> {
    for candidate in candidates {
        if r < candidate.weight {
            return Some(candidate.zone);
        }
        r -= candidate.weight;
    }
    candidates.last().map(|candidate| candidate.zone)
}

/// Pick a zone id from the layout according to `strategy`.
pub fn select<R: Rng + ?Sized>(
    ctx: SelectionContext<'_>,
    strategy: SelectionStrategy,
    rng: &mut R,
) -> Result<ZoneId> {
    if ctx.layout.is_empty() {
        return Err(ScatterError::InvalidState(
            "cannot select a zone from an empty layout".to_string(),
        ));
    }

    let zone = match strategy {
        SelectionStrategy::Balanced => balanced(ctx, rng, |_| true),
        SelectionStrategy::CenterWeighted => center_weighted(ctx, rng, CENTER_PROBABILITY),
        SelectionStrategy::MobileOptimized => {
            center_weighted(ctx, rng, MOBILE_CENTER_PROBABILITY)
        }
        SelectionStrategy::EdgeOnly => {
            balanced(ctx, rng, |zone| zone.kind() == ZoneKind::Edge)
                .or_else(|| balanced(ctx, rng, |_| true))
        }
        SelectionStrategy::Organic => organic(ctx, rng),
    };

    zone.map(|zone| zone.id().to_string())
        .ok_or_else(|| ScatterError::InvalidState("no selectable zone".to_string()))
}

fn balanced<'a, R, F>(ctx: SelectionContext<'a>, rng: &mut R, filter: F) -> Option<&'a Zone>
where
    R: Rng + ?Sized,
    F: Fn(&Zone) -> bool,
{
    let average_density = ctx.layout.average_density();
    let candidates: Vec<Candidate<'a>> = ctx
        .layout
        .iter()
        .filter(|zone| filter(*zone))
        .map(|zone| Candidate {
            zone,
            weight: effective_weight(zone, average_density, ctx.config, ctx.now_ms),
        })
        .collect();

    let total: f64 = candidates.iter().map(|candidate| candidate.weight).sum();
    let r = if total > 0.0 && total.is_finite() {
        rng.gen_range(0.0..total)
    } else {
        0.0
    };
    roulette(&candidates, r)
}

fn center_weighted<'a, R: Rng + ?Sized>(
    ctx: SelectionContext<'a>,
    rng: &mut R,
    center_probability: f64,
) -> Option<&'a Zone> {
    let prefer_center = rng.gen_bool(center_probability);
    balanced(ctx, rng, |zone| {
        (zone.kind() == ZoneKind::Center) == prefer_center
    })
    .or_else(|| balanced(ctx, rng, |_| true))
}

fn organic<'a, R: Rng + ?Sized>(ctx: SelectionContext<'a>, rng: &mut R) -> Option<&'a Zone> {
    let window = ctx.config.organic_window;
    if ctx.history.len() < window {
        return balanced(ctx, rng, |_| true);
    }

    let kinds: Vec<Option<ZoneKind>> = ctx
        .history
        .recent(window)
        .map(|entry| ctx.layout.get(&entry.zone_id).map(Zone::kind))
        .collect();
    let all_of = |kind: ZoneKind| kinds.iter().all(|k| *k == Some(kind));

    if all_of(ZoneKind::Edge) {
        center_weighted(ctx, rng, CENTER_PROBABILITY)
    } else if all_of(ZoneKind::Center) {
        balanced(ctx, rng, |zone| zone.kind() == ZoneKind::Transition)
            .or_else(|| balanced(ctx, rng, |_| true))
    } else {
        balanced(ctx, rng, |_| true)
    }
}
