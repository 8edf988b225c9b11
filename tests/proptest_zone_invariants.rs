//! Property-based invariant tests for the zone distribution engine.
//!
//! 1. Every viewport yields thirteen zones with positive area inside it
//! 2. Active counts mirror a saturating usage/release model
//! 3. Densities, weights and aggregate scores stay finite and in range
//! 4. History is bounded and keeps the most recent usages in order
//! 5. Edge-only selection never leaves the edge bands
//! 6. Same seed and operations give the same selections
//! 7. A zone used ten times more than the rest scores below 0.5

use std::collections::HashMap;

use proptest::prelude::*;
use room_scatter::{
    ManualClock, SelectionStrategy, Viewport, ZONE_COUNT, ZoneConfig, ZoneKind, ZoneManager,
};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Use(usize),
    Release(usize),
    Stale,
    Advance(u64),
    Rebalance,
    Select(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..ZONE_COUNT).prop_map(Op::Use),
        2 => (0usize..ZONE_COUNT).prop_map(Op::Release),
        1 => Just(Op::Stale),
        2 => (0u64..10_000).prop_map(Op::Advance),
        1 => Just(Op::Rebalance),
        2 => (0usize..SelectionStrategy::ALL.len()).prop_map(Op::Select),
    ]
}

fn viewport_strategy() -> impl Strategy<Value = Viewport> {
    (0.0f64..6_000.0, 0.0f64..6_000.0).prop_map(|(w, h)| Viewport::new(w, h))
}

fn zone_ids(manager: &ZoneManager) -> Vec<String> {
    manager
        .layout()
        .iter()
        .map(|zone| zone.id().to_string())
        .collect()
}

fn seeded(viewport: Viewport, config: ZoneConfig, clock: &ManualClock) -> ZoneManager {
    ZoneManager::new(viewport, config.with_seed(42))
        .unwrap()
        .with_clock(clock.clone())
}

/// Apply `ops`, returning every zone id chosen by a selection.
fn apply_ops(manager: &mut ZoneManager, clock: &ManualClock, ops: &[Op]) -> Vec<String> {
    let ids = zone_ids(manager);
    let mut chosen = Vec::new();
    for op in ops {
        match op {
            Op::Use(idx) => {
                manager.record_zone_usage(&ids[*idx]);
            }
            Op::Release(idx) => {
                manager.record_zone_release(&ids[*idx]);
            }
            Op::Stale => {
                manager.record_zone_usage("edge-previous-generation");
            }
            Op::Advance(ms) => clock.advance(*ms),
            Op::Rebalance => {
                manager.trigger_rebalancing();
            }
            Op::Select(idx) => {
                chosen.push(manager.select_zone(SelectionStrategy::ALL[*idx]).unwrap());
            }
        }
    }
    chosen
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Layout shape
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn any_viewport_builds_full_layout(viewport in viewport_strategy()) {
        let manager = ZoneManager::new(viewport, ZoneConfig::default()).unwrap();
        let layout = manager.layout();
        prop_assert_eq!(layout.len(), ZONE_COUNT);
        prop_assert_eq!(layout.count_of(ZoneKind::Edge), 4);
        prop_assert_eq!(layout.count_of(ZoneKind::Center), 5);
        prop_assert_eq!(layout.count_of(ZoneKind::Transition), 4);

        let width = viewport.width.max(1.0);
        let height = viewport.height.max(1.0);
        for zone in layout.iter() {
            let bounds = zone.bounds();
            prop_assert!(zone.area() > 0.0, "zone {} has no area", zone.id());
            prop_assert!(bounds.x.min >= 0.0 && bounds.x.max <= width);
            prop_assert!(bounds.y.min >= 0.0 && bounds.y.max <= height);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Active counts follow a saturating model
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn active_counts_match_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
        let clock = ManualClock::new(0);
        let mut manager = seeded(Viewport::new(1280.0, 720.0), ZoneConfig::default(), &clock);
        let ids = zone_ids(&manager);
        apply_ops(&mut manager, &clock, &ops);

        let mut active: HashMap<&str, u32> = HashMap::new();
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for op in &ops {
            match op {
                Op::Use(idx) => {
                    *active.entry(ids[*idx].as_str()).or_default() += 1;
                    *totals.entry(ids[*idx].as_str()).or_default() += 1;
                }
                Op::Release(idx) => {
                    let count = active.entry(ids[*idx].as_str()).or_default();
                    *count = count.saturating_sub(1);
                }
                _ => {}
            }
        }

        for id in &ids {
            let view = manager.get_zone(id).unwrap();
            prop_assert_eq!(view.active_count, active.get(id.as_str()).copied().unwrap_or(0));
            prop_assert_eq!(view.total_usage, totals.get(id.as_str()).copied().unwrap_or(0));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Numeric ranges
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scores_and_weights_stay_in_range(
        viewport in viewport_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..300),
    ) {
        let clock = ManualClock::new(0);
        let config = ZoneConfig::default();
        let min_weight = config.min_weight;
        let mut manager = seeded(viewport, config, &clock);
        apply_ops(&mut manager, &clock, &ops);

        for zone in manager.layout().iter() {
            prop_assert!(zone.density().is_finite());
            prop_assert!(zone.weight().is_finite());
            prop_assert!(
                zone.weight() >= min_weight,
                "zone {} weight {}", zone.id(), zone.weight()
            );
        }
        let stats = manager.get_distribution_stats();
        prop_assert!(
            (0.0..=1.0).contains(&stats.balance_score),
            "balance {}", stats.balance_score
        );
        prop_assert!((0.0..=1.0).contains(&stats.center_utilization));
        prop_assert!(stats.average_density.is_finite());
        prop_assert_eq!(stats.total_zones, ZONE_COUNT);
    }

    #[test]
    fn hammering_one_zone_keeps_weight_positive(
        zone in 0usize..ZONE_COUNT,
        rounds in 1usize..40,
    ) {
        let clock = ManualClock::new(0);
        let mut manager = seeded(Viewport::new(1920.0, 1080.0), ZoneConfig::default(), &clock);
        let id = zone_ids(&manager)[zone].clone();
        for _ in 0..rounds {
            for _ in 0..10 {
                manager.record_zone_usage(&id);
            }
            manager.trigger_rebalancing();
        }
        let view = manager.get_zone(&id).unwrap();
        prop_assert!(view.weight > 0.0);
        prop_assert!(view.weight <= view.base_weight);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. History bound and order
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn history_keeps_latest_usages(
        cap in 1usize..20,
        uses in prop::collection::vec(0usize..ZONE_COUNT, 0..80),
    ) {
        let clock = ManualClock::new(0);
        let config = ZoneConfig {
            max_history_size: cap,
            ..ZoneConfig::default()
        };
        let mut manager = seeded(Viewport::new(1024.0, 768.0), config, &clock);
        let ids = zone_ids(&manager);
        for idx in &uses {
            clock.advance(5);
            manager.record_zone_usage(&ids[*idx]);
        }

        let history = manager.history();
        prop_assert!(history.len() <= cap);
        prop_assert_eq!(history.len(), uses.len().min(cap));

        let expected: Vec<&str> = uses[uses.len() - history.len()..]
            .iter()
            .map(|idx| ids[*idx].as_str())
            .collect();
        let kept: Vec<&str> = history.iter().map(|entry| entry.zone_id.as_str()).collect();
        prop_assert_eq!(kept, expected);

        let stamps: Vec<u64> = history.iter().map(|entry| entry.timestamp).collect();
        prop_assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Edge-only selection
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edge_only_never_leaves_edges(
        viewport in viewport_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..100),
    ) {
        let clock = ManualClock::new(0);
        let mut manager = seeded(viewport, ZoneConfig::default(), &clock);
        apply_ops(&mut manager, &clock, &ops);
        for _ in 0..20 {
            let id = manager.select_zone(SelectionStrategy::EdgeOnly).unwrap();
            prop_assert_eq!(manager.get_zone(&id).unwrap().kind, ZoneKind::Edge);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Determinism
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn same_seed_same_selections(ops in prop::collection::vec(op_strategy(), 0..150)) {
        let viewport = Viewport::new(1440.0, 900.0);
        let clock_a = ManualClock::new(0);
        let clock_b = ManualClock::new(0);
        let mut a = seeded(viewport, ZoneConfig::default(), &clock_a);
        let mut b = seeded(viewport, ZoneConfig::default(), &clock_b);

        let chosen_a = apply_ops(&mut a, &clock_a, &ops);
        let chosen_b = apply_ops(&mut b, &clock_b, &ops);
        prop_assert_eq!(chosen_a, chosen_b);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 7. Balance score sensitivity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tenfold_hotspot_scores_below_half(
        viewport in viewport_strategy(),
        hot in 0usize..ZONE_COUNT,
        per_zone in 1u32..6,
    ) {
        let clock = ManualClock::new(0);
        let config = ZoneConfig {
            rebalance_interval: 0,
            ..ZoneConfig::default()
        };
        let mut manager = seeded(viewport, config, &clock);
        let ids = zone_ids(&manager);
        for id in &ids {
            for _ in 0..per_zone {
                manager.record_zone_usage(id);
            }
        }
        prop_assert!(
            manager.balance_score() > 0.5,
            "equal usage scored {}", manager.balance_score()
        );

        for _ in 0..per_zone * 9 {
            manager.record_zone_usage(&ids[hot]);
        }
        let score = manager.balance_score();
        prop_assert!(score < 0.5, "hot {} scored {}", ids[hot], score);
    }
}
