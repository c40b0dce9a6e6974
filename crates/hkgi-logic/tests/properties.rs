//! Property tests for the leveling model, the ledger and multiplier stacking.

use std::collections::BTreeMap;

use hkgi_logic::config::{EngineConfig, DEFAULT_LEVEL_CURVE};
use hkgi_logic::inventory::Inventory;
use hkgi_logic::kinds::{Family, ItemKind, PlantKind, Tier};
use hkgi_logic::leveling::{level_from_xp, level_progress, xp_per_yield_cycle};
use hkgi_logic::recipes::pick_weighted;
use hkgi_logic::status::{effective_multiplier, StatusEffect};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

const ITEMS: [ItemKind; 6] = [
    ItemKind::Essence(Family::Bbc),
    ItemKind::Seed(Family::Hvv),
    ItemKind::Booster(Family::Cyl),
    ItemKind::Powder(Tier::T1),
    ItemKind::NestEgg,
    ItemKind::LandDeed,
];

fn item() -> impl Strategy<Value = ItemKind> {
    (0..ITEMS.len()).prop_map(|i| ITEMS[i])
}

fn inventory() -> impl Strategy<Value = Inventory> {
    prop::collection::vec((item(), 0u64..50), 0..8).prop_map(|lines| lines.into_iter().collect())
}

fn costs() -> impl Strategy<Value = BTreeMap<ItemKind, u64>> {
    prop::collection::btree_map(item(), 0u64..50, 0..4)
}

fn plant_kind() -> impl Strategy<Value = PlantKind> {
    (0..PlantKind::ALL.len()).prop_map(|i| PlantKind::ALL[i])
}

// ── Leveling ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn level_is_monotonic(a in 0.0f64..600_000.0, b in 0.0f64..600_000.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let l_lo = level_from_xp(&DEFAULT_LEVEL_CURVE, lo).level;
        let l_hi = level_from_xp(&DEFAULT_LEVEL_CURVE, hi).level;
        prop_assert!(l_lo <= l_hi);
        prop_assert!(l_hi as usize <= DEFAULT_LEVEL_CURVE.len());
    }

    #[test]
    fn cycle_is_positive_and_bounded(xp in 0.0f64..1e7) {
        let config = EngineConfig::default();
        let cycle = xp_per_yield_cycle(&config, xp);
        prop_assert!(cycle > 0.0);
        prop_assert!(cycle <= config.base_cycle_xp);
    }

    #[test]
    fn level_progress_is_a_ratio(xp in 0.0f64..1e7) {
        let p = level_progress(&DEFAULT_LEVEL_CURVE, xp);
        prop_assert!((0.0..=1.0).contains(&p));
    }
}

// ── Ledger ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn debit_then_credit_restores(inv in inventory(), costs in costs()) {
        let mut working = inv.clone();
        if working.try_debit(&costs) {
            working.credit(&costs);
        }
        prop_assert_eq!(working, inv);
    }

    #[test]
    fn failed_debit_leaves_inventory_untouched(inv in inventory(), costs in costs()) {
        let mut working = inv.clone();
        let affordable = costs.iter().all(|(item, qty)| inv.count(*item) >= *qty);
        let debited = working.try_debit(&costs);
        prop_assert_eq!(debited, affordable);
        if !debited {
            prop_assert_eq!(working, inv);
        }
    }
}

// ── Status effects ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn multiplier_is_at_least_one(
        inv in inventory(),
        kind in plant_kind(),
        boosts in prop::collection::vec((0.0f64..100.0, 1i64..100_000), 0..5),
    ) {
        let effects: Vec<StatusEffect> = boosts
            .into_iter()
            .map(|(m, ms)| StatusEffect::ephemeral(ItemKind::Powder(Tier::T1), None, m, ms))
            .collect();
        let m = effective_multiplier(&effects, &inv, kind, 0.1);
        prop_assert!(m >= 1.0);
        if effects.is_empty() && inv.count(ItemKind::Booster(Family::Cyl)) == 0 {
            prop_assert_eq!(m, 1.0);
        }
    }
}

// ── Weighted outcomes ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn full_table_always_selects(roll in 0.0f64..1.0) {
        let table = [
            (0.7, ItemKind::Powder(Tier::T1)),
            (0.25, ItemKind::Powder(Tier::T2)),
            (0.05, ItemKind::Powder(Tier::T3)),
        ];
        prop_assert!(pick_weighted(&table, roll).is_some());
    }

    #[test]
    fn short_table_falls_back_to_last(roll in 0.6f64..1.0) {
        let table = [(0.5, ItemKind::Powder(Tier::T1)), (0.1, ItemKind::LandDeed)];
        prop_assert_eq!(pick_weighted(&table, roll), Some(ItemKind::LandDeed));
    }
}
