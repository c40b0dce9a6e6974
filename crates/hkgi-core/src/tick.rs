//! Tick scheduler - the one recurring driver of the simulation.
//!
//! Every period each stead has its ephemeral effects counted down, then each
//! planted plot grows at its effective multiplier and is paid out for the
//! yield boundaries it crossed.

use std::ops::AddAssign;

use hkgi_logic::config::EngineConfig;
use hkgi_logic::growth::{grow_plant, GrowthReport};
use hkgi_logic::kinds::{ItemKind, Tier};
use hkgi_logic::stead::Stead;
use hkgi_logic::status::{effective_multiplier, expire};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;

/// Totals for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub steads: usize,
    pub yields: u32,
    pub bag_drops: u32,
    pub effects_expired: usize,
    pub activity_pruned: usize,
}

impl AddAssign for TickReport {
    fn add_assign(&mut self, other: Self) {
        self.steads += other.steads;
        self.yields += other.yields;
        self.bag_drops += other.bag_drops;
        self.effects_expired += other.effects_expired;
        self.activity_pruned += other.activity_pruned;
    }
}

/// Advance a single stead by one period.
pub fn tick_stead(stead: &mut Stead, config: &EngineConfig, rng: &mut impl Rng) -> TickReport {
    let mut report = TickReport {
        steads: 1,
        effects_expired: expire(&mut stead.effects, config.tick_ms as i64),
        ..Default::default()
    };

    for plot in 0..stead.plants.len() {
        let kind = stead.plants[plot].kind;
        let Some(family) = kind.family() else {
            continue;
        };
        let multiplier = effective_multiplier(
            &stead.effects,
            &stead.inventory,
            kind,
            config.booster_unit_multiplier,
        );
        let growth: GrowthReport = grow_plant(&mut stead.plants[plot], multiplier, config, rng);

        stead
            .inventory
            .credit_one(ItemKind::Essence(family), u64::from(growth.yields));
        stead
            .inventory
            .credit_one(ItemKind::Bag(Tier::T1), u64::from(growth.bag_drops));
        report.yields += growth.yields;
        report.bag_drops += growth.bag_drops;
    }
    report
}

impl Engine {
    /// Run one tick over every stead, in username order.
    ///
    /// Each stead is locked for its own sweep only, so requests for other
    /// users proceed while the tick is running. Saves wait for the tick.
    pub fn tick(&self, rng: &mut impl Rng) -> TickReport {
        let _sweep = self.sweep();
        let mut report = TickReport::default();
        for (_, handle) in self.handles() {
            let mut stead = handle.lock();
            report += tick_stead(&mut stead, self.config(), rng);
        }

        let now = self.advance_clock();
        report.activity_pruned = self.activity().lock().prune(now);
        log::debug!(
            "tick at {now}ms: {} steads, {} yields, {} bags, {} effects expired",
            report.steads,
            report.yields,
            report.bag_drops,
            report.effects_expired
        );
        report
    }
}
