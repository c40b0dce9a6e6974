//! Read model - what a client sees of a stead.
//!
//! Projections never mutate. Times are in real milliseconds at the plant's
//! current effective multiplier.

use hkgi_logic::config::EngineConfig;
use hkgi_logic::inventory::Inventory;
use hkgi_logic::kinds::{ItemKind, PlantKind};
use hkgi_logic::leveling::{is_max_level, level_from_xp, level_progress, xp_per_yield_cycle};
use hkgi_logic::stead::{Plant, Stead};
use hkgi_logic::status::{active_effects, StatusEffect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadView {
    pub plants: Vec<PlantView>,
    pub inv: Inventory,
}

/// One plot. Dirt plots only carry their kind and id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlantView {
    Grown(GrownPlantView),
    Empty { kind: PlantKind, id: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrownPlantView {
    pub kind: PlantKind,
    pub id: usize,
    pub lvl: u32,
    pub xp: f64,
    pub multiplier: f64,
    pub statuses: Vec<StatusView>,
    /// Time until the next yield
    pub tt_yield_ms: f64,
    /// Time until the next level; absent once the curve is exhausted
    pub tt_lvlup_ms: Option<f64>,
    pub yield_progress: f64,
    pub lvlup_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub source: ItemKind,
    pub multiplier: f64,
    /// Fraction of an ephemeral effect's duration still left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl From<&StatusEffect> for StatusView {
    fn from(effect: &StatusEffect) -> Self {
        Self {
            source: effect.source,
            multiplier: effect.multiplier,
            progress: effect.timer.map(|t| t.progress()),
        }
    }
}

/// Project a whole stead.
pub fn serialize_stead(stead: &Stead, config: &EngineConfig) -> SteadView {
    SteadView {
        plants: stead
            .plants
            .iter()
            .enumerate()
            .map(|(id, plant)| serialize_plant(stead, plant, id, config))
            .collect(),
        inv: stead.inventory.clone(),
    }
}

fn serialize_plant(stead: &Stead, plant: &Plant, id: usize, config: &EngineConfig) -> PlantView {
    if plant.kind.is_empty() {
        return PlantView::Empty {
            kind: plant.kind,
            id,
        };
    }

    let statuses = active_effects(
        &stead.effects,
        &stead.inventory,
        plant.kind,
        config.booster_unit_multiplier,
    );
    let multiplier = 1.0 + statuses.iter().map(|s| s.multiplier).sum::<f64>();
    let ms_per_xp = 1000.0 / (config.xp_per_sec() * multiplier);

    let cycle = xp_per_yield_cycle(config, plant.xp);
    let into_cycle = plant.xp % cycle;
    let progress = level_from_xp(&config.level_curve, plant.xp);
    let tt_lvlup_ms = if is_max_level(&config.level_curve, plant.xp) {
        None
    } else {
        Some(progress.xp_to_go * ms_per_xp)
    };

    PlantView::Grown(GrownPlantView {
        kind: plant.kind,
        id,
        lvl: progress.level,
        xp: plant.xp,
        multiplier,
        statuses: statuses.iter().map(StatusView::from).collect(),
        tt_yield_ms: (cycle - into_cycle) * ms_per_xp,
        tt_lvlup_ms,
        yield_progress: into_cycle / cycle,
        lvlup_progress: level_progress(&config.level_curve, plant.xp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkgi_logic::kinds::{Family, Tier};

    #[test]
    fn test_dirt_is_a_marker() {
        let view = serialize_stead(&Stead::new(), &EngineConfig::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["plants"][0], serde_json::json!({"kind": "dirt", "id": 0}));
        assert_eq!(json["inv"]["nest_egg"], 1);
    }

    #[test]
    fn test_fresh_plant_timings() {
        let config = EngineConfig::default();
        let mut stead = Stead::new();
        stead.plants[0] = Plant::new(PlantKind::Grown(Family::Bbc));
        let PlantView::Grown(view) = &serialize_stead(&stead, &config).plants[0] else {
            panic!("expected a grown plant");
        };
        assert_eq!(view.lvl, 0);
        assert_eq!(view.multiplier, 1.0);
        // 300 xp at 10 xp/s.
        assert!((view.tt_yield_ms - 30_000.0).abs() < 1e-6);
        assert_eq!(view.yield_progress, 0.0);
    }

    #[test]
    fn test_boost_shortens_timers() {
        let config = EngineConfig::default();
        let mut stead = Stead::new();
        stead.plants[0] = Plant::new(PlantKind::Grown(Family::Hvv));
        stead.effects.push(StatusEffect::ephemeral(
            ItemKind::Powder(Tier::T1),
            None,
            1.0,
            60_000,
        ));
        stead.inventory.credit_one(ItemKind::Booster(Family::Hvv), 2);

        let PlantView::Grown(view) = &serialize_stead(&stead, &config).plants[0] else {
            panic!("expected a grown plant");
        };
        assert!((view.multiplier - 2.2).abs() < 1e-9);
        assert_eq!(view.statuses.len(), 3);
        assert_eq!(view.statuses[0].progress, Some(1.0));
        assert_eq!(view.statuses[1].progress, None);
        assert!((view.tt_yield_ms - 30_000.0 / 2.2).abs() < 1e-6);
    }
}
