//! Recipe resolution - using items and crafting on plots.
//!
//! Both operations follow the same shape: validate every precondition, debit
//! the cost through the ledger, then apply the outcome. A failed call leaves
//! the stead untouched.
//!
//! # Weighted outcomes
//!
//! A `one_of` table is resolved with a single uniform draw in `[0, 1)`:
//! each candidate's probability is subtracted in table order and the first
//! candidate that drives the remainder to ≤ 0 wins. Tables that sum to less
//! than 1 leave a gap at the top of the range; draws landing there go to the
//! last candidate instead of producing nothing.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::GameError;
use crate::kinds::{ItemKind, PlantKind};
use crate::leveling::level_from_xp;
use crate::manifest::{BoostSpec, MakeItem, Manifest, UseEffect};
use crate::stead::{Plant, Stead};
use crate::status::StatusEffect;

/// What a successful use changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum UseOutcome {
    Granted { items: BTreeMap<ItemKind, u64> },
    Boosted { multiplier: f64, duration_ms: i64 },
    PlotAdded { plot: usize },
}

/// What a successful craft changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CraftOutcome {
    Transformed { plot: usize, kind: PlantKind },
    Made { item: ItemKind },
    /// A recipe with neither a transform nor an output only consumed its cost.
    Consumed,
}

/// First-match-by-cumulative-weight selection.
///
/// Returns `None` only for an empty table.
pub fn pick_weighted(table: &[(f64, ItemKind)], roll: f64) -> Option<ItemKind> {
    let mut remainder = roll;
    for (probability, item) in table {
        remainder -= probability;
        if remainder <= 0.0 {
            return Some(*item);
        }
    }
    table.last().map(|(_, item)| *item)
}

/// `slots` independent uniform picks, merged into one bundle.
pub fn roll_bundle(
    slots: u32,
    candidates: &[(ItemKind, u64)],
    rng: &mut impl Rng,
) -> BTreeMap<ItemKind, u64> {
    let mut bundle = BTreeMap::new();
    if candidates.is_empty() {
        return bundle;
    }
    for _ in 0..slots {
        let (item, qty) = candidates[rng.gen_range(0..candidates.len())];
        *bundle.entry(item).or_insert(0) += qty;
    }
    bundle
}

/// A fresh ephemeral effect with a whole-second duration drawn from the spec.
pub fn roll_boost(source: ItemKind, spec: &BoostSpec, rng: &mut impl Rng) -> StatusEffect {
    let secs = rng.gen_range(spec.min_secs..=spec.max_secs);
    StatusEffect::ephemeral(source, spec.scope, spec.multiplier, i64::from(secs) * 1000)
}

/// Consume one `item` and apply its configured effect.
pub fn apply_use_item(
    stead: &mut Stead,
    manifest: &Manifest,
    item: ItemKind,
    rng: &mut impl Rng,
) -> Result<UseOutcome, GameError> {
    let def = manifest
        .item(item)
        .ok_or_else(|| GameError::UnknownItem(item.to_string()))?;
    let effect = match (&def.on_use, def.usable) {
        (Some(effect), true) => effect,
        _ => return Err(GameError::NotUsable),
    };

    if !stead.inventory.try_debit_one(item, 1) {
        return Err(GameError::InsufficientFunds);
    }

    let outcome = match effect {
        UseEffect::Grant(items) => {
            stead.inventory.credit(items);
            UseOutcome::Granted {
                items: items.clone(),
            }
        }
        UseEffect::Roll { slots, candidates } => {
            let items = roll_bundle(*slots, candidates, rng);
            stead.inventory.credit(&items);
            UseOutcome::Granted { items }
        }
        UseEffect::Boost(spec) => {
            let effect = roll_boost(item, spec, rng);
            let outcome = UseOutcome::Boosted {
                multiplier: effect.multiplier,
                duration_ms: effect.timer.map(|t| t.original_duration_ms).unwrap_or(0),
            };
            stead.effects.push(effect);
            outcome
        }
        UseEffect::AddPlot => {
            stead.plants.push(Plant::dirt());
            UseOutcome::PlotAdded {
                plot: stead.plants.len() - 1,
            }
        }
    };
    Ok(outcome)
}

/// Craft recipe `recipe_index` of the plant on `plot_index`.
pub fn apply_craft(
    stead: &mut Stead,
    manifest: &Manifest,
    config: &EngineConfig,
    plot_index: usize,
    recipe_index: usize,
    rng: &mut impl Rng,
) -> Result<CraftOutcome, GameError> {
    let plant = stead.plant(plot_index).ok_or_else(|| {
        GameError::InvalidReference(format!(
            "plot {plot_index} (stead has {} plots)",
            stead.plants.len()
        ))
    })?;
    let recipe = manifest.recipe(plant.kind, recipe_index).ok_or_else(|| {
        GameError::InvalidReference(format!("recipe {recipe_index} for {}", plant.kind))
    })?;

    if let Some(required) = recipe.min_level {
        let current = level_from_xp(&config.level_curve, plant.xp).level;
        if current < required {
            return Err(GameError::LevelTooLow { required, current });
        }
    }

    if !stead.inventory.try_debit(&recipe.needs) {
        return Err(GameError::InsufficientFunds);
    }

    let mut outcome = CraftOutcome::Consumed;
    if let Some(kind) = recipe.change_plant_to {
        stead.plants[plot_index] = Plant::new(kind);
        outcome = CraftOutcome::Transformed {
            plot: plot_index,
            kind,
        };
    }
    let made = match &recipe.make_item {
        Some(MakeItem::Item(item)) => Some(*item),
        Some(MakeItem::OneOf { one_of }) => pick_weighted(one_of, rng.gen::<f64>()),
        None => None,
    };
    if let Some(item) = made {
        stead.inventory.credit_one(item, 1);
        outcome = CraftOutcome::Made { item };
    }
    Ok(outcome)
}
