//! Status effects - multiplicative growth boosts and how they stack.
//!
//! Two sources feed a plant's multiplier:
//! - **ephemeral** effects stored on the stead, created by using a powder and
//!   counted down by the tick until they expire;
//! - **standing** effects synthesized on every read, one per `{family}_item`
//!   unit the player owns, applying only to plants of that family.
//!
//! Contributions add: two +1.0 effects give a multiplier of 3.0, not 4.0.

use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::kinds::{Family, ItemKind, PlantKind};

/// Countdown carried by ephemeral effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining_ms: i64,
    pub original_duration_ms: i64,
}

impl Countdown {
    pub fn new(duration_ms: i64) -> Self {
        Self {
            remaining_ms: duration_ms,
            original_duration_ms: duration_ms,
        }
    }

    /// Remaining fraction of the original duration, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.original_duration_ms <= 0 {
            return 0.0;
        }
        (self.remaining_ms as f64 / self.original_duration_ms as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Item that produced this effect.
    pub source: ItemKind,
    /// Family the effect is limited to; `None` boosts every planted family.
    pub scope: Option<Family>,
    /// Amount added to the plant's multiplier. Never negative.
    pub multiplier: f64,
    /// `None` for standing effects.
    pub timer: Option<Countdown>,
}

impl StatusEffect {
    pub fn ephemeral(source: ItemKind, scope: Option<Family>, multiplier: f64, duration_ms: i64) -> Self {
        Self {
            source,
            scope,
            multiplier: multiplier.max(0.0),
            timer: Some(Countdown::new(duration_ms)),
        }
    }

    pub fn standing(source: ItemKind, family: Family, multiplier: f64) -> Self {
        Self {
            source,
            scope: Some(family),
            multiplier: multiplier.max(0.0),
            timer: None,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.timer.is_some()
    }

    /// Whether this effect boosts a plant of `kind`. Dirt is never boosted.
    pub fn applies_to(&self, kind: PlantKind) -> bool {
        match (kind.family(), self.scope) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(family), Some(scope)) => family == scope,
        }
    }
}

/// Every effect currently boosting a plant of `kind`: the applicable
/// ephemeral effects, then one standing effect per matching booster unit.
pub fn active_effects(
    ephemeral: &[StatusEffect],
    inventory: &Inventory,
    kind: PlantKind,
    booster_unit_multiplier: f64,
) -> Vec<StatusEffect> {
    let Some(family) = kind.family() else {
        return Vec::new();
    };

    let mut effects: Vec<StatusEffect> = ephemeral
        .iter()
        .filter(|e| e.applies_to(kind))
        .cloned()
        .collect();

    let booster = ItemKind::Booster(family);
    let owned = inventory.count(booster);
    effects.extend(
        (0..owned).map(|_| StatusEffect::standing(booster, family, booster_unit_multiplier)),
    );
    effects
}

/// `1 + Σ contributions` over [`active_effects`].
pub fn effective_multiplier(
    ephemeral: &[StatusEffect],
    inventory: &Inventory,
    kind: PlantKind,
    booster_unit_multiplier: f64,
) -> f64 {
    let Some(family) = kind.family() else {
        return 1.0;
    };
    // Same sum as active_effects, without materializing one effect per unit.
    let timed: f64 = ephemeral
        .iter()
        .filter(|e| e.applies_to(kind))
        .map(|e| e.multiplier)
        .sum();
    let standing = inventory.count(ItemKind::Booster(family)) as f64 * booster_unit_multiplier;
    1.0 + timed + standing
}

/// Count every ephemeral effect down by `elapsed_ms` and drop the expired.
///
/// Returns how many effects expired.
pub fn expire(effects: &mut Vec<StatusEffect>, elapsed_ms: i64) -> usize {
    let before = effects.len();
    effects.retain_mut(|effect| match effect.timer.as_mut() {
        Some(timer) => {
            timer.remaining_ms -= elapsed_ms;
            timer.remaining_ms > 0
        }
        None => true,
    });
    before - effects.len()
}
