//! Stead and plant data - one stead per user.

use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::kinds::{Family, ItemKind, PlantKind};
use crate::status::StatusEffect;

/// One plot. Its index in [`Stead::plants`] is its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub kind: PlantKind,
    /// Only ever grows, except when a recipe changes the kind.
    pub xp: f64,
}

impl Plant {
    pub fn new(kind: PlantKind) -> Self {
        Self { kind, xp: 0.0 }
    }

    pub fn dirt() -> Self {
        Self::new(PlantKind::Dirt)
    }
}

/// A user's complete game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stead {
    pub plants: Vec<Plant>,
    pub inventory: Inventory,
    /// Active ephemeral effects. Standing effects are derived, never stored.
    pub effects: Vec<StatusEffect>,
}

impl Stead {
    /// A fresh stead: one dirt plot and the starter items.
    pub fn new() -> Self {
        Self {
            plants: vec![Plant::dirt()],
            inventory: starter_inventory(),
            effects: Vec::new(),
        }
    }

    pub fn plant(&self, plot: usize) -> Option<&Plant> {
        self.plants.get(plot)
    }
}

impl Default for Stead {
    fn default() -> Self {
        Self::new()
    }
}

/// Items every new account starts with.
pub fn starter_inventory() -> Inventory {
    let mut inv = Inventory::new();
    inv.credit_one(ItemKind::NestEgg, 1);
    for family in Family::ALL {
        inv.credit_one(ItemKind::Seed(family), 1);
    }
    inv
}
